use std::time::Duration;

use document_surface::{Predicate, Role, TextPattern};
use serde::{Deserialize, Serialize};

/// Fallback reply used when neither generation nor operator text is available.
pub const SAFETY_REPLY: &str = "Thanks so much for your comment!";

/// Name recorded when the comment author cannot be recovered.
pub const DEFAULT_AUTHOR: &str = "User";

/// Every knob of a run. Partial YAML keeps defaults for the rest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicy {
    /// Settle time after loading the post.
    pub page_settle_ms: u64,
    /// Element that opens a reply composer for one comment.
    pub reply_affordance: Predicate,
    pub discovery: DiscoveryPolicy,
    pub extraction: ExtractionPolicy,
    pub dedup: DedupPolicy,
    pub composer: ComposerPolicy,
    pub submission: SubmissionPolicy,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            page_settle_ms: 5_000,
            reply_affordance: Predicate::role(Role::Button).with_text(TextPattern::equals("Reply")),
            discovery: DiscoveryPolicy::default(),
            extraction: ExtractionPolicy::default(),
            dedup: DedupPolicy::default(),
            composer: ComposerPolicy::default(),
            submission: SubmissionPolicy::default(),
        }
    }
}

impl EnginePolicy {
    /// Default heuristics with every wait set to zero.
    pub fn immediate() -> Self {
        Self::default().without_delays()
    }

    /// Same heuristics, no settle waits. Timeouts are kept.
    pub fn without_delays(mut self) -> Self {
        self.page_settle_ms = 0;
        self.discovery.click_settle_ms = 0;
        self.discovery.round_settle_ms = 0;
        self.discovery.sort_settle_ms = 0;
        self.extraction.profile_settle_ms = 0;
        self.submission.scroll_settle_ms = 0;
        self.submission.focus_settle_ms = 0;
        self
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryPolicy {
    pub max_rounds: usize,
    /// Consecutive empty rounds tolerated before stopping.
    pub empty_round_threshold: usize,
    pub click_settle_ms: u64,
    pub round_settle_ms: u64,
    pub sort_settle_ms: u64,
    /// Labels of pagination and expansion controls.
    pub expansion_patterns: Vec<TextPattern>,
    /// Longer texts are containers, not controls.
    pub expansion_max_text_len: usize,
    pub sort_trigger_patterns: Vec<TextPattern>,
    pub sort_option_patterns: Vec<TextPattern>,
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 50,
            empty_round_threshold: 3,
            click_settle_ms: 1_000,
            round_settle_ms: 2_000,
            sort_settle_ms: 1_500,
            expansion_patterns: vec![
                TextPattern::contains("view more comments"),
                TextPattern::contains("view previous comments"),
                TextPattern::contains("see more"),
                TextPattern::contains("view more replies"),
                TextPattern::regex(r"^view (all )?\d+ (more )?repl(y|ies)"),
            ],
            expansion_max_text_len: 60,
            sort_trigger_patterns: vec![TextPattern::contains("most relevant")],
            sort_option_patterns: vec![TextPattern::contains("all comments")],
        }
    }
}

impl DiscoveryPolicy {
    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn round_settle(&self) -> Duration {
        Duration::from_millis(self.round_settle_ms)
    }

    pub fn sort_settle(&self) -> Duration {
        Duration::from_millis(self.sort_settle_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPolicy {
    pub container: Predicate,
    pub container_hops: usize,
    /// Author link text must be longer than this many characters.
    pub min_author_len: usize,
    /// Links whose destination contains any of these point at media or
    /// permalinks, not profiles.
    pub excluded_link_fragments: Vec<String>,
    pub profile_settle_ms: u64,
    /// Upper bound on the whole profile visit, settle included.
    pub profile_timeout_ms: u64,
    pub intro_labels: Vec<TextPattern>,
    pub post_body: Predicate,
    /// Post bodies must be longer than this many characters.
    pub min_post_len: usize,
    pub summary_max_chars: usize,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            container: Predicate::role(Role::Article),
            container_hops: 12,
            min_author_len: 2,
            excluded_link_fragments: [
                "/photo",
                "photo.php",
                "/permalink",
                "/posts/",
                "story.php",
                "/hashtag/",
                "/videos/",
                "/reel/",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            profile_settle_ms: 3_000,
            profile_timeout_ms: 20_000,
            intro_labels: vec![TextPattern::equals("Intro")],
            post_body: Predicate::any().with_attr("dir", Some("auto")),
            min_post_len: 50,
            summary_max_chars: 300,
        }
    }
}

impl ExtractionPolicy {
    pub fn profile_settle(&self) -> Duration {
        Duration::from_millis(self.profile_settle_ms)
    }

    pub fn profile_timeout(&self) -> Duration {
        Duration::from_millis(self.profile_timeout_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupPolicy {
    pub container: Predicate,
    pub container_hops: usize,
    /// Extra characters a link may carry beyond the operator name.
    pub name_slack: usize,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            container: Predicate::role(Role::Article),
            container_hops: 12,
            name_slack: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerPolicy {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// How the prompt refers to an author whose name was not recovered.
    pub generic_author: String,
    pub safety_text: String,
}

impl Default for ComposerPolicy {
    fn default() -> Self {
        Self {
            system_prompt: "You reply to comments on a Facebook post. Write one or two short, \
                casual, friendly sentences addressed to the commenter. No hashtags, no links, \
                nothing promotional."
                .to_string(),
            max_tokens: 60,
            temperature: 0.8,
            generic_author: "a friend".to_string(),
            safety_text: SAFETY_REPLY.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionPolicy {
    pub scroll_settle_ms: u64,
    pub focus_settle_ms: u64,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 1_000,
            focus_settle_ms: 1_500,
        }
    }
}

impl SubmissionPolicy {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn focus_settle(&self) -> Duration {
        Duration::from_millis(self.focus_settle_ms)
    }
}
