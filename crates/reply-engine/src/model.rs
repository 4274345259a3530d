use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::policy::DEFAULT_AUTHOR;

/// What a run needs from the operator for one post.
#[derive(Clone, Debug, Default)]
pub struct RunRequest {
    /// Post to load; `None` means the document is already positioned.
    pub post_url: Option<String>,
    pub default_text: Option<String>,
    /// Pause after each submitted reply.
    pub delay: Duration,
    pub operator_name: String,
    /// Where the post-discovery screenshot goes; skipped when unset.
    pub screenshot_dir: Option<PathBuf>,
}

impl RunRequest {
    pub fn new(operator_name: impl Into<String>) -> Self {
        Self {
            operator_name: operator_name.into(),
            ..Default::default()
        }
    }

    pub fn post_url(mut self, url: impl Into<String>) -> Self {
        self.post_url = Some(url.into());
        self
    }

    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = Some(text.into());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthorContext {
    pub name: String,
    pub profile_reference: Option<String>,
    pub profile_summary: Option<String>,
}

impl Default for AuthorContext {
    fn default() -> Self {
        Self {
            name: DEFAULT_AUTHOR.to_string(),
            profile_reference: None,
            profile_summary: None,
        }
    }
}

/// How far author extraction got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    /// Name and profile reference recovered.
    Full,
    /// A name without a usable profile link.
    NameOnly,
    /// Nothing recovered; the default author was used.
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// No lookup was attempted.
    Skipped,
    Scraped,
    /// The profile opened but had nothing usable.
    Empty,
    Failed,
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub context: AuthorContext,
    pub path: ExtractionPath,
    pub summary: SummaryStatus,
}

impl Extraction {
    pub fn fallback() -> Self {
        Self {
            context: AuthorContext::default(),
            path: ExtractionPath::Default,
            summary: SummaryStatus::Skipped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupVerdict {
    Replied,
    NotReplied,
    /// The thread could not be inspected.
    Undetermined,
}

impl DedupVerdict {
    /// Undetermined threads are treated as not yet answered.
    pub fn is_replied(self) -> bool {
        self == DedupVerdict::Replied
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftSource {
    Generated,
    FallbackFixed,
    HardcodedSafety,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplyDraft {
    pub text: String,
    pub source: DraftSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickPath {
    Direct,
    Forced,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommentOutcome {
    Replied {
        author: String,
        extraction: ExtractionPath,
        draft: DraftSource,
        click: ClickPath,
    },
    SkippedDuplicate {
        author: String,
    },
    Failed {
        author: Option<String>,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortSwitch {
    Switched,
    NotPresent,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Consecutive empty rounds exceeded the threshold.
    Exhausted,
    /// A round found controls but could click none of them.
    Stuck,
    /// `max_rounds` reached.
    Budget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub rounds: usize,
    pub clicked: usize,
    pub sort: SortSwitch,
    pub stop: StopReason,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Every comment that entered the iteration.
    pub attempted: usize,
    pub succeeded: usize,
    /// Already answered by the operator.
    pub skipped: usize,
}

impl RunResult {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded - self.skipped
    }

    pub(crate) fn record(&mut self, outcome: &CommentOutcome) {
        self.attempted += 1;
        match outcome {
            CommentOutcome::Replied { .. } => self.succeeded += 1,
            CommentOutcome::SkippedDuplicate { .. } => self.skipped += 1,
            CommentOutcome::Failed { .. } => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub result: RunResult,
    pub discovery: DiscoveryReport,
    pub outcomes: Vec<CommentOutcome>,
    pub screenshot: Option<PathBuf>,
}
