use reply_llm::{CompletionRequest, TextGenerator};
use tracing::{debug, warn};

use crate::model::{DraftSource, Extraction, ExtractionPath, ReplyDraft};
use crate::policy::{ComposerPolicy, SAFETY_REPLY};

const QUOTES: &[char] = &['"', '\'', '`', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

/// Produce reply text for one comment. The text is never empty: generation
/// falls back to the operator's default text, then to the safety reply.
pub async fn compose(
    generator: Option<&dyn TextGenerator>,
    extraction: &Extraction,
    default_text: Option<&str>,
    policy: &ComposerPolicy,
) -> ReplyDraft {
    if let Some(generator) = generator {
        let request = completion_request(extraction, policy);
        match generator.complete(&request).await {
            Ok(raw) => {
                let text = strip_quotes(&raw);
                if !text.is_empty() {
                    debug!(target: "composer", author = %extraction.context.name, "generated reply");
                    return ReplyDraft {
                        text,
                        source: DraftSource::Generated,
                    };
                }
                warn!(target: "composer", "generator returned blank text; falling back");
            }
            Err(err) => warn!(target: "composer", %err, "generation failed; falling back"),
        }
    }

    if let Some(text) = default_text.map(str::trim).filter(|text| !text.is_empty()) {
        return ReplyDraft {
            text: text.to_string(),
            source: DraftSource::FallbackFixed,
        };
    }

    let safety = policy.safety_text.trim();
    ReplyDraft {
        text: if safety.is_empty() { SAFETY_REPLY } else { safety }.to_string(),
        source: DraftSource::HardcodedSafety,
    }
}

fn completion_request(extraction: &Extraction, policy: &ComposerPolicy) -> CompletionRequest {
    let who = match extraction.path {
        ExtractionPath::Default => policy.generic_author.as_str(),
        _ => extraction.context.name.as_str(),
    };
    let mut user_prompt = format!("Write a reply to a comment left by {who}.");
    if let Some(summary) = &extraction.context.profile_summary {
        user_prompt.push_str("\nWhat their profile shows:\n");
        user_prompt.push_str(summary);
    }
    CompletionRequest {
        system_prompt: policy.system_prompt.clone(),
        user_prompt,
        max_tokens: policy.max_tokens,
        temperature: policy.temperature,
    }
}

fn strip_quotes(raw: &str) -> String {
    raw.trim().trim_matches(QUOTES).trim().to_string()
}
