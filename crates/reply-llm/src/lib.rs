//! Generative-text service used to draft replies.

#[cfg(any(test, feature = "testing"))]
mod mock;
mod openai;

#[cfg(any(test, feature = "testing"))]
pub use mock::ScriptedGenerator;
pub use openai::{OpenAiConfig, OpenAiTextGenerator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One completion request: a system instruction plus a user prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator misconfigured: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("response invalid: {0}")]
    InvalidResponse(String),
    #[error("response missing content")]
    MissingContent,
}

/// Contract for any text generator the composer can call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}
