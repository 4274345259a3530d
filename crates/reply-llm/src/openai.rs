use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{CompletionRequest, GenerationError, TextGenerator};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Keys are tried in order; a 429 moves on to the next one.
    pub api_keys: Vec<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Read `OPENAI_API_KEY` (comma separated), `OPENAI_MODEL` and
    /// `OPENAI_API_BASE`. Returns `None` when no key is configured.
    pub fn from_env() -> Option<Self> {
        let api_keys = parse_keys(&env::var("OPENAI_API_KEY").ok()?);
        if api_keys.is_empty() {
            return None;
        }
        Some(Self {
            api_keys,
            model: non_empty_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty_env("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(30),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn parse_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct OpenAiTextGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiTextGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        if config.api_keys.is_empty() {
            return Err(GenerationError::Config("missing OpenAI API key".into()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GenerationError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
        };

        let mut last_error: Option<GenerationError> = None;
        for (index, key) in self.config.api_keys.iter().enumerate() {
            let response = match self
                .client
                .post(&url)
                .bearer_auth(key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    last_error = Some(GenerationError::Transport(err.to_string()));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<response unavailable>".to_string());
                if status.as_u16() == 429 {
                    let friendly = rate_limit_message(&text);
                    warn!(
                        target: "openai",
                        message = %friendly,
                        attempt = index + 1,
                        remaining = self.config.api_keys.len() - index - 1,
                        "rate limited; switching API key"
                    );
                    last_error = Some(GenerationError::RateLimited(friendly));
                    continue;
                }
                return Err(GenerationError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let parsed: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
            let content = parsed
                .choices
                .first()
                .and_then(|choice| choice.message.content.as_ref())
                .and_then(ChatCompletionContent::as_text)
                .ok_or(GenerationError::MissingContent)?;
            debug!(target: "openai", model = %self.config.model, chars = content.len(), "completion received");
            return Ok(content);
        }

        Err(last_error.unwrap_or_else(|| {
            GenerationError::Transport("request exhausted all API keys".into())
        }))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<ChatCompletionContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatCompletionContent {
    Text(String),
    Parts(Vec<ChatCompletionPart>),
}

impl ChatCompletionContent {
    fn as_text(&self) -> Option<String> {
        let text = match self {
            ChatCompletionContent::Text(value) => value.clone(),
            ChatCompletionContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: Option<String>,
}

fn rate_limit_message(raw: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(ErrorEnvelope {
            error: ErrorMessage {
                message: Some(message),
            },
        }) => format!("OpenAI rate limit exceeded: {}", message.trim()),
        _ => "OpenAI rate limit exceeded".to_string(),
    }
}
