use std::env;
use std::path::PathBuf;
use std::time::Duration;

use document_surface::SessionConfig;
use reply_engine::EnginePolicy;
use reply_llm::OpenAiConfig;
use serde::{Deserialize, Serialize};

use crate::graph::GraphSettings;

/// Everything `config/autoreply.yaml` can hold. Missing sections fall back
/// to defaults; environment variables and CLI flags win over the file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub engine: EnginePolicy,
    /// Display name used to recognise the operator's own replies.
    pub operator_name: Option<String>,
    pub default_text: Option<String>,
    pub delay_secs: Option<u64>,
    pub screenshot_dir: Option<PathBuf>,
    pub openai: OpenAiSettings,
    pub graph: GraphSettings,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    #[serde(flatten)]
    pub session: SessionConfig,
    /// Leave a launched browser running after the run.
    pub keep_open: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            model: None,
            api_base: None,
            timeout_secs: 30,
        }
    }
}

pub const DEFAULT_DELAY_SECS: u64 = 5;

impl Settings {
    /// Fold `AUTOREPLY_*` variables over the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(name) = env_value("AUTOREPLY_OPERATOR_NAME") {
            self.operator_name = Some(name);
        }
        if let Some(text) = env_value("AUTOREPLY_DEFAULT_TEXT") {
            self.default_text = Some(text);
        }
        if let Some(delay) = env_value("AUTOREPLY_DELAY_SECS").and_then(|v| v.parse().ok()) {
            self.delay_secs = Some(delay);
        }
        if let Some(endpoint) = env_value("AUTOREPLY_ATTACH") {
            self.browser.session.attach_endpoint = Some(endpoint);
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs.unwrap_or(DEFAULT_DELAY_SECS))
    }

    /// Generator configuration, present only when an API key is set.
    /// `OPENAI_MODEL`/`OPENAI_API_BASE` beat the file; the file beats the
    /// built-in defaults.
    pub fn openai_config(&self) -> Option<OpenAiConfig> {
        let mut config = OpenAiConfig::from_env()?;
        if env_value("OPENAI_MODEL").is_none() {
            if let Some(model) = &self.openai.model {
                config.model = model.clone();
            }
        }
        if env_value("OPENAI_API_BASE").is_none() {
            if let Some(base) = &self.openai.api_base {
                config.api_base = base.clone();
            }
        }
        config.timeout = Duration::from_secs(self.openai.timeout_secs);
        Some(config)
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
