use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use reply_engine::{EnginePolicy, ReplyEngine};
use reply_llm::{OpenAiTextGenerator, TextGenerator};
use tracing::{info, warn};

use super::output::{ConsoleProgress, OutputFormat};
use crate::app_settings::Settings;

pub struct CliContext {
    settings: Settings,
    settings_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(settings: Settings, settings_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            settings,
            settings_path,
            output,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// The OpenAI generator when a key is configured. A broken config only
    /// disables generation.
    pub fn generator(&self) -> Option<Arc<dyn TextGenerator>> {
        let config = self.settings.openai_config()?;
        let model = config.model.clone();
        match OpenAiTextGenerator::new(config) {
            Ok(generator) => {
                info!(%model, "reply generation enabled");
                Some(Arc::new(generator))
            }
            Err(err) => {
                warn!(%err, "reply generation disabled");
                None
            }
        }
    }

    pub fn engine(&self, policy: EnginePolicy, generate: bool) -> ReplyEngine {
        let mut builder = ReplyEngine::builder(policy);
        if generate {
            if let Some(generator) = self.generator() {
                builder = builder.with_generator(generator);
            }
        }
        if self.output.is_human() {
            builder = builder.with_progress(Arc::new(ConsoleProgress));
        }
        builder.build()
    }

    pub fn operator_name(&self, flag: Option<String>) -> String {
        let name = flag
            .or_else(|| self.settings.operator_name.clone())
            .unwrap_or_default();
        if name.trim().is_empty() {
            warn!("no operator name configured; already-answered threads cannot be detected");
        }
        name
    }

    pub fn default_text(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.settings.default_text.clone())
    }

    pub fn post_id(&self, flag: Option<String>) -> Result<String> {
        flag.or_else(|| std::env::var("FB_POST_ID").ok())
            .filter(|id| !id.trim().is_empty())
            .context("No post ID provided. Use --post-id or set FB_POST_ID in .env")
    }

    pub fn access_token(&self) -> Result<String> {
        std::env::var("FB_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .context("FB_ACCESS_TOKEN not set. See .env.example")
    }
}
