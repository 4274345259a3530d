use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app_settings::Settings;

/// What a `.env` file contributed. Logging is not up yet when the file is
/// read, so the caller reports this afterwards.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnvFileReport {
    pub path: PathBuf,
    pub applied: usize,
    pub invalid_lines: Vec<usize>,
}

impl EnvFileReport {
    pub fn log(&self) {
        for line in &self.invalid_lines {
            warn!(path = %self.path.display(), line, "invalid .env entry; skipped");
        }
        info!(path = %self.path.display(), applied = self.applied, "loaded environment from .env");
    }
}

/// Load `KEY=value` lines from `path` into the environment. Variables that
/// are already set win over the file. A missing file yields `Ok(None)`.
pub fn load_env_file(path: &Path) -> std::io::Result<Option<EnvFileReport>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = stdfs::read_to_string(path)?;
    let mut report = EnvFileReport {
        path: path.to_path_buf(),
        ..Default::default()
    };
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            report.invalid_lines.push(idx + 1);
            continue;
        };
        let key = key.trim();
        if key.is_empty() || env::var(key).is_ok() {
            continue;
        }
        env::set_var(key, unescape_value(value.trim()));
        report.applied += 1;
    }
    Ok(Some(report))
}

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedSettings {
    pub settings: Settings,
    pub path: PathBuf,
}

fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        return Ok(path.clone());
    }
    // Priority: ./config/autoreply.yaml > <config dir>/fb-autoreply/config.yaml
    let local_config = PathBuf::from("config/autoreply.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("fb-autoreply");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_settings(config_path: Option<&PathBuf>) -> Result<LoadedSettings> {
    let path = resolve_config_path(config_path)?;

    let mut settings = if path.exists() {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from: {}", path.display());
        settings
    } else {
        info!("Config file not found, using defaults: {}", path.display());
        Settings::default()
    };
    settings.apply_env_overrides();

    Ok(LoadedSettings { settings, path })
}

fn unescape_value(value: &str) -> String {
    let quoted = |q: char| value.len() >= 2 && value.starts_with(q) && value.ends_with(q);
    if quoted('"') {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
    } else if quoted('\'') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
