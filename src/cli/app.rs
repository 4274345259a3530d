use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info, warn};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::{CliArgs, VERSION};
use super::runtime::{init_logging, load_env_file, load_settings, LoadedSettings};

pub async fn run() -> Result<()> {
    // Read before logging starts so RUST_LOG from .env takes effect.
    let env_file = load_env_file(Path::new(".env"));
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;
    match env_file {
        Ok(Some(report)) => report.log(),
        Ok(None) => {}
        Err(err) => warn!(%err, "failed to read .env"),
    }

    info!("Starting autoreply v{}", VERSION);

    let LoadedSettings { settings, path } = load_settings(cli.config.as_ref()).await?;
    let cli_context = CliContext::new(settings, path, cli.output);
    debug!(config = %cli_context.settings_path().display(), "settings resolved");

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
