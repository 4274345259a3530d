use anyhow::{bail, Context, Result};
use document_surface::{BrowserSession, DocumentSurface};
use reply_engine::{ReplyEngine, RunReport, RunRequest};
use serde::Serialize;
use tracing::{error, info};

use super::commands::ReplyArgs;
use super::context::CliContext;
use super::output::emit;

/// Outcome of one post in a multi-post run.
#[derive(Debug, Serialize)]
pub struct PostRun {
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn cmd_reply(args: ReplyArgs, ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings();
    let mut session_config = settings.browser.session.clone();
    if let Some(endpoint) = args.attach.clone() {
        session_config.attach_endpoint = Some(endpoint);
    }
    if args.headless {
        session_config.headless = true;
    }
    let keep_open = args.keep_open || settings.browser.keep_open;

    let mut request = RunRequest::new(ctx.operator_name(args.name.clone()));
    request.default_text = ctx.default_text(args.default_text.clone());
    request.delay = args
        .delay
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| settings.delay());
    request.screenshot_dir = settings.screenshot_dir.clone();

    let engine = ctx.engine(settings.engine.clone(), true);
    let session = BrowserSession::open(&session_config)
        .await
        .context("Failed to open browser session")?;

    let outcome = match session.surface().await {
        Ok(surface) => Ok(run_posts(&engine, &surface, &request, &args.urls).await),
        Err(err) => Err(err),
    };
    session.shutdown(keep_open).await;
    let runs = outcome.context("Failed to attach to a browser tab")?;

    emit(ctx.output(), &runs)?;
    let failed = runs.iter().filter(|run| run.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} of {} post(s) could not be processed", runs.len());
    }
    Ok(())
}

/// Posts run in sequence on one surface. A post that cannot be loaded is
/// recorded and the next one still runs.
async fn run_posts(
    engine: &ReplyEngine,
    surface: &dyn DocumentSurface,
    request: &RunRequest,
    urls: &[String],
) -> Vec<PostRun> {
    let targets: Vec<Option<String>> = if urls.is_empty() {
        info!("no post URL given; using the page already open");
        vec![None]
    } else {
        urls.iter().cloned().map(Some).collect()
    };

    let mut runs = Vec::with_capacity(targets.len());
    for url in targets {
        let mut post_request = request.clone();
        post_request.post_url = url.clone();
        match engine.run(surface, &post_request).await {
            Ok(report) => runs.push(PostRun {
                url,
                report: Some(report),
                error: None,
            }),
            Err(err) => {
                error!(url = url.as_deref().unwrap_or("<current>"), %err, "post skipped");
                runs.push(PostRun {
                    url,
                    report: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }
    runs
}
