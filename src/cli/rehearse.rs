use std::time::Duration;

use anyhow::{Context, Result};
use document_surface::{FixtureDocument, Submission};
use reply_engine::{RunReport, RunRequest};
use serde::Serialize;

use super::commands::RehearseArgs;
use super::context::CliContext;
use super::output::emit;

#[derive(Debug, Serialize)]
struct Rehearsal {
    report: RunReport,
    submissions: Vec<Submission>,
}

/// Dry run against a recorded document: same engine, no browser, no pauses.
pub async fn cmd_rehearse(args: RehearseArgs, ctx: &CliContext) -> Result<()> {
    let document = FixtureDocument::load(&args.fixture)
        .with_context(|| format!("Failed to load fixture {}", args.fixture.display()))?;

    let engine = ctx.engine(ctx.settings().engine.clone().without_delays(), args.generate);
    let mut request = RunRequest::new(ctx.operator_name(args.name.clone()));
    request.default_text = ctx.default_text(args.default_text.clone());
    request.delay = Duration::ZERO;

    let report = engine
        .run(&document, &request)
        .await
        .context("Rehearsal failed")?;
    let submissions = document.submissions();

    if ctx.output().is_human() {
        for submission in &submissions {
            println!("  -> {}", submission.text);
        }
    }
    emit(
        ctx.output(),
        &Rehearsal {
            report,
            submissions,
        },
    )
}
