use clap::ValueEnum;
use reply_engine::{CommentOutcome, DiscoveryReport, ProgressPort, RunResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_human(self) -> bool {
        self == OutputFormat::Human
    }
}

/// Print a serializable report in the machine formats.
pub fn emit<T: serde::Serialize>(format: OutputFormat, value: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human => {}
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Per-comment progress lines on stdout.
pub struct ConsoleProgress;

impl ProgressPort for ConsoleProgress {
    fn on_discovered(&self, report: &DiscoveryReport, comments: usize) {
        println!(
            "Discovery: {} round(s), {} expansion click(s), stopped: {:?}. Found {} comment(s).",
            report.rounds, report.clicked, report.stop, comments
        );
    }

    fn on_comment(&self, index: usize, total: usize, outcome: &CommentOutcome) {
        let line = match outcome {
            CommentOutcome::Replied { author, draft, .. } => {
                format!("replied to {author} ({draft:?})")
            }
            CommentOutcome::SkippedDuplicate { author } => {
                format!("skipped {author}: already replied")
            }
            CommentOutcome::Failed { author, reason } => format!(
                "failed for {}: {reason}",
                author.as_deref().unwrap_or("unknown author")
            ),
        };
        println!("[{index}/{total}] {line}");
    }

    fn on_finished(&self, result: &RunResult) {
        println!(
            "Done. Processed {} comment(s): {} replied, {} skipped, {} failed.",
            result.attempted,
            result.succeeded,
            result.skipped,
            result.failed()
        );
    }
}
