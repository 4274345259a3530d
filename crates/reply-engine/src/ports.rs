use crate::model::{CommentOutcome, DiscoveryReport, RunResult};

/// Receives per-comment progress from a run. All hooks default to no-ops.
pub trait ProgressPort: Send + Sync {
    fn on_discovered(&self, _report: &DiscoveryReport, _comments: usize) {}
    fn on_comment(&self, _index: usize, _total: usize, _outcome: &CommentOutcome) {}
    fn on_finished(&self, _result: &RunResult) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressPort for NullProgress {}
