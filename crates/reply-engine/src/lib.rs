//! Reply orchestration: find every comment on a post, work out who wrote
//! it, skip threads the operator already answered, and post a paced reply
//! to the rest.

pub mod composer;
pub mod dedup;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod extractor;
pub mod model;
pub mod policy;
pub mod ports;
pub mod submission;

mod tempo;

pub use engine::{ReplyEngine, ReplyEngineBuilder};
pub use errors::{EngineError, SubmitError};
pub use model::{
    AuthorContext, ClickPath, CommentOutcome, DedupVerdict, DiscoveryReport, DraftSource,
    Extraction, ExtractionPath, ReplyDraft, RunReport, RunRequest, RunResult, SortSwitch,
    StopReason, SummaryStatus,
};
pub use policy::{
    ComposerPolicy, DedupPolicy, DiscoveryPolicy, EnginePolicy, ExtractionPolicy,
    SubmissionPolicy, DEFAULT_AUTHOR, SAFETY_REPLY,
};
pub use ports::{NullProgress, ProgressPort};
