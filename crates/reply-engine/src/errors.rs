use document_surface::SurfaceError;
use thiserror::Error;

/// Why one reply could not be delivered.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("reply affordance could not be scrolled into view: {0}")]
    Scroll(SurfaceError),
    #[error("reply affordance could not be clicked: {0}")]
    Click(SurfaceError),
    #[error("focus lookup failed: {0}")]
    Focus(SurfaceError),
    #[error("no input gained focus after opening the composer")]
    NoFocusedInput,
    #[error("typing the reply failed: {0}")]
    Type(SurfaceError),
    #[error("submitting the reply failed: {0}")]
    Submit(SurfaceError),
    #[error("refusing to submit an empty reply")]
    EmptyText,
}

/// Run-level failures. Anything per comment stays inside the iteration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load post {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: SurfaceError,
    },
    #[error("failed to enumerate reply affordances: {0}")]
    Enumerate(SurfaceError),
}
