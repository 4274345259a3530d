use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// High-level error categories surfaced by a document surface.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq, Serialize, Deserialize)]
pub enum SurfaceErrorKind {
    #[error("element not found")]
    NotFound,
    #[error("element detached from document")]
    Detached,
    #[error("element not interactable")]
    NotInteractable,
    #[error("navigation timed out")]
    NavTimeout,
    #[error("devtools i/o failure")]
    Io,
    #[error("operation unsupported")]
    Unsupported,
    #[error("internal error")]
    Internal,
}

/// Error returned by every surface operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurfaceError {
    pub kind: SurfaceErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for SurfaceError {}

impl SurfaceError {
    pub fn new(kind: SurfaceErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn not_found(hint: impl Into<String>) -> Self {
        Self::new(SurfaceErrorKind::NotFound).with_hint(hint)
    }

    pub fn detached(hint: impl Into<String>) -> Self {
        Self::new(SurfaceErrorKind::Detached).with_hint(hint)
    }

    pub fn io(hint: impl Into<String>) -> Self {
        Self::new(SurfaceErrorKind::Io).with_hint(hint)
    }

    pub fn internal(hint: impl Into<String>) -> Self {
        Self::new(SurfaceErrorKind::Internal).with_hint(hint)
    }

    /// Transient UI unavailability: the next discovery round or comment may
    /// well succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            SurfaceErrorKind::NotFound
                | SurfaceErrorKind::Detached
                | SurfaceErrorKind::NotInteractable
        )
    }
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
