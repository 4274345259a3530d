//! Document query surface.
//!
//! A small predicate-query contract over a live document with no reliable
//! schema, plus two implementations: a Chromium page set driven over the
//! DevTools protocol and an in-memory fixture tree for tests and rehearsals.

pub mod chromium;
pub mod config;
pub mod error;
pub mod fixture;
pub mod predicate;
pub mod session;
pub mod surface;

pub use chromium::ChromiumSurface;
pub use config::SessionConfig;
pub use error::{SurfaceError, SurfaceErrorKind, SurfaceResult};
pub use fixture::{ContextEvent, Fault, FixtureDocument, FixtureSpec, NodeSpec, Submission};
pub use predicate::{AttrMatch, Predicate, Role, TextPattern};
pub use session::{BrowserSession, SessionMode};
pub use surface::{ContextHandle, DocumentSurface, LinkInfo, NodeHandle};
