use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SurfaceResult;
use crate::predicate::Predicate;

/// Handle into the live document. Not stable: it may go stale after any
/// document mutation, so callers read what they need eagerly.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// Handle to a browsing context (tab). The primary context is always `0`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContextHandle(pub u64);

impl ContextHandle {
    pub const PRIMARY: ContextHandle = ContextHandle(0);
}

/// Snapshot of one link element, read eagerly.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub text: String,
    pub href: Option<String>,
}

/// Capability surface the reply engine drives. Every query runs against the
/// currently active context; implementations are nondeterministic and only
/// partially reliable.
#[async_trait]
pub trait DocumentSurface: Send + Sync {
    async fn navigate(&self, url: &str) -> SurfaceResult<()>;
    async fn scroll_to_bottom(&self) -> SurfaceResult<()>;

    /// Visible nodes matching the predicate, in document order.
    async fn find(&self, predicate: &Predicate) -> SurfaceResult<Vec<NodeHandle>>;

    /// Nearest ancestor (excluding the node itself) matching the predicate,
    /// searching at most `max_hops` levels up.
    async fn ancestor(
        &self,
        node: NodeHandle,
        predicate: &Predicate,
        max_hops: usize,
    ) -> SurfaceResult<Option<NodeHandle>>;
    async fn parent(&self, node: NodeHandle) -> SurfaceResult<Option<NodeHandle>>;
    async fn links_within(&self, node: NodeHandle) -> SurfaceResult<Vec<LinkInfo>>;
    async fn text_of(&self, node: NodeHandle) -> SurfaceResult<String>;
    async fn attribute(&self, node: NodeHandle, name: &str) -> SurfaceResult<Option<String>>;

    async fn scroll_into_view(&self, node: NodeHandle) -> SurfaceResult<()>;
    async fn click(&self, node: NodeHandle) -> SurfaceResult<()>;
    /// Script-level click that bypasses hit testing.
    async fn force_click(&self, node: NodeHandle) -> SurfaceResult<()>;
    async fn focused_input(&self) -> SurfaceResult<Option<NodeHandle>>;
    async fn type_text(&self, node: NodeHandle, text: &str) -> SurfaceResult<()>;
    async fn press_enter(&self, node: NodeHandle) -> SurfaceResult<()>;

    async fn screenshot(&self, path: &Path) -> SurfaceResult<()>;

    async fn active_context(&self) -> SurfaceResult<ContextHandle>;
    /// Open `url` in a new isolated context and make it active.
    async fn open_scoped_context(&self, url: &str) -> SurfaceResult<ContextHandle>;
    async fn close_scoped_context(&self, context: ContextHandle) -> SurfaceResult<()>;
    async fn switch_context(&self, context: ContextHandle) -> SurfaceResult<()>;
}
