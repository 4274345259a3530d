//! Chromium implementation of [`DocumentSurface`].
//!
//! Matched elements are tagged in-page with a `data-autoreply-node` attribute
//! and addressed by that number afterwards. A handle whose element has left
//! the document resolves to [`SurfaceErrorKind::Detached`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Element, Page};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{SurfaceError, SurfaceErrorKind, SurfaceResult};
use crate::predicate::Predicate;
use crate::surface::{ContextHandle, DocumentSurface, LinkInfo, NodeHandle};

const NODE_ATTR: &str = "data-autoreply-node";

const PRELUDE: &str = r#"
const __ar = (() => {
  const ATTR = 'data-autoreply-node';
  const visible = (el) => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
  const text = (el) => {
    const inner = (el.innerText || el.textContent || '').trim();
    return inner || (el.getAttribute('aria-label') || '').trim();
  };
  const tag = (el) => {
    let id = el.getAttribute(ATTR);
    if (!id) {
      window.__autoreplySeq = (window.__autoreplySeq || 0) + 1;
      id = String(window.__autoreplySeq);
      el.setAttribute(ATTR, id);
    }
    return Number(id);
  };
  const byId = (id) => document.querySelector(`[${ATTR}="${id}"]`);
  const textMatches = (p, raw) => {
    const s = raw.trim();
    const n = [...s].length;
    if (p.min != null && n < p.min) return false;
    if (p.max != null && n > p.max) return false;
    if (!p.text.length) return true;
    const low = s.toLowerCase();
    return p.text.some((x) => {
      if (x.kind === 'contains') return low.includes(x.value.toLowerCase());
      if (x.kind === 'equals') return low === x.value.trim().toLowerCase();
      try { return new RegExp(x.value, 'i').test(low); } catch (_) { return false; }
    });
  };
  const matches = (el, p) => el.matches(p.css) && textMatches(p, text(el));
  return { visible, text, tag, byId, textMatches, matches };
})();
"#;

#[derive(Debug, Deserialize)]
struct ScriptReply {
    status: String,
    #[serde(default)]
    value: Value,
}

/// Live surface over the pages of one attached or launched browser.
pub struct ChromiumSurface<'b> {
    browser: &'b Browser,
    contexts: Mutex<HashMap<u64, Page>>,
    active: AtomicU64,
    next_context: AtomicU64,
    navigation_timeout: Duration,
}

impl<'b> ChromiumSurface<'b> {
    pub fn new(browser: &'b Browser, primary: Page, navigation_timeout: Duration) -> Self {
        let mut contexts = HashMap::new();
        contexts.insert(ContextHandle::PRIMARY.0, primary);
        Self {
            browser,
            contexts: Mutex::new(contexts),
            active: AtomicU64::new(ContextHandle::PRIMARY.0),
            next_context: AtomicU64::new(1),
            navigation_timeout,
        }
    }

    async fn page(&self) -> SurfaceResult<Page> {
        let active = self.active.load(Ordering::SeqCst);
        self.contexts
            .lock()
            .await
            .get(&active)
            .cloned()
            .ok_or_else(|| SurfaceError::internal(format!("active context {active} is closed")))
    }

    async fn eval(&self, script: String) -> SurfaceResult<ScriptReply> {
        let page = self.page().await?;
        let result = page.evaluate(script).await.map_err(map_cdp)?;
        result
            .into_value::<ScriptReply>()
            .map_err(|err| SurfaceError::internal(format!("unexpected script result: {err}")))
    }

    /// Run `body` with `el` bound to the tagged element for `node`.
    async fn eval_node(&self, node: NodeHandle, body: &str) -> SurfaceResult<Value> {
        let script = format!(
            "(() => {{ {PRELUDE} const el = __ar.byId({id}); if (!el) {{ return {{ status: 'detached' }}; }} {body} }})()",
            id = node.0,
        );
        let reply = self.eval(script).await?;
        match reply.status.as_str() {
            "ok" => Ok(reply.value),
            "detached" => Err(SurfaceError::detached(format!("node {}", node.0))),
            other => Err(SurfaceError::internal(format!("script status {other}"))),
        }
    }

    async fn element(&self, node: NodeHandle) -> SurfaceResult<Element> {
        let page = self.page().await?;
        page.find_element(node_selector(node))
            .await
            .map_err(|err| match err {
                CdpError::NotFound => SurfaceError::detached(format!("node {}", node.0)),
                other => map_cdp(other),
            })
    }
}

fn node_selector(node: NodeHandle) -> String {
    format!("[{NODE_ATTR}=\"{}\"]", node.0)
}

fn predicate_json(predicate: &Predicate) -> Value {
    json!({
        "css": predicate.css(),
        "text": predicate.text,
        "min": predicate.min_text_len,
        "max": predicate.max_text_len,
    })
}

fn map_cdp(err: CdpError) -> SurfaceError {
    match err {
        CdpError::Timeout => SurfaceError::new(SurfaceErrorKind::NavTimeout),
        CdpError::NotFound => SurfaceError::not_found("cdp target not found"),
        other => SurfaceError::io(other.to_string()),
    }
}

fn handle_from(value: &Value) -> Option<NodeHandle> {
    value.as_u64().map(NodeHandle)
}

#[async_trait]
impl<'b> DocumentSurface for ChromiumSurface<'b> {
    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        let page = self.page().await?;
        debug!(target: "chromium", %url, "navigating");
        let load = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), CdpError>(())
        };
        match tokio::time::timeout(self.navigation_timeout, load).await {
            Ok(result) => result.map_err(map_cdp),
            Err(_) => Err(SurfaceError::new(SurfaceErrorKind::NavTimeout)
                .with_hint(format!("{url} did not load in {:?}", self.navigation_timeout))),
        }
    }

    async fn scroll_to_bottom(&self) -> SurfaceResult<()> {
        let script = "(() => { const s = document.scrollingElement || document.documentElement || document.body; window.scrollTo(0, s.scrollHeight || 0); return { status: 'ok' }; })()";
        self.eval(script.to_string()).await.map(|_| ())
    }

    async fn find(&self, predicate: &Predicate) -> SurfaceResult<Vec<NodeHandle>> {
        let script = format!(
            "(() => {{ {PRELUDE} const p = {p}; const found = Array.from(document.querySelectorAll(p.css)).filter((el) => __ar.visible(el) && __ar.textMatches(p, __ar.text(el))).map(__ar.tag); return {{ status: 'ok', value: found }}; }})()",
            p = predicate_json(predicate),
        );
        let reply = self.eval(script).await?;
        Ok(reply
            .value
            .as_array()
            .map(|ids| ids.iter().filter_map(handle_from).collect())
            .unwrap_or_default())
    }

    async fn ancestor(
        &self,
        node: NodeHandle,
        predicate: &Predicate,
        max_hops: usize,
    ) -> SurfaceResult<Option<NodeHandle>> {
        let body = format!(
            "const p = {p}; let cur = el.parentElement; for (let i = 0; cur && i < {max_hops}; i++, cur = cur.parentElement) {{ if (__ar.matches(cur, p)) {{ return {{ status: 'ok', value: __ar.tag(cur) }}; }} }} return {{ status: 'ok', value: null }};",
            p = predicate_json(predicate),
        );
        Ok(handle_from(&self.eval_node(node, &body).await?))
    }

    async fn parent(&self, node: NodeHandle) -> SurfaceResult<Option<NodeHandle>> {
        let body = "return { status: 'ok', value: el.parentElement ? __ar.tag(el.parentElement) : null };";
        Ok(handle_from(&self.eval_node(node, body).await?))
    }

    async fn links_within(&self, node: NodeHandle) -> SurfaceResult<Vec<LinkInfo>> {
        let body = "const links = Array.from(el.querySelectorAll('a[href], [role=\"link\"]')).map((a) => ({ text: __ar.text(a), href: a.href || a.getAttribute('href') || null })); return { status: 'ok', value: links };";
        let value = self.eval_node(node, body).await?;
        serde_json::from_value(value)
            .map_err(|err| SurfaceError::internal(format!("malformed link list: {err}")))
    }

    async fn text_of(&self, node: NodeHandle) -> SurfaceResult<String> {
        let value = self
            .eval_node(node, "return { status: 'ok', value: __ar.text(el) };")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, node: NodeHandle, name: &str) -> SurfaceResult<Option<String>> {
        let name = serde_json::to_string(name)
            .map_err(|err| SurfaceError::internal(format!("invalid attribute name: {err}")))?;
        let body = format!("return {{ status: 'ok', value: el.getAttribute({name}) }};");
        let value = self.eval_node(node, &body).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn scroll_into_view(&self, node: NodeHandle) -> SurfaceResult<()> {
        self.element(node)
            .await?
            .scroll_into_view()
            .await
            .map(|_| ())
            .map_err(map_cdp)
    }

    async fn click(&self, node: NodeHandle) -> SurfaceResult<()> {
        let element = self.element(node).await?;
        element.click().await.map(|_| ()).map_err(|err| {
            SurfaceError::new(SurfaceErrorKind::NotInteractable).with_hint(err.to_string())
        })
    }

    async fn force_click(&self, node: NodeHandle) -> SurfaceResult<()> {
        self.eval_node(node, "el.click(); return { status: 'ok' };")
            .await
            .map(|_| ())
    }

    async fn focused_input(&self) -> SurfaceResult<Option<NodeHandle>> {
        let script = format!(
            "(() => {{ {PRELUDE} const el = document.activeElement; if (!el || el === document.body) {{ return {{ status: 'ok', value: null }}; }} const editable = el.isContentEditable || ['TEXTAREA', 'INPUT'].includes(el.tagName) || el.getAttribute('role') === 'textbox'; return {{ status: 'ok', value: editable ? __ar.tag(el) : null }}; }})()"
        );
        let reply = self.eval(script).await?;
        Ok(handle_from(&reply.value))
    }

    async fn type_text(&self, node: NodeHandle, text: &str) -> SurfaceResult<()> {
        self.element(node)
            .await?
            .type_str(text)
            .await
            .map(|_| ())
            .map_err(map_cdp)
    }

    async fn press_enter(&self, node: NodeHandle) -> SurfaceResult<()> {
        self.element(node)
            .await?
            .press_key("Enter")
            .await
            .map(|_| ())
            .map_err(map_cdp)
    }

    async fn screenshot(&self, path: &Path) -> SurfaceResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| SurfaceError::io(format!("screenshot dir: {err}")))?;
        }
        let page = self.page().await?;
        page.save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map(|_| ())
            .map_err(map_cdp)
    }

    async fn active_context(&self) -> SurfaceResult<ContextHandle> {
        Ok(ContextHandle(self.active.load(Ordering::SeqCst)))
    }

    async fn open_scoped_context(&self, url: &str) -> SurfaceResult<ContextHandle> {
        let page = self.browser.new_page(url).await.map_err(map_cdp)?;
        if let Err(err) = page.bring_to_front().await {
            warn!(target: "chromium", ?err, "could not focus scoped context");
        }
        let id = self.next_context.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().await.insert(id, page);
        self.active.store(id, Ordering::SeqCst);
        debug!(target: "chromium", context = id, %url, "opened scoped context");
        Ok(ContextHandle(id))
    }

    async fn close_scoped_context(&self, context: ContextHandle) -> SurfaceResult<()> {
        if context == ContextHandle::PRIMARY {
            return Err(SurfaceError::new(SurfaceErrorKind::Unsupported)
                .with_hint("the primary context is owned by the session"));
        }
        let page = self
            .contexts
            .lock()
            .await
            .remove(&context.0)
            .ok_or_else(|| SurfaceError::not_found(format!("context {}", context.0)))?;
        if fall_back_to_primary(&self.active, context) {
            debug!(target: "chromium", context = context.0, "closed the active context; primary is active again");
        }
        page.close().await.map_err(map_cdp)
    }

    async fn switch_context(&self, context: ContextHandle) -> SurfaceResult<()> {
        let page = self
            .contexts
            .lock()
            .await
            .get(&context.0)
            .cloned()
            .ok_or_else(|| SurfaceError::not_found(format!("context {}", context.0)))?;
        self.active.store(context.0, Ordering::SeqCst);
        if let Err(err) = page.bring_to_front().await {
            warn!(target: "chromium", context = context.0, ?err, "could not focus context");
        }
        Ok(())
    }
}

/// Point `active` back at the primary page when `closed` was the active one.
fn fall_back_to_primary(active: &AtomicU64, closed: ContextHandle) -> bool {
    active
        .compare_exchange(
            closed.0,
            ContextHandle::PRIMARY.0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        )
        .is_ok()
}
