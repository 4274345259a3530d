//! In-memory document used for offline rehearsal and tests.
//!
//! The tree is described by [`NodeSpec`]s (buildable in code or loaded from
//! YAML) and evaluates predicates with the same semantics as the Chromium
//! surface. Scripted behaviour covers lazy rendering, click-to-reveal
//! affordances, reply composers, per-URL profile documents for scoped
//! contexts, and injected faults. Everything the engine does to the document
//! is recorded for later inspection.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{SurfaceError, SurfaceErrorKind, SurfaceResult};
use crate::predicate::{Predicate, Role};
use crate::surface::{ContextHandle, DocumentSurface, LinkInfo, NodeHandle};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// Every click, direct or forced, fails.
    ClickFails,
    /// Direct click is intercepted; a forced click goes through.
    ClickIntercepted,
    /// Click succeeds but no input gains focus.
    NoComposer,
    /// The composer rejects the submit keystroke.
    SubmitFails,
    /// The node is found but any later operation reports it detached.
    Detached,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub hidden: bool,
    /// Hidden until the document has been scrolled to the bottom once.
    #[serde(default)]
    pub lazy: bool,
    /// Nodes inserted right after this one when it is clicked.
    #[serde(default)]
    pub reveals: Vec<NodeSpec>,
    /// Keep the node after it revealed its content.
    #[serde(default)]
    pub persist: bool,
    /// Clicking opens and focuses a reply input.
    #[serde(default)]
    pub composer: bool,
    #[serde(default)]
    pub fault: Option<Fault>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn reveals(mut self, nodes: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.reveals.extend(nodes);
        self
    }

    pub fn persist(mut self) -> Self {
        self.persist = true;
        self
    }

    pub fn composer(mut self) -> Self {
        self.composer = true;
        self
    }

    pub fn fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn child(mut self, node: NodeSpec) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(nodes);
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FixtureSpec {
    /// Primary document roots.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Documents served to scoped contexts, keyed by URL.
    #[serde(default)]
    pub profiles: HashMap<String, Vec<NodeSpec>>,
    #[serde(default)]
    pub navigation_fails: bool,
    #[serde(default)]
    pub scoped_open_fails: bool,
}

impl FixtureSpec {
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }
}

/// A reply sent through a composer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Submission {
    /// Affordance whose composer received the text.
    pub affordance: NodeHandle,
    pub text: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextEvent {
    Opened(ContextHandle),
    Closed(ContextHandle),
    Switched(ContextHandle),
}

#[derive(Debug)]
struct Node {
    tag: String,
    role: Option<Role>,
    text: Option<String>,
    href: Option<String>,
    attributes: BTreeMap<String, String>,
    hidden: bool,
    lazy: bool,
    reveals: Vec<NodeSpec>,
    persist: bool,
    composer: bool,
    fault: Option<Fault>,
    parent: Option<usize>,
    children: Vec<usize>,
    context: u64,
    removed: bool,
}

impl Node {
    fn roles(&self) -> Vec<Role> {
        let mut roles = Vec::with_capacity(2);
        if let Some(role) = self.role {
            roles.push(role);
        }
        if let Some(role) = Role::implicit_for_tag(&self.tag) {
            roles.push(role);
        }
        if self.tag.eq_ignore_ascii_case("a") && self.href.is_none() {
            roles.retain(|role| *role != Role::Link);
        }
        roles
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        if name == "href" {
            return self.href.as_deref();
        }
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<Node>,
    roots: HashMap<u64, Vec<usize>>,
    active: u64,
    open_contexts: BTreeSet<u64>,
    next_context: u64,
    scrolls: usize,
    focused: Option<usize>,
    composers: HashMap<usize, usize>,
    buffers: HashMap<usize, String>,
    submissions: Vec<Submission>,
    clicks: Vec<NodeHandle>,
    navigations: Vec<String>,
    screenshots: Vec<PathBuf>,
    context_events: Vec<ContextEvent>,
}

impl State {
    fn build(&mut self, spec: &NodeSpec, parent: Option<usize>, context: u64) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: spec.tag.clone(),
            role: spec.role,
            text: spec.text.clone(),
            href: spec.href.clone(),
            attributes: spec.attributes.clone(),
            hidden: spec.hidden,
            lazy: spec.lazy,
            reveals: spec.reveals.clone(),
            persist: spec.persist,
            composer: spec.composer,
            fault: spec.fault,
            parent,
            children: Vec::new(),
            context,
            removed: false,
        });
        let children: Vec<usize> = spec
            .children
            .iter()
            .map(|child| self.build(child, Some(id), context))
            .collect();
        self.nodes[id].children = children;
        id
    }

    fn load_context(&mut self, context: u64, specs: &[NodeSpec]) {
        let roots = specs
            .iter()
            .map(|spec| self.build(spec, None, context))
            .collect();
        self.roots.insert(context, roots);
        self.open_contexts.insert(context);
    }

    fn visible(&self, id: usize) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            if node.removed || node.hidden || (node.lazy && self.scrolls == 0) {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    fn text(&self, id: usize) -> String {
        let node = &self.nodes[id];
        let mut parts: Vec<String> = Vec::new();
        if let Some(text) = &node.text {
            parts.push(text.trim().to_string());
        }
        for child in &node.children {
            if self.visible(*child) {
                let text = self.text(*child);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
        parts.retain(|part| !part.is_empty());
        parts.join(" ")
    }

    fn matches(&self, id: usize, predicate: &Predicate) -> bool {
        let node = &self.nodes[id];
        predicate.matches_shape(&node.roles(), |name| node.attribute(name))
            && predicate.matches_text(&self.text(id))
    }

    fn walk(&self, id: usize, out: &mut Vec<usize>) {
        if !self.visible(id) {
            return;
        }
        out.push(id);
        for child in &self.nodes[id].children {
            self.walk(*child, out);
        }
    }

    fn visible_in_active(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for root in self.roots.get(&self.active).into_iter().flatten() {
            self.walk(*root, &mut out);
        }
        out
    }

    /// Resolve a handle the way a live page would: gone, detached, or in
    /// another tab all read as detached.
    fn resolve(&self, node: NodeHandle) -> SurfaceResult<usize> {
        let id = usize::try_from(node.0)
            .ok()
            .filter(|id| *id < self.nodes.len())
            .ok_or_else(|| SurfaceError::detached(format!("node {}", node.0)))?;
        let entry = &self.nodes[id];
        if entry.removed
            || entry.context != self.active
            || entry.fault == Some(Fault::Detached)
            || !self.open_contexts.contains(&entry.context)
        {
            return Err(SurfaceError::detached(format!("node {}", node.0)));
        }
        Ok(id)
    }

    fn insert_after(&mut self, anchor: usize, new_ids: Vec<usize>) {
        let parent = self.nodes[anchor].parent;
        let context = self.nodes[anchor].context;
        let siblings = match parent {
            Some(parent) => &mut self.nodes[parent].children,
            None => self.roots.entry(context).or_default(),
        };
        let at = siblings
            .iter()
            .position(|sibling| *sibling == anchor)
            .map(|pos| pos + 1)
            .unwrap_or(siblings.len());
        for (offset, id) in new_ids.into_iter().enumerate() {
            siblings.insert(at + offset, id);
        }
    }

    fn activate(&mut self, id: usize) {
        self.clicks.push(NodeHandle(id as u64));
        let parent = self.nodes[id].parent;
        let context = self.nodes[id].context;

        let reveals = std::mem::take(&mut self.nodes[id].reveals);
        if !reveals.is_empty() {
            let new_ids = reveals
                .iter()
                .map(|spec| self.build(spec, parent, context))
                .collect();
            self.insert_after(id, new_ids);
            if !self.nodes[id].persist {
                self.nodes[id].removed = true;
            }
        }

        if self.nodes[id].composer && self.nodes[id].fault != Some(Fault::NoComposer) {
            let input_spec = NodeSpec::new("div")
                .role(Role::Textbox)
                .attr("contenteditable", "true");
            let input = self.build(&input_spec, parent, context);
            self.insert_after(id, vec![input]);
            self.composers.insert(input, id);
            self.focused = Some(input);
        }
    }
}

/// In-memory [`DocumentSurface`].
pub struct FixtureDocument {
    profiles: HashMap<String, Vec<NodeSpec>>,
    navigation_fails: bool,
    scoped_open_fails: bool,
    state: Mutex<State>,
}

impl FixtureDocument {
    pub fn new(spec: FixtureSpec) -> Self {
        let mut state = State {
            next_context: 1,
            ..Default::default()
        };
        state.load_context(ContextHandle::PRIMARY.0, &spec.nodes);
        Self {
            profiles: spec.profiles,
            navigation_fails: spec.navigation_fails,
            scoped_open_fails: spec.scoped_open_fails,
            state: Mutex::new(state),
        }
    }

    pub fn from_nodes(nodes: Vec<NodeSpec>) -> Self {
        Self::new(FixtureSpec {
            nodes,
            ..Default::default()
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        FixtureSpec::from_yaml(raw).map(Self::new)
    }

    pub fn load(path: &Path) -> SurfaceResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SurfaceError::io(format!("{}: {err}", path.display())))?;
        Self::from_yaml(&raw)
            .map_err(|err| SurfaceError::internal(format!("{}: {err}", path.display())))
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }

    pub fn clicks(&self) -> Vec<NodeHandle> {
        self.state.lock().clicks.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().screenshots.clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.state.lock().scrolls
    }

    pub fn context_events(&self) -> Vec<ContextEvent> {
        self.state.lock().context_events.clone()
    }

    pub fn current_context(&self) -> ContextHandle {
        ContextHandle(self.state.lock().active)
    }

    pub fn open_contexts(&self) -> Vec<ContextHandle> {
        self.state
            .lock()
            .open_contexts
            .iter()
            .map(|id| ContextHandle(*id))
            .collect()
    }

    fn profile_nodes(&self, url: &str) -> Vec<NodeSpec> {
        let bare = url.split(['?', '#']).next().unwrap_or(url);
        self.profiles
            .get(url)
            .or_else(|| self.profiles.get(bare))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentSurface for FixtureDocument {
    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        if self.navigation_fails {
            return Err(SurfaceError::new(SurfaceErrorKind::NavTimeout).with_hint(url.to_string()));
        }
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> SurfaceResult<()> {
        self.state.lock().scrolls += 1;
        Ok(())
    }

    async fn find(&self, predicate: &Predicate) -> SurfaceResult<Vec<NodeHandle>> {
        let state = self.state.lock();
        Ok(state
            .visible_in_active()
            .into_iter()
            .filter(|id| state.matches(*id, predicate))
            .map(|id| NodeHandle(id as u64))
            .collect())
    }

    async fn ancestor(
        &self,
        node: NodeHandle,
        predicate: &Predicate,
        max_hops: usize,
    ) -> SurfaceResult<Option<NodeHandle>> {
        let state = self.state.lock();
        let mut cursor = state.nodes[state.resolve(node)?].parent;
        for _ in 0..max_hops {
            let Some(current) = cursor else {
                break;
            };
            if state.matches(current, predicate) {
                return Ok(Some(NodeHandle(current as u64)));
            }
            cursor = state.nodes[current].parent;
        }
        Ok(None)
    }

    async fn parent(&self, node: NodeHandle) -> SurfaceResult<Option<NodeHandle>> {
        let state = self.state.lock();
        let id = state.resolve(node)?;
        Ok(state.nodes[id].parent.map(|parent| NodeHandle(parent as u64)))
    }

    async fn links_within(&self, node: NodeHandle) -> SurfaceResult<Vec<LinkInfo>> {
        let state = self.state.lock();
        let id = state.resolve(node)?;
        let mut subtree = Vec::new();
        state.walk(id, &mut subtree);
        Ok(subtree
            .into_iter()
            .skip(1)
            .filter(|id| state.nodes[*id].roles().contains(&Role::Link))
            .map(|id| LinkInfo {
                text: state.text(id),
                href: state.nodes[id].href.clone(),
            })
            .collect())
    }

    async fn text_of(&self, node: NodeHandle) -> SurfaceResult<String> {
        let state = self.state.lock();
        let id = state.resolve(node)?;
        Ok(state.text(id))
    }

    async fn attribute(&self, node: NodeHandle, name: &str) -> SurfaceResult<Option<String>> {
        let state = self.state.lock();
        let id = state.resolve(node)?;
        Ok(state.nodes[id].attribute(name).map(str::to_string))
    }

    async fn scroll_into_view(&self, node: NodeHandle) -> SurfaceResult<()> {
        self.state.lock().resolve(node).map(|_| ())
    }

    async fn click(&self, node: NodeHandle) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        let id = state.resolve(node)?;
        if !state.visible(id) {
            return Err(SurfaceError::new(SurfaceErrorKind::NotInteractable)
                .with_hint(format!("node {} is not rendered", node.0)));
        }
        match state.nodes[id].fault {
            Some(Fault::ClickFails) => {
                Err(SurfaceError::io(format!("click on node {} failed", node.0)))
            }
            Some(Fault::ClickIntercepted) => Err(SurfaceError::new(
                SurfaceErrorKind::NotInteractable,
            )
            .with_hint(format!("click on node {} intercepted by overlay", node.0))),
            _ => {
                state.activate(id);
                Ok(())
            }
        }
    }

    async fn force_click(&self, node: NodeHandle) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        let id = state.resolve(node)?;
        if state.nodes[id].fault == Some(Fault::ClickFails) {
            return Err(SurfaceError::io(format!("click on node {} failed", node.0)));
        }
        state.activate(id);
        Ok(())
    }

    async fn focused_input(&self) -> SurfaceResult<Option<NodeHandle>> {
        let state = self.state.lock();
        Ok(state
            .focused
            .filter(|id| state.nodes[*id].context == state.active)
            .map(|id| NodeHandle(id as u64)))
    }

    async fn type_text(&self, node: NodeHandle, text: &str) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        let id = state.resolve(node)?;
        if !state.nodes[id].roles().contains(&Role::Textbox) {
            return Err(SurfaceError::new(SurfaceErrorKind::NotInteractable)
                .with_hint(format!("node {} does not accept text", node.0)));
        }
        state.buffers.entry(id).or_default().push_str(text);
        Ok(())
    }

    async fn press_enter(&self, node: NodeHandle) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        let id = state.resolve(node)?;
        let Some(affordance) = state.composers.get(&id).copied() else {
            return Ok(());
        };
        if state.nodes[affordance].fault == Some(Fault::SubmitFails) {
            return Err(SurfaceError::io("composer rejected the reply"));
        }
        let text = state.buffers.remove(&id).unwrap_or_default();
        state.submissions.push(Submission {
            affordance: NodeHandle(affordance as u64),
            text,
        });
        state.nodes[id].removed = true;
        state.focused = None;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> SurfaceResult<()> {
        self.state.lock().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn active_context(&self) -> SurfaceResult<ContextHandle> {
        Ok(self.current_context())
    }

    async fn open_scoped_context(&self, url: &str) -> SurfaceResult<ContextHandle> {
        if self.scoped_open_fails {
            return Err(SurfaceError::io(format!("could not open tab for {url}")));
        }
        let nodes = self.profile_nodes(url);
        let mut state = self.state.lock();
        let id = state.next_context;
        state.next_context += 1;
        state.load_context(id, &nodes);
        state.active = id;
        state.context_events.push(ContextEvent::Opened(ContextHandle(id)));
        Ok(ContextHandle(id))
    }

    async fn close_scoped_context(&self, context: ContextHandle) -> SurfaceResult<()> {
        if context == ContextHandle::PRIMARY {
            return Err(SurfaceError::new(SurfaceErrorKind::Unsupported)
                .with_hint("the primary context is owned by the session"));
        }
        let mut state = self.state.lock();
        if !state.open_contexts.remove(&context.0) {
            return Err(SurfaceError::not_found(format!("context {}", context.0)));
        }
        state.context_events.push(ContextEvent::Closed(context));
        Ok(())
    }

    async fn switch_context(&self, context: ContextHandle) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        if !state.open_contexts.contains(&context.0) {
            return Err(SurfaceError::not_found(format!("context {}", context.0)));
        }
        state.active = context.0;
        state.context_events.push(ContextEvent::Switched(context));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::TextPattern;

    fn reply_button() -> Predicate {
        Predicate::role(Role::Button).with_text(TextPattern::equals("Reply"))
    }

    #[tokio::test]
    async fn lazy_nodes_appear_after_scrolling() {
        let doc = FixtureDocument::from_nodes(vec![
            NodeSpec::new("button").text("Reply"),
            NodeSpec::new("button").text("Reply").lazy(),
        ]);
        assert_eq!(doc.find(&reply_button()).await.unwrap().len(), 1);
        doc.scroll_to_bottom().await.unwrap();
        assert_eq!(doc.find(&reply_button()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clicking_an_affordance_reveals_and_consumes_it() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("div")
            .role(Role::Button)
            .text("View more comments")
            .reveals([NodeSpec::new("button").text("Reply")])]);
        let more = Predicate::role(Role::Button).with_text(TextPattern::contains("view more"));
        let found = doc.find(&more).await.unwrap();
        assert_eq!(found.len(), 1);
        doc.click(found[0]).await.unwrap();
        assert!(doc.find(&more).await.unwrap().is_empty());
        assert_eq!(doc.find(&reply_button()).await.unwrap().len(), 1);
        let err = doc.text_of(found[0]).await.unwrap_err();
        assert_eq!(err.kind, SurfaceErrorKind::Detached);
    }

    #[tokio::test]
    async fn composer_records_typed_submission() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("button")
            .text("Reply")
            .composer()]);
        let reply = doc.find(&reply_button()).await.unwrap()[0];
        doc.click(reply).await.unwrap();
        let input = doc.focused_input().await.unwrap().expect("focused composer");
        doc.type_text(input, "thanks!").await.unwrap();
        doc.press_enter(input).await.unwrap();
        assert_eq!(
            doc.submissions(),
            vec![Submission {
                affordance: reply,
                text: "thanks!".into()
            }]
        );
        assert!(doc.focused_input().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn intercepted_click_yields_to_force_click() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("button")
            .text("Reply")
            .composer()
            .fault(Fault::ClickIntercepted)]);
        let reply = doc.find(&reply_button()).await.unwrap()[0];
        let err = doc.click(reply).await.unwrap_err();
        assert_eq!(err.kind, SurfaceErrorKind::NotInteractable);
        doc.force_click(reply).await.unwrap();
        assert!(doc.focused_input().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn ancestor_search_respects_hop_limit() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("div")
            .role(Role::Article)
            .child(NodeSpec::new("div").child(
                NodeSpec::new("div").child(NodeSpec::new("button").text("Reply")),
            ))]);
        let reply = doc.find(&reply_button()).await.unwrap()[0];
        let article = Predicate::role(Role::Article);
        assert!(doc.ancestor(reply, &article, 2).await.unwrap().is_none());
        assert!(doc.ancestor(reply, &article, 3).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn scoped_contexts_isolate_queries() {
        let mut profiles = HashMap::new();
        profiles.insert(
            "https://example.test/alice".to_string(),
            vec![NodeSpec::new("h2").text("Intro")],
        );
        let doc = FixtureDocument::new(FixtureSpec {
            nodes: vec![NodeSpec::new("button").text("Reply")],
            profiles,
            ..Default::default()
        });
        let primary_reply = doc.find(&reply_button()).await.unwrap()[0];
        let ctx = doc
            .open_scoped_context("https://example.test/alice?ref=comment")
            .await
            .unwrap();
        let heading = Predicate::role(Role::Heading).with_text(TextPattern::equals("intro"));
        assert_eq!(doc.find(&heading).await.unwrap().len(), 1);
        assert!(doc.find(&reply_button()).await.unwrap().is_empty());
        assert!(doc.text_of(primary_reply).await.is_err());

        doc.close_scoped_context(ctx).await.unwrap();
        doc.switch_context(ContextHandle::PRIMARY).await.unwrap();
        assert_eq!(doc.current_context(), ContextHandle::PRIMARY);
        assert_eq!(doc.open_contexts(), vec![ContextHandle::PRIMARY]);
        assert_eq!(doc.text_of(primary_reply).await.unwrap(), "Reply");
    }

    #[test]
    fn yaml_fixture_parses_nested_nodes() {
        let raw = r#"
nodes:
  - role: article
    children:
      - tag: a
        href: https://example.test/bob
        text: Bob
      - tag: button
        text: Reply
        composer: true
        fault: submit_fails
"#;
        let spec = FixtureSpec::from_yaml(raw).expect("yaml fixture");
        assert_eq!(spec.nodes[0].role, Some(Role::Article));
        assert_eq!(spec.nodes[0].children[1].fault, Some(Fault::SubmitFails));
        assert_eq!(spec.nodes[0].children[0].tag, "a");
    }
}
