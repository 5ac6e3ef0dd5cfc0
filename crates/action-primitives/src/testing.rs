//! In-memory scripted DOM implementing the session traits.
//!
//! Nodes live in an arena and are matched by the queries they were labelled
//! with (plus structural `TextContains` evaluation), so tests describe pages
//! in terms of the same candidate queries the components are configured
//! with. Click, back and navigate hooks mutate the DOM the way the remote
//! portal re-renders after an interaction.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::{
    errors::ActionError,
    session::{BrowserSession, DomElement, Element},
    types::Query,
};

pub type NodeId = usize;

/// DOM mutation run when an interaction happens
pub type Hook = Arc<dyn Fn(&mut DomState) + Send + Sync>;

/// Blueprint of a node to append
#[derive(Debug, Clone)]
pub struct NodeSpec {
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    labels: Vec<Query>,
    visible: bool,
    occluded: bool,
    faulty: bool,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            labels: Vec::new(),
            visible: true,
            occluded: false,
            faulty: false,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Make the node match `query`
    pub fn label(mut self, query: Query) -> Self {
        self.labels.push(query);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(self) -> Self {
        self.attr("disabled", "disabled")
    }

    /// Direct clicks are intercepted; only synthetic activation gets through
    pub fn occluded(mut self) -> Self {
        self.occluded = true;
        self
    }

    /// Reading text or attributes fails with a script error
    pub fn faulty(mut self) -> Self {
        self.faulty = true;
        self
    }
}

#[derive(Debug)]
struct Node {
    spec: NodeSpec,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    direct_clicks: usize,
    synthetic_clicks: usize,
}

/// Mutable state behind a [`FakeDom`]
pub struct DomState {
    nodes: Vec<Node>,
    url: String,
    title: String,
    history: Vec<String>,
    click_hooks: HashMap<NodeId, Hook>,
    back_hook: Option<Hook>,
    navigate_hook: Option<Hook>,
    fail_back: bool,
    back_calls: usize,
}

const ROOT: NodeId = 0;

impl DomState {
    fn new(url: &str) -> Self {
        Self {
            nodes: vec![Node {
                spec: NodeSpec::new("html"),
                parent: None,
                children: Vec::new(),
                direct_clicks: 0,
                synthetic_clicks: 0,
            }],
            url: url.to_string(),
            title: String::new(),
            history: Vec::new(),
            click_hooks: HashMap::new(),
            back_hook: None,
            navigate_hook: None,
            fail_back: false,
            back_calls: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn append(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            spec,
            parent: Some(parent),
            children: Vec::new(),
            direct_clicks: 0,
            synthetic_clicks: 0,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Detach `node` and its subtree from the document
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node].parent.take() {
            self.nodes[parent].children.retain(|child| *child != node);
        }
    }

    pub fn clear_children(&mut self, node: NodeId) {
        for child in std::mem::take(&mut self.nodes[node].children) {
            self.nodes[child].parent = None;
        }
    }

    /// Replace the URL without recording history
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Move to `url`, recording the current one in history
    pub fn push_url(&mut self, url: impl Into<String>) {
        let previous = std::mem::replace(&mut self.url, url.into());
        self.history.push(previous);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.nodes[node].spec.visible = visible;
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.nodes[node].spec.text = text.into();
    }

    pub fn on_click(&mut self, node: NodeId, hook: Hook) {
        self.click_hooks.insert(node, hook);
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == ROOT {
                return true;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if !self.nodes[id].spec.visible {
                return false;
            }
            current = self.nodes[id].parent;
        }
        true
    }

    fn full_text(&self, node: NodeId) -> String {
        let mut parts = Vec::new();
        let own = self.nodes[node].spec.text.trim();
        if !own.is_empty() {
            parts.push(own.to_string());
        }
        for child in &self.nodes[node].children {
            let text = self.full_text(*child);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }

    fn descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node].children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }

    fn matches(&self, node: NodeId, query: &Query) -> bool {
        let spec = &self.nodes[node].spec;
        if spec.labels.contains(query) {
            return true;
        }
        match query {
            Query::TextContains { tag, needles } => {
                spec.tag.eq_ignore_ascii_case(tag) && {
                    let text = self.full_text(node);
                    needles.iter().all(|needle| text.contains(needle.as_str()))
                }
            }
            _ => false,
        }
    }

    fn query(&self, scope: NodeId, query: &Query) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(scope, &mut all);
        all.into_iter()
            .filter(|node| self.matches(*node, query))
            .collect()
    }

    fn fire_click(&mut self, node: NodeId) {
        if self.nodes[node].spec.attributes.contains_key("disabled") {
            return;
        }
        if let Some(hook) = self.click_hooks.get(&node).cloned() {
            hook(self);
        }
    }
}

/// Cloneable handle over a shared [`DomState`]; implements [`BrowserSession`].
#[derive(Clone)]
pub struct FakeDom {
    state: Arc<Mutex<DomState>>,
}

impl FakeDom {
    pub fn new(url: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(DomState::new(url))),
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn append(&self, parent: NodeId, spec: NodeSpec) -> NodeId {
        self.state.lock().append(parent, spec)
    }

    pub fn remove(&self, node: NodeId) {
        self.state.lock().remove(node)
    }

    pub fn clear_children(&self, node: NodeId) {
        self.state.lock().clear_children(node)
    }

    pub fn set_url(&self, url: &str) {
        self.state.lock().set_url(url)
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().set_title(title)
    }

    pub fn set_visible(&self, node: NodeId, visible: bool) {
        self.state.lock().set_visible(node, visible)
    }

    /// Run `hook` whenever `node` is activated (direct or synthetic)
    pub fn on_click<F>(&self, node: NodeId, hook: F)
    where
        F: Fn(&mut DomState) + Send + Sync + 'static,
    {
        self.state.lock().on_click(node, Arc::new(hook))
    }

    /// Run `hook` after every successful `go_back`
    pub fn on_back<F>(&self, hook: F)
    where
        F: Fn(&mut DomState) + Send + Sync + 'static,
    {
        self.state.lock().back_hook = Some(Arc::new(hook));
    }

    /// Run `hook` after every `navigate`
    pub fn on_navigate<F>(&self, hook: F)
    where
        F: Fn(&mut DomState) + Send + Sync + 'static,
    {
        self.state.lock().navigate_hook = Some(Arc::new(hook));
    }

    /// Make `go_back` fail with a session error
    pub fn fail_back(&self, fail: bool) {
        self.state.lock().fail_back = fail;
    }

    /// Mutate the DOM directly
    pub fn with_state<R>(&self, f: impl FnOnce(&mut DomState) -> R) -> R {
        f(&mut *self.state.lock())
    }

    pub fn direct_clicks(&self, node: NodeId) -> usize {
        self.state.lock().nodes[node].direct_clicks
    }

    pub fn synthetic_clicks(&self, node: NodeId) -> usize {
        self.state.lock().nodes[node].synthetic_clicks
    }

    pub fn text_of(&self, node: NodeId) -> String {
        self.state.lock().full_text(node)
    }

    pub fn attribute_of(&self, node: NodeId, name: &str) -> Option<String> {
        self.state.lock().nodes[node].spec.attributes.get(name).cloned()
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.state.lock().is_attached(node)
    }

    pub fn back_calls(&self) -> usize {
        self.state.lock().back_calls
    }

    fn element(&self, id: NodeId) -> Element {
        Arc::new(FakeElement {
            state: self.state.clone(),
            id,
        })
    }
}

#[async_trait]
impl BrowserSession for FakeDom {
    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.push_url(url);
        if let Some(hook) = state.navigate_hook.clone() {
            hook(&mut *state);
        }
        Ok(())
    }

    async fn go_back(&self) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.back_calls += 1;
        if state.fail_back {
            return Err(ActionError::SessionIo("history navigation refused".into()));
        }
        let previous = state
            .history
            .pop()
            .ok_or_else(|| ActionError::SessionIo("no history entry to go back to".into()))?;
        state.url = previous;
        if let Some(hook) = state.back_hook.clone() {
            hook(&mut *state);
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ActionError> {
        Ok(self.state.lock().url.clone())
    }

    async fn title(&self) -> Result<String, ActionError> {
        Ok(self.state.lock().title.clone())
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, ActionError> {
        let ids = self.state.lock().query(ROOT, query);
        Ok(ids.into_iter().map(|id| self.element(id)).collect())
    }
}

/// Element handle into a [`FakeDom`]
pub struct FakeElement {
    state: Arc<Mutex<DomState>>,
    id: NodeId,
}

impl FakeElement {
    fn live(&self) -> Result<parking_lot::MutexGuard<'_, DomState>, ActionError> {
        let state = self.state.lock();
        if state.is_attached(self.id) {
            Ok(state)
        } else {
            Err(ActionError::StaleElement(format!("node #{} detached", self.id)))
        }
    }

    fn readable(&self) -> Result<parking_lot::MutexGuard<'_, DomState>, ActionError> {
        let state = self.live()?;
        if state.nodes[self.id].spec.faulty {
            return Err(ActionError::Script(format!(
                "node #{} threw while reading",
                self.id
            )));
        }
        Ok(state)
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FakeElement(#{})", self.id)
    }
}

#[async_trait]
impl DomElement for FakeElement {
    fn describe(&self) -> String {
        let state = self.state.lock();
        format!("<{}#{}>", state.nodes[self.id].spec.tag, self.id)
    }

    async fn text(&self) -> Result<String, ActionError> {
        Ok(self.readable()?.full_text(self.id))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ActionError> {
        Ok(self.readable()?.nodes[self.id].spec.attributes.get(name).cloned())
    }

    async fn is_visible(&self) -> Result<bool, ActionError> {
        Ok(self.live()?.is_visible(self.id))
    }

    async fn is_enabled(&self) -> Result<bool, ActionError> {
        Ok(!self.live()?.nodes[self.id]
            .spec
            .attributes
            .contains_key("disabled"))
    }

    async fn click(&self) -> Result<(), ActionError> {
        let mut state = self.live()?;
        if state.nodes[self.id].spec.occluded {
            return Err(ActionError::NotInteractable(format!(
                "click on node #{} intercepted by overlay",
                self.id
            )));
        }
        state.nodes[self.id].direct_clicks += 1;
        state.fire_click(self.id);
        Ok(())
    }

    async fn synthetic_click(&self) -> Result<(), ActionError> {
        let mut state = self.live()?;
        state.nodes[self.id].synthetic_clicks += 1;
        state.fire_click(self.id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ActionError> {
        self.live()?.set_text(self.id, "");
        Ok(())
    }

    async fn set_text(&self, value: &str) -> Result<(), ActionError> {
        let mut state = self.live()?;
        let current = state.nodes[self.id].spec.text.clone();
        state.set_text(self.id, format!("{}{}", current, value));
        Ok(())
    }

    async fn remove_attribute(&self, name: &str) -> Result<(), ActionError> {
        self.live()?.nodes[self.id].spec.attributes.remove(name);
        Ok(())
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, ActionError> {
        let ids = self.live()?.query(self.id, query);
        Ok(ids
            .into_iter()
            .map(|id| {
                Arc::new(FakeElement {
                    state: self.state.clone(),
                    id,
                }) as Element
            })
            .collect())
    }
}
