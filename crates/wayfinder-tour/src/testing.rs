#![forbid(unsafe_code)]

//! In-memory doubles for the host collaborators.
//!
//! Available under `cfg(test)` and the `test-helpers` feature. The doubles
//! share their state through `Rc<RefCell<..>>` handles so a test can keep a
//! clone, move the original into the engine, and still inspect or mutate the
//! "live" UI afterwards.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use wayfinder_core::{Rect, Size};

use crate::error::HostError;
use crate::pacer::Pacer;
use crate::ui::{LiveUi, Marker, Navigator, NodeHandle, ScrollAlign};

#[derive(Debug, Clone)]
struct Node {
    rect: Rect,
    attached: bool,
    selector: Option<String>,
}

/// Everything the fake UI has been asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCall {
    Marker {
        node: NodeHandle,
        marker: Marker,
        on: bool,
    },
    Scroll(NodeHandle),
    Click(NodeHandle),
}

#[derive(Debug, Default)]
struct UiState {
    next_id: u64,
    by_target: BTreeMap<String, NodeHandle>,
    nodes: BTreeMap<NodeHandle, Node>,
    viewport: Size,
    calls: Vec<UiCall>,
    failing_clicks: Vec<NodeHandle>,
    lookups: usize,
}

/// In-memory [`LiveUi`].
#[derive(Debug, Clone)]
pub struct MemoryUi {
    state: Rc<RefCell<UiState>>,
}

impl Default for MemoryUi {
    fn default() -> Self {
        Self::new(Size::new(1280, 800))
    }
}

impl MemoryUi {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(UiState {
                viewport,
                ..UiState::default()
            })),
        }
    }

    /// Add a node reachable by symbolic `target`.
    pub fn insert(&self, target: &str, rect: Rect) -> NodeHandle {
        self.insert_node(target, None, rect)
    }

    /// Add a node reachable only by raw `selector`.
    pub fn insert_selector(&self, selector: &str, rect: Rect) -> NodeHandle {
        self.insert_node(selector, Some(selector.to_owned()), rect)
    }

    fn insert_node(&self, key: &str, selector: Option<String>, rect: Rect) -> NodeHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = NodeHandle(state.next_id);
        state.nodes.insert(
            handle,
            Node {
                rect,
                attached: true,
                selector: selector.clone(),
            },
        );
        if selector.is_none() {
            state.by_target.insert(key.to_owned(), handle);
        }
        handle
    }

    /// Detach the node registered for `target` (or selector).
    pub fn detach(&self, target: &str) {
        let mut state = self.state.borrow_mut();
        let handle = state.by_target.remove(target).or_else(|| {
            state
                .nodes
                .iter()
                .find(|(_, node)| node.attached && node.selector.as_deref() == Some(target))
                .map(|(handle, _)| *handle)
        });
        if let Some(node) = handle.and_then(|h| state.nodes.get_mut(&h)) {
            node.attached = false;
        }
    }

    /// Move a node.
    pub fn move_node(&self, node: NodeHandle, rect: Rect) {
        if let Some(entry) = self.state.borrow_mut().nodes.get_mut(&node) {
            entry.rect = rect;
        }
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.state.borrow_mut().viewport = viewport;
    }

    /// Make clicks on `node` fail.
    pub fn fail_clicks_on(&self, node: NodeHandle) {
        self.state.borrow_mut().failing_clicks.push(node);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<UiCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of primary/fallback lookups performed so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.state.borrow().lookups
    }

    /// Nodes currently carrying `marker`.
    #[must_use]
    pub fn marked(&self, marker: Marker) -> Vec<NodeHandle> {
        let state = self.state.borrow();
        let mut on: BTreeMap<NodeHandle, bool> = BTreeMap::new();
        for call in &state.calls {
            match call {
                UiCall::Marker {
                    node,
                    marker: m,
                    on: flag,
                } if *m == marker => {
                    on.insert(*node, *flag);
                }
                _ => {}
            }
        }
        on.into_iter()
            .filter_map(|(node, flag)| flag.then_some(node))
            .collect()
    }
}

impl LiveUi for MemoryUi {
    fn find(&self, target: &str) -> Option<NodeHandle> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        let handle = state.by_target.get(target).copied()?;
        state
            .nodes
            .get(&handle)
            .filter(|node| node.attached)
            .map(|_| handle)
    }

    fn query_selector(&self, selector: &str) -> Option<NodeHandle> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        state
            .nodes
            .iter()
            .find(|(_, node)| node.attached && node.selector.as_deref() == Some(selector))
            .map(|(handle, _)| *handle)
    }

    fn is_attached(&self, node: NodeHandle) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.attached)
    }

    fn bounding_rect(&self, node: NodeHandle) -> Option<Rect> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .filter(|n| n.attached)
            .map(|n| n.rect)
    }

    fn set_marker(&mut self, node: NodeHandle, marker: Marker, on: bool) {
        self.state
            .borrow_mut()
            .calls
            .push(UiCall::Marker { node, marker, on });
    }

    fn scroll_into_view(&mut self, node: NodeHandle, _align: ScrollAlign) {
        self.state.borrow_mut().calls.push(UiCall::Scroll(node));
    }

    fn click(&mut self, node: NodeHandle) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(UiCall::Click(node));
        if state.failing_clicks.contains(&node) {
            return Err(HostError::new(format!("click rejected by {node}")));
        }
        Ok(())
    }

    fn viewport(&self) -> Size {
        self.state.borrow().viewport
    }
}

/// Navigation calls observed by [`RecordingNavigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCall {
    Navigate(String),
    Dim(bool),
}

#[derive(Debug, Default)]
struct NavState {
    calls: Vec<NavCall>,
    current: Option<String>,
    failing: Vec<String>,
}

/// [`Navigator`] that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    state: Rc<RefCell<NavState>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `view` from [`Navigator::current_view`].
    #[must_use]
    pub fn with_current_view(self, view: &str) -> Self {
        self.state.borrow_mut().current = Some(view.to_owned());
        self
    }

    /// Make navigation to `view` fail.
    pub fn fail_on(&self, view: &str) {
        self.state.borrow_mut().failing.push(view.to_owned());
    }

    #[must_use]
    pub fn calls(&self) -> Vec<NavCall> {
        self.state.borrow().calls.clone()
    }

    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NavCall::Navigate(view) => Some(view),
                NavCall::Dim(_) => None,
            })
            .collect()
    }

    /// Whether the surface is currently dimmed.
    #[must_use]
    pub fn is_dimmed(&self) -> bool {
        self.calls()
            .iter()
            .rev()
            .find_map(|call| match call {
                NavCall::Dim(on) => Some(*on),
                NavCall::Navigate(_) => None,
            })
            .unwrap_or(false)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&mut self, view: &str) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(NavCall::Navigate(view.to_owned()));
        if state.failing.iter().any(|v| v == view) {
            return Err(HostError::new(format!("no route to {view}")));
        }
        state.current = Some(view.to_owned());
        Ok(())
    }

    fn set_dimmed(&mut self, dimmed: bool) {
        self.state.borrow_mut().calls.push(NavCall::Dim(dimmed));
    }

    fn current_view(&self) -> Option<String> {
        self.state.borrow().current.clone()
    }
}

/// [`Pacer`] that records requested pauses without sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingPacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.pauses.borrow().iter().sum()
    }

    pub fn clear(&self) {
        self.pauses.borrow_mut().clear();
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}
