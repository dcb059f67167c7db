#![forbid(unsafe_code)]

//! Host-facing collaborator traits.
//!
//! The engine never touches a concrete UI toolkit. Everything it needs from
//! the host is expressed here:
//!
//! - [`LiveUi`]: node lookup, geometry, visual markers, scrolling, clicks.
//! - [`Navigator`]: view routing plus the global dim/undim transition cue.
//!
//! Implement these once per toolkit (DOM bridge, native widget tree, terminal
//! grid) and hand them to the [`TourEngine`](crate::engine::TourEngine).

use wayfinder_core::{Rect, Size};

use crate::error::HostError;

/// Opaque handle to a live UI node, issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

impl core::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// Visual marker applied to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The step target currently being explained.
    Highlight,
    /// Brief "pressed" affordance shown around a synthetic click.
    Pressed,
}

/// How a node should be aligned when scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    #[default]
    Center,
    Nearest,
}

/// The live UI tree the tour runs against.
///
/// Nodes may be added or removed by the host between any two calls; a
/// handle that was valid earlier can become detached at any time.
pub trait LiveUi {
    /// Look up a node by symbolic target (the primary strategy).
    fn find(&self, target: &str) -> Option<NodeHandle>;

    /// Look up a node by raw selector (the fallback strategy).
    fn query_selector(&self, selector: &str) -> Option<NodeHandle>;

    /// Whether the node is still part of the live tree.
    fn is_attached(&self, node: NodeHandle) -> bool;

    /// Current bounding rectangle, in the same space as [`viewport`](Self::viewport).
    fn bounding_rect(&self, node: NodeHandle) -> Option<Rect>;

    /// Apply or remove a visual marker.
    fn set_marker(&mut self, node: NodeHandle, marker: Marker, on: bool);

    fn scroll_into_view(&mut self, node: NodeHandle, align: ScrollAlign);

    /// Synthesize a click.
    fn click(&mut self, node: NodeHandle) -> Result<(), HostError>;

    /// Size of the visible area.
    fn viewport(&self) -> Size;
}

/// View routing and the global transition cue.
pub trait Navigator {
    /// Switch the host to the view identified by `view`.
    fn navigate_to(&mut self, view: &str) -> Result<(), HostError>;

    /// Dim or restore the whole surface.
    fn set_dimmed(&mut self, dimmed: bool);

    /// The view currently showing, if the host tracks it.
    fn current_view(&self) -> Option<String> {
        None
    }
}
