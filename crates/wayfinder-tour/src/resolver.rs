#![forbid(unsafe_code)]

//! Resolution of symbolic step targets to live UI nodes.
//!
//! # Invariants
//!
//! 1. A cache entry is only returned after its node has been re-checked as
//!    attached; detached entries are evicted and resolved from scratch.
//! 2. Geometry is re-read from the live node on every resolution, so callers
//!    always see post-reflow/post-scroll bounds.
//! 3. Failure is a `None` result, never a panic or error. What to do about a
//!    missing target is the caller's decision.
//! 4. [`clear_highlights`](ElementResolver::clear_highlights) is idempotent.

use ahash::AHashMap;
use wayfinder_core::Rect;

use crate::ui::{LiveUi, Marker, NodeHandle};

/// A target resolved to a live node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    /// The symbolic target this entry was resolved from.
    pub target: String,
    pub node: NodeHandle,
    /// Last-known bounds.
    pub geometry: Rect,
}

/// Cache effectiveness counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub hits: u64,
    pub misses: u64,
    /// Cached entries dropped because their node was detached.
    pub evictions: u64,
}

#[derive(Debug, Default)]
pub struct ElementResolver {
    cache: AHashMap<String, ResolvedElement>,
    highlighted: Vec<NodeHandle>,
    stats: ResolverStats,
}

impl ElementResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `target` to a live node.
    ///
    /// Tries the cached handle first, then the host's symbolic lookup, then
    /// the raw-selector fallback.
    pub fn resolve(&mut self, ui: &dyn LiveUi, target: &str) -> Option<ResolvedElement> {
        if target.trim().is_empty() {
            return None;
        }

        if let Some(node) = self.cache.get(target).map(|entry| entry.node) {
            let geometry = ui
                .is_attached(node)
                .then(|| ui.bounding_rect(node))
                .flatten();
            match geometry {
                Some(rect) => {
                    self.stats.hits += 1;
                    let entry = self.cache.get_mut(target)?;
                    entry.geometry = rect;
                    return Some(entry.clone());
                }
                None => {
                    tracing::trace!(target_id = target, %node, "evicting detached target");
                    self.cache.remove(target);
                    self.stats.evictions += 1;
                }
            }
        }

        self.stats.misses += 1;
        let node = ui.find(target).or_else(|| ui.query_selector(target))?;
        let geometry = ui.bounding_rect(node)?;
        let resolved = ResolvedElement {
            target: target.to_owned(),
            node,
            geometry,
        };
        self.cache.insert(target.to_owned(), resolved.clone());
        Some(resolved)
    }

    /// Up-to-date bounds for `target`, re-read from the live node.
    pub fn current_geometry(&mut self, ui: &dyn LiveUi, target: &str) -> Option<Rect> {
        self.resolve(ui, target).map(|resolved| resolved.geometry)
    }

    /// Mark `target` as the highlighted element. Returns `false` if it
    /// could not be resolved.
    pub fn highlight(&mut self, ui: &mut dyn LiveUi, target: &str) -> bool {
        let Some(resolved) = self.resolve(&*ui, target) else {
            return false;
        };
        ui.set_marker(resolved.node, Marker::Highlight, true);
        if !self.highlighted.contains(&resolved.node) {
            self.highlighted.push(resolved.node);
        }
        true
    }

    /// Remove every highlight this resolver applied.
    pub fn clear_highlights(&mut self, ui: &mut dyn LiveUi) {
        for node in self.highlighted.drain(..) {
            if ui.is_attached(node) {
                ui.set_marker(node, Marker::Highlight, false);
            }
        }
    }

    /// Nodes currently carrying a highlight from this resolver.
    #[must_use]
    pub fn highlighted(&self) -> &[NodeHandle] {
        &self.highlighted
    }

    /// Cached entry for `target`, without revalidation.
    #[must_use]
    pub fn cached(&self, target: &str) -> Option<&ResolvedElement> {
        self.cache.get(target)
    }

    /// Forget every resolved handle.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        self.stats
    }
}
