#![forbid(unsafe_code)]

//! Tooltip placement relative to a step target.
//!
//! [`TooltipPlacer::place`] is a pure function of the anchor, the requested
//! side, the tooltip size, and the viewport size.
//!
//! # Invariants
//!
//! 1. Identical inputs always produce identical output.
//! 2. When the tooltip fits inside the viewport minus `padding` on each side,
//!    the result keeps it at least `padding` away from every viewport edge.
//! 3. When it does not fit, the leading edge wins: `left >= padding` and
//!    `top >= padding` still hold, and the tooltip overflows right/bottom.
//!
//! # Example
//!
//! ```
//! use wayfinder_core::{Rect, Size};
//! use wayfinder_tour::model::StepPosition;
//! use wayfinder_tour::placement::{TooltipPlacer, TooltipPosition};
//!
//! let placer = TooltipPlacer::new(16, 8);
//! let pos = placer.place(
//!     Rect::new(400, 300, 100, 40),
//!     StepPosition::Bottom,
//!     Size::new(200, 100),
//!     Size::new(1280, 800),
//! );
//! assert_eq!(pos, TooltipPosition { top: 364, left: 350 });
//! ```

use wayfinder_core::{Rect, Size};

use crate::model::StepPosition;

/// Top-left corner of a placed tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TooltipPosition {
    pub top: i32,
    pub left: i32,
}

impl TooltipPosition {
    /// The tooltip's full bounds at this position.
    #[must_use]
    pub const fn rect(self, size: Size) -> Rect {
        Rect::new(self.left, self.top, size.width, size.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipPlacer {
    /// Minimum distance from every viewport edge, and the gap to the anchor.
    pub padding: i32,
    /// Extra gap reserved for the pointer arrow.
    pub arrow_size: i32,
}

impl Default for TooltipPlacer {
    fn default() -> Self {
        Self::new(16, 8)
    }
}

impl TooltipPlacer {
    #[must_use]
    pub const fn new(padding: i32, arrow_size: i32) -> Self {
        Self {
            padding,
            arrow_size,
        }
    }

    /// Distance between the anchor edge and the tooltip edge.
    #[must_use]
    pub const fn gap(&self) -> i32 {
        self.padding.saturating_add(self.arrow_size)
    }

    /// Compute where the tooltip goes.
    #[must_use]
    pub fn place(
        &self,
        anchor: Rect,
        side: StepPosition,
        tooltip: Size,
        viewport: Size,
    ) -> TooltipPosition {
        let gap = self.gap();
        let centered_left = anchor.center_x().saturating_sub(tooltip.width / 2);
        let centered_top = anchor.center_y().saturating_sub(tooltip.height / 2);

        let (top, left) = match side {
            StepPosition::Top => (
                anchor.y.saturating_sub(tooltip.height).saturating_sub(gap),
                centered_left,
            ),
            StepPosition::Bottom => (anchor.bottom().saturating_add(gap), centered_left),
            StepPosition::Left => (
                centered_top,
                anchor.x.saturating_sub(tooltip.width).saturating_sub(gap),
            ),
            StepPosition::Right => (centered_top, anchor.right().saturating_add(gap)),
            StepPosition::Center => (
                viewport.height.saturating_sub(tooltip.height) / 2,
                viewport.width.saturating_sub(tooltip.width) / 2,
            ),
        };

        TooltipPosition {
            top: clamp_axis(top, tooltip.height, viewport.height, self.padding),
            left: clamp_axis(left, tooltip.width, viewport.width, self.padding),
        }
    }

    /// Whether a tooltip of `tooltip` size can satisfy the padding invariant.
    #[must_use]
    pub fn fits(&self, tooltip: Size, viewport: Size) -> bool {
        let double = self.padding.saturating_mul(2);
        tooltip.width.saturating_add(double) <= viewport.width
            && tooltip.height.saturating_add(double) <= viewport.height
    }
}

/// Cap the far edge first, then floor the near edge, so the leading edge
/// stays visible when the tooltip is larger than the viewport.
fn clamp_axis(pos: i32, size: i32, extent: i32, padding: i32) -> i32 {
    let max = extent.saturating_sub(padding).saturating_sub(size);
    pos.min(max).max(padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1000, 600);
    const TIP: Size = Size::new(200, 100);

    fn placer() -> TooltipPlacer {
        TooltipPlacer::new(10, 5)
    }

    #[test]
    fn top_sits_above_anchor_centered() {
        let anchor = Rect::new(400, 300, 100, 50);
        let pos = placer().place(anchor, StepPosition::Top, TIP, VIEWPORT);
        assert_eq!(pos.top, 300 - 100 - 15);
        assert_eq!(pos.left, 450 - 100);
    }

    #[test]
    fn bottom_mirrors_top() {
        let anchor = Rect::new(400, 100, 100, 50);
        let pos = placer().place(anchor, StepPosition::Bottom, TIP, VIEWPORT);
        assert_eq!(pos.top, 150 + 15);
        assert_eq!(pos.left, 350);
    }

    #[test]
    fn left_and_right_center_vertically() {
        let anchor = Rect::new(400, 250, 100, 100);
        let left = placer().place(anchor, StepPosition::Left, TIP, VIEWPORT);
        assert_eq!(left, TooltipPosition { top: 250, left: 400 - 200 - 15 });
        let right = placer().place(anchor, StepPosition::Right, TIP, VIEWPORT);
        assert_eq!(right, TooltipPosition { top: 250, left: 515 });
    }

    #[test]
    fn oversized_center_tooltip_pins_to_padding() {
        let placer = TooltipPlacer::new(16, 8);
        let huge = Size::new(i32::MAX, i32::MAX);
        let anchor = Rect::new(0, 0, 1, 1);
        let pos = placer.place(anchor, StepPosition::Center, huge, Size::new(800, 600));
        assert_eq!(pos, TooltipPosition { top: 16, left: 16 });
    }

    #[test]
    fn center_ignores_anchor() {
        let a = placer().place(Rect::new(0, 0, 1, 1), StepPosition::Center, TIP, VIEWPORT);
        let b = placer().place(Rect::new(900, 500, 50, 50), StepPosition::Center, TIP, VIEWPORT);
        assert_eq!(a, b);
        assert_eq!(a, TooltipPosition { top: 250, left: 400 });
    }

    #[test]
    fn clamps_at_viewport_edges() {
        let near_origin = Rect::new(0, 0, 20, 20);
        let pos = placer().place(near_origin, StepPosition::Top, TIP, VIEWPORT);
        assert_eq!(pos, TooltipPosition { top: 10, left: 10 });

        let far_corner = Rect::new(990, 590, 10, 10);
        let pos = placer().place(far_corner, StepPosition::Bottom, TIP, VIEWPORT);
        assert_eq!(pos, TooltipPosition { top: 490, left: 790 });
    }

    #[test]
    fn anchor_scrolled_off_screen_still_clamps() {
        let above = Rect::new(300, -400, 50, 50);
        let pos = placer().place(above, StepPosition::Bottom, TIP, VIEWPORT);
        assert_eq!(pos.top, 10);
    }

    #[test]
    fn oversized_tooltip_keeps_leading_edge() {
        let huge = Size::new(2000, 900);
        let pos = placer().place(Rect::new(100, 100, 10, 10), StepPosition::Right, huge, VIEWPORT);
        assert_eq!(pos, TooltipPosition { top: 10, left: 10 });
        assert!(!placer().fits(huge, VIEWPORT));
        assert!(placer().fits(TIP, VIEWPORT));
    }
}
