#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle in host coordinates (origin at top-left, y grows downward).
///
/// Coordinates are signed: an anchor scrolled above the viewport has a
/// negative `y`. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in host units.
    pub width: i32,
    /// Height in host units.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle. Negative sizes are clamped to zero.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Horizontal center, rounded toward the left edge.
    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.x.saturating_add(self.width / 2)
    }

    /// Vertical center, rounded toward the top edge.
    #[inline]
    pub const fn center_y(&self) -> i32 {
        self.y.saturating_add(self.height / 2)
    }
}

/// A width/height pair, used for tooltips and viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size. Negative values are clamped to zero.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Size};

    #[test]
    fn rect_negative_size_clamps_to_zero() {
        let rect = Rect::new(-5, -5, -1, 10);
        assert_eq!(rect.width, 0);
        assert_eq!(rect.right(), -5);
        assert_eq!(rect.bottom(), 5);
    }

    #[test]
    fn rect_centers_round_toward_origin() {
        let rect = Rect::new(10, 20, 5, 7);
        assert_eq!(rect.center_x(), 12);
        assert_eq!(rect.center_y(), 23);
    }

    #[test]
    fn size_negative_clamps_to_zero() {
        assert_eq!(Size::new(-3, 4), Size::new(0, 4));
    }

    #[test]
    fn far_edges_saturate() {
        let rect = Rect::new(i32::MAX - 1, 0, 10, 10);
        assert_eq!(rect.right(), i32::MAX);
    }
}
