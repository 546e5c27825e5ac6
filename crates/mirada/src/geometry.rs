//! Physical-pixel points and rectangles.
//!
//! Every coordinate in this crate is a physical device pixel. Logical-pixel
//! layout constants only exist inside [`crate::mapper`], which multiplies
//! them by the resolved [`crate::DisplayScale`] before they reach this
//! module's types.

use serde::{Deserialize, Serialize};

/// An absolute screen position in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position from the left screen edge
    pub x: i32,
    /// Vertical position from the top screen edge
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An absolute screen rectangle in physical pixels
///
/// Stored as edges (left, top, right, bottom) to match the convention of
/// window-management services; `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its four edges
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size
    #[must_use]
    pub const fn from_origin_size(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left + width as i32,
            bottom: top + height as i32,
        }
    }

    /// Width in pixels (zero if degenerate)
    #[must_use]
    pub const fn width(&self) -> u32 {
        let w = self.right - self.left;
        if w > 0 {
            w as u32
        } else {
            0
        }
    }

    /// Height in pixels (zero if degenerate)
    #[must_use]
    pub const fn height(&self) -> u32 {
        let h = self.bottom - self.top;
        if h > 0 {
            h as u32
        } else {
            0
        }
    }

    /// Center point of the rectangle
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    /// Whether a point lies inside the rectangle
    #[must_use]
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}) {}x{}",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}
