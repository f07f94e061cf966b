//! Integer rectangles for sheet regions and collision boxes.

use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle (top-left origin, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// The empty rectangle.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// True if the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns the rectangle moved by `(dx, dy)`.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Mirrors the rectangle across the vertical axis through x = 0.
    #[must_use]
    pub const fn mirrored_x(self) -> Self {
        Self::new(-self.x - self.width, self.y, self.width, self.height)
    }

    /// Open-interval overlap test: touching edges do not overlap and an
    /// empty rectangle overlaps nothing.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x < self.right()
            && other.right() > self.x
            && other.y < self.bottom()
            && other.bottom() > self.y
    }

    /// Linear blend of position and size, truncated toward zero.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let blend = |a: i32, b: i32| (a as f32 * (1.0 - t) + b as f32 * t) as i32;
        Self::new(
            blend(self.x, other.x),
            blend(self.y, other.y),
            blend(self.width, other.width),
            blend(self.height, other.height),
        )
    }
}
