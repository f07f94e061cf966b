//! Rigid sprite parts.
//!
//! A part is one rectangular region of the sprite sheet that animates as a
//! unit. Its four model-space corners are stored relative to the pivot so
//! scaling and rotation happen around the pivot without extra translation.

use cutout_common::Rect;
use glam::Vec2;

/// One independently transformable image region of a character.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Authored part name (used to pick mix parts by name)
    pub name: String,
    /// Index in the owning library's part table
    pub index: usize,
    /// Source rectangle on the sprite sheet
    pub source: Rect,
    /// Rotation/scale origin in source-local coordinates
    pub pivot: Vec2,
    /// Model-space corners m1..m4 relative to the pivot
    pub corners: [Vec2; 4],
    /// Parent part, if authored (carried for custom chaining, not used by playback)
    pub parent: Option<usize>,
    /// Drawn with additive blending
    pub additive: bool,
}

impl Part {
    /// Creates a part from its source rectangle with corners spanning the
    /// rectangle around a pivot at its top-left corner.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Rect) -> Self {
        let w = source.width as f32;
        let h = source.height as f32;
        Self {
            name: name.into(),
            index: 0,
            source,
            pivot: Vec2::ZERO,
            corners: [
                Vec2::new(0.0, 0.0),
                Vec2::new(w, 0.0),
                Vec2::new(0.0, h),
                Vec2::new(w, h),
            ],
            parent: None,
            additive: false,
        }
    }

    /// Sets the model-space corners; the pivot becomes `-m1`.
    #[must_use]
    pub fn with_corners(mut self, corners: [Vec2; 4]) -> Self {
        self.corners = corners;
        self.pivot = -corners[0];
        self
    }

    /// Marks the part for additive blending.
    #[must_use]
    pub const fn with_additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    /// Sets the parent part.
    #[must_use]
    pub const fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl Default for Part {
    fn default() -> Self {
        Self::new(String::new(), Rect::EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_follow_source_size() {
        let part = Part::new("arm", Rect::new(4, 8, 10, 20));
        assert_eq!(part.corners[3], Vec2::new(10.0, 20.0));
        assert_eq!(part.pivot, Vec2::ZERO);
    }

    #[test]
    fn test_pivot_is_negated_first_corner() {
        let part = Part::new("head", Rect::new(0, 0, 8, 8)).with_corners([
            Vec2::new(-4.0, -6.0),
            Vec2::new(4.0, -6.0),
            Vec2::new(-4.0, 2.0),
            Vec2::new(4.0, 2.0),
        ]);
        assert_eq!(part.pivot, Vec2::new(4.0, 6.0));
    }
}
