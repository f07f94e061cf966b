//! # Cutout Common
//!
//! Common types, utilities, and shared abstractions for the Cutout sprite
//! animation player.
//!
//! This crate provides the small foundational types used across all Cutout
//! crates:
//! - ID types (AnimationId, BoxClass)
//! - Integer rectangles for sheet regions and collision boxes
//! - Asset loading errors
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod rect;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::rect::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_id_roundtrip() {
        let id = AnimationId::from_raw(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn test_box_class_defaults() {
        assert_eq!(BoxClass::BODY.raw(), 0);
        assert_eq!(BoxClass::ATTACK.raw(), 1);
        assert_ne!(BoxClass::BODY.debug_color(), BoxClass::ATTACK.debug_color());
    }

    #[test]
    fn test_empty_rect_never_overlaps() {
        let query = Rect::new(-100, -100, 200, 200);
        assert!(!Rect::EMPTY.overlaps(&query));
        assert!(!query.overlaps(&Rect::EMPTY));
    }
}
