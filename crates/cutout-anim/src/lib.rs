//! # Cutout Anim
//!
//! Keyframe playback for 2D cut-out sprite characters.
//!
//! A character is a set of rigid parts cut from one sprite sheet. Timelines
//! key every part's transform, opacity, tint and corner distortion; a
//! [`Player`] walks a timeline and writes an interpolated [`Pose`] each
//! tick. This crate provides:
//! - Parts, keyframes and timelines
//! - An animation library loaded from text assets (single or combined sheets)
//! - Playback cursors with looping, one-shot and reverse playback
//! - Per-player mixing of a second animation onto selected parts
//! - Animated bounding boxes with hit tests
//! - Draw lists with blend-mode boundaries for an external renderer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod boxes;
pub mod cursor;
pub mod draw;
pub mod keyframe;
pub mod library;
pub mod loader;
pub mod mix;
pub mod part;
pub mod playback;
pub mod pose;
pub mod timeline;

#[cfg(test)]
mod test_support;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::boxes::*;
    pub use crate::cursor::*;
    pub use crate::draw::*;
    pub use crate::keyframe::*;
    pub use crate::library::*;
    pub use crate::loader::*;
    pub use crate::mix::*;
    pub use crate::part::*;
    pub use crate::playback::*;
    pub use crate::pose::*;
    pub use crate::timeline::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    const BLINK: &str = "\
SPRITESHEET_FILENAME,eye.png
TOTAL_NUM_PARTS,1
ROOT_INDEX,0
TOTAL_ANIMATIONS,1
PART_INDEX,0
PART_NAME,lid
PART_RECTANGLE,0,0,4,2
ANIMATION_NAME,blink
ANIMATION_NUMBER,0
ANIMATION_KEY_COUNT,2
LOOPING
KEY,0
TIME,0
PART,0
K_ALPHA,1
KEY,1
TIME,100
PART,0
K_ALPHA,0
";

    #[test]
    fn test_load_and_play() {
        let library = load_str(BLINK, Vec2::ONE).expect("asset loads");
        let mut player = Player::new(&library, "", Vec2::new(10.0, 10.0));
        player.set_time_step(TimeStep::Fixed(50.0));
        assert!(player.set_animation_by_name(&library, "blink", false, false));

        assert_eq!(player.tick(&library, 0.0), None);
        let lid = player.pose().entry(0).expect("lid is posed");
        assert!((lid.alpha - 0.5).abs() < 1e-5);

        let items: Vec<DrawItem> = player.draw_items(&library, Vec4::ONE, false).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].corners[0], Vec2::new(10.0, 10.0));
    }
}
