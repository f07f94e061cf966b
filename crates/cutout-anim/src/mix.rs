//! Two-timeline mixing.
//!
//! A player can overlay a second, independently clocked timeline onto a
//! subset of its parts (legs walking while the torso attacks). Which parts
//! the secondary timeline owns is recorded in a [`MixMask`] held by the
//! player, so players sharing one library never see each other's masks.

use cutout_common::AnimationId;
use tracing::debug;

use crate::cursor::{Cursor, CursorEvent, Direction};
use crate::library::AnimationLibrary;
use crate::timeline::Timeline;

/// Per-player set of parts driven by the secondary timeline, indexed by
/// global part index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixMask {
    flags: Vec<bool>,
}

impl MixMask {
    /// Creates an empty mask covering `part_count` parts.
    #[must_use]
    pub fn new(part_count: usize) -> Self {
        Self {
            flags: vec![false; part_count],
        }
    }

    /// Creates a mask covering `part_count` parts with `indices` set.
    /// Indices outside the table are ignored.
    #[must_use]
    pub fn from_indices(part_count: usize, indices: &[usize]) -> Self {
        let mut mask = Self::new(part_count);
        mask.assign(indices);
        mask
    }

    /// Creates a mask from part names looked up in the part range of
    /// animation `id`. Names with no matching part are skipped.
    #[must_use]
    pub fn from_part_names(library: &AnimationLibrary, id: AnimationId, names: &[&str]) -> Self {
        let range = library.timeline(id).part_range();
        let mut mask = Self::new(library.parts().len());
        for name in names {
            match library.find_part(range.clone(), name) {
                Some(index) => mask.set(index, true),
                None => debug!(part = name, animation = %id, "Mix part not found"),
            }
        }
        mask
    }

    /// Clears the mask and sets `indices`, reusing storage.
    pub fn assign(&mut self, indices: &[usize]) {
        self.clear();
        for &index in indices {
            self.set(index, true);
        }
    }

    /// Sets or clears one part. Out-of-range indices are ignored.
    pub fn set(&mut self, part: usize, mixed: bool) {
        if let Some(flag) = self.flags.get_mut(part) {
            *flag = mixed;
        }
    }

    /// Extends the mask with unset flags until it covers `part_count`
    /// parts. Never shrinks.
    pub fn grow(&mut self, part_count: usize) {
        if part_count > self.flags.len() {
            self.flags.resize(part_count, false);
        }
    }

    /// Clears every flag.
    pub fn clear(&mut self) {
        self.flags.fill(false);
    }

    /// True if the secondary timeline drives `part`.
    #[must_use]
    pub fn contains(&self, part: usize) -> bool {
        self.flags.get(part).copied().unwrap_or(false)
    }

    /// Set part indices, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &flag)| flag.then_some(i))
    }

    /// True if no part is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.flags.iter().any(|&flag| flag)
    }

    /// Number of parts the mask covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }
}

/// How [`Player::mix_animation`](crate::playback::Player::mix_animation)
/// chooses mixed parts.
#[derive(Debug, Clone, Copy)]
pub enum MixParts<'a> {
    /// Rebuild the mask from these global part indices
    Indices(&'a [usize]),
    /// Keep the mask already assigned to the player
    Keep,
}

/// Secondary playback track. Always loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixTrack {
    /// Secondary timeline
    pub animation: AnimationId,
    /// Secondary cursor
    pub cursor: Cursor,
    /// Speed multiplier, independent of the primary play speed
    pub speed: f32,
    last_direction: Direction,
    looped: bool,
}

impl MixTrack {
    /// Starts a track at the beginning (or end, when `backward`) of `timeline`.
    #[must_use]
    pub fn new(animation: AnimationId, timeline: &Timeline, speed: f32, backward: bool) -> Self {
        let cursor = Cursor::start(timeline, backward);
        Self {
            animation,
            cursor,
            speed,
            last_direction: cursor.direction,
            looped: false,
        }
    }

    /// Jumps to the last two keys and plays the secondary track in reverse.
    pub fn reverse(&mut self, timeline: &Timeline) {
        self.cursor = Cursor::at_end(timeline);
        self.looped = false;
    }

    /// Advances the secondary cursor, wrapping at either end.
    pub fn advance(&mut self, timeline: &Timeline, step: f32) {
        if self.cursor.advance_looping(timeline, step) == Some(CursorEvent::Looped) {
            self.looped = true;
        }
        self.last_direction = self.cursor.direction;
    }

    /// True once the secondary track has wrapped at least once since it was
    /// started or reversed, unless its direction just changed.
    #[must_use]
    pub fn has_looped(&self) -> bool {
        self.last_direction == self.cursor.direction && self.looped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{character, single_part_timeline};

    #[test]
    fn test_mask_from_indices_ignores_out_of_range() {
        let mask = MixMask::from_indices(4, &[1, 3, 9]);
        assert!(mask.contains(1));
        assert!(mask.contains(3));
        assert!(!mask.contains(9));
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_mask_assign_replaces() {
        let mut mask = MixMask::from_indices(4, &[0, 1]);
        mask.assign(&[2]);
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![2]);
        mask.clear();
        assert!(mask.is_empty());
        assert_eq!(mask.len(), 4);
    }

    #[test]
    fn test_mask_grow_keeps_flags() {
        let mut mask = MixMask::from_indices(2, &[1]);
        mask.grow(5);
        assert_eq!(mask.len(), 5);
        mask.set(4, true);
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![1, 4]);
        mask.grow(3);
        assert_eq!(mask.len(), 5);
    }

    #[test]
    fn test_mask_from_part_names() {
        let library = character();
        let walk = library.resolve("hero", "walk").expect("walk exists");
        let mask = MixMask::from_part_names(&library, walk, &["leg_l", "leg_r", "tail"]);
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn test_track_always_loops() {
        let timeline = single_part_timeline("walk", &[0.0, 500.0], false);
        let mut track = MixTrack::new(AnimationId::from_raw(0), &timeline, 1.0, false);
        for _ in 0..5 {
            track.advance(&timeline, 200.0);
        }
        assert!(!track.cursor.stopped);
        assert!(track.has_looped());
    }

    #[test]
    fn test_track_reverse_wraps_to_last_pair() {
        let timeline = single_part_timeline("walk", &[0.0, 300.0, 600.0], true);
        let mut track = MixTrack::new(AnimationId::from_raw(0), &timeline, 1.0, true);
        assert_eq!((track.cursor.key1, track.cursor.key2), (1, 2));
        track.advance(&timeline, 700.0);
        assert_eq!((track.cursor.key1, track.cursor.key2), (1, 2));
        assert!(track.has_looped());
    }
}
