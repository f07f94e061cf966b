//! Timelines: time-stamped keyframe sequences for a range of parts.

use std::ops::Range;

use cutout_common::{LoadError, LoadResult};
use glam::Vec2;

use crate::boxes::BoundingBox;
use crate::keyframe::{KeyGrid, Keyframe};

/// Substitute length for zero or negative intervals between keys.
pub const KEY_EPSILON: f32 = 0.0001;

/// An authored animation for one sheet section.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    name: String,
    looping: bool,
    times: Vec<f32>,
    keys: KeyGrid,
    speed: f32,
    offset: Vec2,
    root: usize,
    parts: Range<usize>,
    boxes: Vec<BoundingBox>,
    recorded_duration: f32,
}

impl Timeline {
    /// Creates a timeline driving the parts in `parts`.
    ///
    /// `keys` must have one row per part in the range and one column per
    /// time stamp; time stamps must not decrease.
    pub fn new(
        name: impl Into<String>,
        times: Vec<f32>,
        keys: KeyGrid,
        parts: Range<usize>,
    ) -> LoadResult<Self> {
        let name = name.into();
        if times.is_empty() {
            return Err(LoadError::EmptyTimeline { animation: name });
        }
        if times.len() != keys.keys() {
            return Err(LoadError::KeyCountMismatch {
                animation: name,
                times: times.len(),
                keys: keys.keys(),
            });
        }
        if keys.rows() != parts.len() {
            return Err(LoadError::PartRowMismatch {
                animation: name,
                rows: keys.rows(),
                parts: parts.len(),
            });
        }
        if let Some(key) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(LoadError::NonMonotonicTimes {
                animation: name,
                key: key + 1,
            });
        }

        let recorded_duration = times[times.len() - 1];
        let root = parts.start;
        Ok(Self {
            name,
            looping: false,
            times,
            keys,
            speed: 1.0,
            offset: Vec2::ZERO,
            root,
            parts,
            boxes: Vec::new(),
            recorded_duration,
        })
    }

    /// Sets the loop flag.
    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Sets the root part index.
    #[must_use]
    pub fn with_root(mut self, root: usize) -> Self {
        self.root = root;
        self
    }

    /// Attaches bounding boxes.
    #[must_use]
    pub fn with_boxes(mut self, boxes: Vec<BoundingBox>) -> Self {
        self.boxes = boxes;
        self
    }

    /// Animation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if playback wraps at the end.
    #[must_use]
    pub const fn looping(&self) -> bool {
        self.looping
    }

    /// Number of keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.times.len()
    }

    /// Index of the last key.
    #[must_use]
    pub fn last_key(&self) -> usize {
        self.times.len() - 1
    }

    /// Time stamp of `key`.
    #[must_use]
    pub fn time(&self, key: usize) -> f32 {
        self.times[key]
    }

    /// All time stamps.
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    /// Keyframe grid.
    #[must_use]
    pub const fn keys(&self) -> &KeyGrid {
        &self.keys
    }

    /// Keyframe of part `row` (relative to the part range) at `key`.
    #[must_use]
    pub fn keyframe(&self, row: usize, key: usize) -> &Keyframe {
        self.keys.get(row, key)
    }

    /// Playback speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Positional offset added to every part.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Root part index.
    #[must_use]
    pub const fn root(&self) -> usize {
        self.root
    }

    /// Parts driven by this timeline.
    #[must_use]
    pub fn part_range(&self) -> Range<usize> {
        self.parts.clone()
    }

    /// Number of parts driven by this timeline.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Animatable bounding boxes.
    #[must_use]
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Time stamp of the last key as authored.
    #[must_use]
    pub const fn recorded_duration(&self) -> f32 {
        self.recorded_duration
    }

    /// Author-time speed tweak.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Author-time offset tweak.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Moves the last key's time by `delta` (e.g. -300 trims the tail of a
    /// one-shot animation). Clamped so times stay non-decreasing. Box timing
    /// keeps using the recorded duration.
    pub fn adjust_last_key_time(&mut self, delta: f32) {
        let last = self.last_key();
        let floor = if last > 0 { self.times[last - 1] } else { f32::MIN };
        self.times[last] = (self.times[last] + delta).max(floor);
    }
}
