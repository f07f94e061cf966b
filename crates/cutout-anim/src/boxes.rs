//! Animatable bounding boxes.
//!
//! Boxes are keyed on their own sparse timeline, expressed on a normalized
//! 0-1000 frame scale rather than on the owning timeline's key indices:
//! - [`BoundingBox`] is the authored, immutable track (owned by a timeline)
//! - [`BoxTrack`] is a player's current rectangle per box, used for hit tests
//!
//! Rotation of the character is not applied to boxes.

use cutout_common::{BoxClass, Rect};
use glam::Vec2;

use crate::timeline::{Timeline, KEY_EPSILON};

/// Length of the normalized box frame scale.
pub const BOX_FRAME_SCALE: f32 = 1000.0;

/// One key of a bounding-box track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxKey {
    /// Normalized frame (0-1000)
    pub frame: i32,
    /// Authored link to the previous key
    pub prev_key: i32,
    /// Authored link to the next key
    pub next_key: i32,
    /// Rectangle relative to the character origin
    pub rect: Rect,
}

impl BoxKey {
    /// Creates a key at `frame`.
    #[must_use]
    pub const fn new(frame: i32, rect: Rect) -> Self {
        Self {
            frame,
            prev_key: 0,
            next_key: 0,
            rect,
        }
    }
}

/// A named, classified rectangle keyed over a timeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundingBox {
    /// Authored name
    pub name: String,
    /// What the box is for
    pub class: BoxClass,
    /// First normalized frame on which the box exists
    pub first_key: i32,
    /// Last normalized frame on which the box exists
    pub last_key: i32,
    /// Keys ordered by frame
    pub keys: Vec<BoxKey>,
}

impl BoundingBox {
    /// Creates a box active over `[first_key, last_key]`.
    #[must_use]
    pub fn new(name: impl Into<String>, class: BoxClass, first_key: i32, last_key: i32) -> Self {
        Self {
            name: name.into(),
            class,
            first_key,
            last_key,
            keys: Vec::new(),
        }
    }

    /// Appends a key.
    #[must_use]
    pub fn with_key(mut self, key: BoxKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Rectangle at normalized `frame`.
    ///
    /// Empty outside `[first_key, last_key]`, and empty when the frame lies
    /// at or after the last key (no following key to interpolate toward).
    #[must_use]
    pub fn sample(&self, frame: i32) -> Rect {
        if frame < self.first_key || frame > self.last_key || self.keys.is_empty() {
            return Rect::EMPTY;
        }

        let mut prev = 0;
        for (i, key) in self.keys.iter().enumerate() {
            if key.frame > frame {
                break;
            }
            prev = i;
        }
        let next = (prev + 1).min(self.keys.len() - 1);
        if prev == next {
            return Rect::EMPTY;
        }

        let from = &self.keys[prev];
        let to = &self.keys[next];
        let mut span = (to.frame - from.frame) as f32;
        if span <= 0.0 {
            span = KEY_EPSILON;
        }
        let t = ((frame - from.frame) as f32 / span).clamp(0.0, 1.0);
        from.rect.lerp(&to.rect, t)
    }
}

/// Current rectangle of one box on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxSlot {
    /// Class copied from the authored box
    pub class: BoxClass,
    /// Rectangle relative to the character origin
    pub rect: Rect,
}

/// Per-player current rectangles for the primary timeline's boxes.
#[derive(Debug, Clone, Default)]
pub struct BoxTrack {
    slots: Vec<BoxSlot>,
}

impl BoxTrack {
    /// Creates a track able to hold `capacity` boxes without reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Current slots.
    #[must_use]
    pub fn slots(&self) -> &[BoxSlot] {
        &self.slots
    }

    /// Loads the classes of `timeline`'s boxes with empty rectangles.
    pub fn reset(&mut self, timeline: &Timeline) {
        self.slots.clear();
        self.slots.extend(timeline.boxes().iter().map(|b| BoxSlot {
            class: b.class,
            rect: Rect::EMPTY,
        }));
    }

    /// Drops all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Recomputes every rectangle from the primary timer.
    pub fn update(&mut self, timeline: &Timeline, timer: f32, flip: bool) {
        let frame = normalized_frame(timeline, timer);
        for (slot, bbox) in self.slots.iter_mut().zip(timeline.boxes()) {
            let rect = bbox.sample(frame);
            slot.rect = if flip && !rect.is_empty() {
                rect.mirrored_x()
            } else {
                rect
            };
        }
    }

    /// True if any non-empty box of `class`, placed at `position`, overlaps
    /// `world_rect`.
    #[must_use]
    pub fn hit_test(&self, position: Vec2, world_rect: &Rect, class: BoxClass) -> bool {
        let (dx, dy) = (position.x as i32, position.y as i32);
        self.slots
            .iter()
            .filter(|slot| slot.class == class)
            .any(|slot| slot.rect.translated(dx, dy).overlaps(world_rect))
    }
}

/// Converts a primary timer to the 0-1000 box frame scale.
#[must_use]
pub fn normalized_frame(timeline: &Timeline, timer: f32) -> i32 {
    let duration = timeline.recorded_duration().max(KEY_EPSILON);
    (timer / duration * BOX_FRAME_SCALE) as i32
}
