//! Animation library: the shared, read-only catalog of parts and timelines.
//!
//! Timelines are registered under a `(section, name)` pair, where the
//! section is the file stem of the sheet the animation
//! was authored for. One library can hold several characters packed into a
//! combined sheet; each keeps its own section.

use std::collections::HashMap;
use std::ops::Range;

use cutout_common::{AnimationId, LoadError, LoadResult};
use tracing::debug;

use crate::part::Part;
use crate::timeline::Timeline;

/// Parts and timelines for one or more characters sharing a sprite sheet.
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    sheet_path: String,
    parts: Vec<Part>,
    timelines: Vec<Timeline>,
    lookup: HashMap<(String, String), AnimationId>,
    max_parts: usize,
    max_boxes: usize,
}

impl AnimationLibrary {
    /// Creates an empty library for the sheet at `sheet_path`.
    #[must_use]
    pub fn new(sheet_path: impl Into<String>) -> Self {
        Self {
            sheet_path: sheet_path.into(),
            ..Self::default()
        }
    }

    /// Path of the sprite sheet image, as authored.
    #[must_use]
    pub fn sheet_path(&self) -> &str {
        &self.sheet_path
    }

    /// Appends a part and returns its index.
    pub fn add_part(&mut self, mut part: Part) -> usize {
        let index = self.parts.len();
        part.index = index;
        self.parts.push(part);
        index
    }

    /// Registers a timeline under `section`.
    ///
    /// The timeline's part range and every keyframe's part must exist in the
    /// part table, and `(section, name)` must be unused.
    pub fn add_timeline(&mut self, section: &str, timeline: Timeline) -> LoadResult<AnimationId> {
        let range = timeline.part_range();
        if range.end > self.parts.len() {
            return Err(LoadError::PartRangeOutOfBounds {
                animation: timeline.name().to_string(),
                end: range.end,
                parts: self.parts.len(),
            });
        }
        if let Some(key) = timeline.keys().iter().find(|k| k.part >= self.parts.len()) {
            return Err(LoadError::UnknownPart {
                animation: timeline.name().to_string(),
                part: key.part,
            });
        }

        let lookup_key = (section.to_string(), timeline.name().to_string());
        if self.lookup.contains_key(&lookup_key) {
            return Err(LoadError::DuplicateAnimation {
                section: lookup_key.0,
                name: lookup_key.1,
            });
        }

        let id = AnimationId::from_raw(self.timelines.len() as u32);
        self.max_parts = self.max_parts.max(timeline.part_count());
        self.max_boxes = self.max_boxes.max(timeline.boxes().len());
        self.lookup.insert(lookup_key, id);
        self.timelines.push(timeline);
        Ok(id)
    }

    /// Finds the timeline `name` authored for `section`.
    ///
    /// A miss is not an error: game logic probes names speculatively. Misses
    /// are logged at debug level.
    #[must_use]
    pub fn resolve(&self, section: &str, name: &str) -> Option<AnimationId> {
        let found = self.resolve_quiet(section, name);
        if found.is_none() {
            debug!(section, name, "Animation not found");
        }
        found
    }

    /// Same as [`resolve`](Self::resolve) without logging misses.
    #[must_use]
    pub fn resolve_quiet(&self, section: &str, name: &str) -> Option<AnimationId> {
        self.lookup
            .get(&(section.to_string(), name.to_string()))
            .copied()
    }

    /// Timeline for `id`.
    #[must_use]
    pub fn timeline(&self, id: AnimationId) -> &Timeline {
        &self.timelines[id.index()]
    }

    /// Mutable timeline for author-time tweaks (speed, offset, last key time).
    pub fn timeline_mut(&mut self, id: AnimationId) -> &mut Timeline {
        &mut self.timelines[id.index()]
    }

    /// All timelines in registration order.
    #[must_use]
    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    /// Part at `index`.
    #[must_use]
    pub fn part(&self, index: usize) -> &Part {
        &self.parts[index]
    }

    /// Whole part table.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Index of the part called `name` inside `range`.
    #[must_use]
    pub fn find_part(&self, range: Range<usize>, name: &str) -> Option<usize> {
        let end = range.end.min(self.parts.len());
        (range.start..end).find(|&i| self.parts[i].name == name)
    }

    /// Largest part count across all timelines; sizes pose buffers.
    #[must_use]
    pub const fn max_part_count(&self) -> usize {
        self.max_parts
    }

    /// Largest bounding-box count across all timelines.
    #[must_use]
    pub const fn max_box_count(&self) -> usize {
        self.max_boxes
    }

    /// Number of registered timelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// True if no timeline is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}
