//! Pose buffer: per-row render data computed each tick.

use glam::{Vec2, Vec3};

use crate::keyframe::Keyframe;
use crate::part::Part;

/// Interpolated alpha below which a part is not drawn.
pub const HIDE_ALPHA: f32 = 0.02;

/// Transformed render data for one part row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseEntry {
    /// Row drawn at this draw slot
    pub order: usize,
    /// Global part index
    pub part: usize,
    /// Opacity in `[HIDE_ALPHA, 1]` when visible
    pub alpha: f32,
    /// Transformed corners, relative to the character origin
    pub corners: [Vec2; 4],
    /// Not drawn this tick
    pub hidden: bool,
    /// RGB tint
    pub tint: Vec3,
}

impl Default for PoseEntry {
    fn default() -> Self {
        Self {
            order: 0,
            part: 0,
            alpha: 1.0,
            corners: [Vec2::ZERO; 4],
            hidden: true,
            tint: Vec3::ONE,
        }
    }
}

/// Fixed-capacity buffer of pose entries for one player.
///
/// Storage is allocated once; switching timelines only changes the live
/// length.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    entries: Vec<PoseEntry>,
    len: usize,
}

impl Pose {
    /// Creates a buffer holding up to `capacity` rows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: vec![PoseEntry::default(); capacity],
            len: 0,
        }
    }

    /// Total rows allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Sets the live row count and hides every live row.
    ///
    /// Growing past the allocated capacity reallocates; players size the
    /// buffer from the library so this never happens during playback.
    pub fn reset(&mut self, len: usize) {
        if len > self.entries.len() {
            self.entries.resize(len, PoseEntry::default());
        }
        self.len = len;
        for entry in &mut self.entries[..len] {
            *entry = PoseEntry::default();
        }
    }

    /// Live rows.
    #[must_use]
    pub fn entries(&self) -> &[PoseEntry] {
        &self.entries[..self.len]
    }

    /// Mutable live rows.
    pub fn entries_mut(&mut self) -> &mut [PoseEntry] {
        &mut self.entries[..self.len]
    }

    /// Live row `row`, if any.
    #[must_use]
    pub fn entry(&self, row: usize) -> Option<&PoseEntry> {
        self.entries().get(row)
    }

    /// Number of live rows that are not hidden.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.entries().iter().filter(|e| !e.hidden).count()
    }

    /// Iterates live rows in draw order.
    ///
    /// Slot `n` draws the row named by `entries[n].order`. Hidden rows and
    /// orders outside the live range are skipped.
    pub fn draw_order(&self) -> impl Iterator<Item = (usize, &PoseEntry)> + '_ {
        let entries = self.entries();
        entries.iter().filter_map(move |slot| {
            let row = slot.order;
            entries
                .get(row)
                .filter(|entry| !entry.hidden)
                .map(|entry| (row, entry))
        })
    }
}

/// Interpolates `from` toward `to` and writes the transformed part into
/// `entry`.
///
/// Corners are the part's model corners scaled, rotated about the pivot,
/// moved by the interpolated position plus `offset`, and displaced by the
/// distortion offsets. X is negated when `flip` is set.
pub fn pose_part(
    entry: &mut PoseEntry,
    part: &Part,
    from: &Keyframe,
    to: &Keyframe,
    fraction: f32,
    offset: Vec2,
    flip: bool,
) {
    let sample = from.lerp(to, fraction);
    entry.tint = sample.tint;
    entry.alpha = sample.alpha;
    if sample.alpha < HIDE_ALPHA {
        entry.hidden = true;
        return;
    }
    entry.alpha = sample.alpha.min(1.0);

    let rotation = Vec2::from_angle(sample.rotation);
    let position = sample.position + offset;
    for (i, corner) in entry.corners.iter_mut().enumerate() {
        let mut v = rotation.rotate(part.corners[i] * sample.scale) + position + sample.offsets[i];
        if flip {
            v.x = -v.x;
        }
        *corner = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutout_common::Rect;
    use std::f32::consts::FRAC_PI_2;

    fn unit_part() -> Part {
        Part::new("square", Rect::new(0, 0, 2, 2))
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_pose_part_translates_and_scales() {
        let from = Keyframe {
            position: Vec2::new(10.0, 5.0),
            scale: Vec2::new(2.0, 1.0),
            ..Keyframe::default()
        };
        let mut entry = PoseEntry::default();
        pose_part(&mut entry, &unit_part(), &from, &from, 0.0, Vec2::new(1.0, 0.0), false);
        assert_close(entry.corners[0], Vec2::new(11.0, 5.0));
        assert_close(entry.corners[3], Vec2::new(15.0, 7.0));
    }

    #[test]
    fn test_pose_part_rotates_about_pivot() {
        let key = Keyframe {
            rotation: FRAC_PI_2,
            ..Keyframe::default()
        };
        let mut entry = PoseEntry::default();
        pose_part(&mut entry, &unit_part(), &key, &key, 0.0, Vec2::ZERO, false);
        assert_close(entry.corners[0], Vec2::ZERO);
        assert_close(entry.corners[1], Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_pose_part_flip_negates_x() {
        let key = Keyframe {
            position: Vec2::new(3.0, 4.0),
            ..Keyframe::default()
        };
        let mut entry = PoseEntry::default();
        pose_part(&mut entry, &unit_part(), &key, &key, 0.0, Vec2::ZERO, true);
        assert_close(entry.corners[0], Vec2::new(-3.0, 4.0));
        assert_close(entry.corners[1], Vec2::new(-5.0, 4.0));
    }

    #[test]
    fn test_distortion_offsets_move_single_corners() {
        let mut key = Keyframe::default();
        key.offsets[2] = Vec2::new(0.5, -0.5);
        let mut entry = PoseEntry::default();
        pose_part(&mut entry, &unit_part(), &key, &key, 0.0, Vec2::ZERO, false);
        assert_close(entry.corners[2], Vec2::new(0.5, 1.5));
        assert_close(entry.corners[1], Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_faint_alpha_hides() {
        let faint = Keyframe {
            alpha: 0.01,
            ..Keyframe::default()
        };
        let mut entry = PoseEntry {
            hidden: false,
            ..PoseEntry::default()
        };
        pose_part(&mut entry, &unit_part(), &faint, &faint, 0.0, Vec2::ZERO, false);
        assert!(entry.hidden);
    }

    #[test]
    fn test_alpha_clamped_to_one() {
        let bright = Keyframe {
            alpha: 1.6,
            ..Keyframe::default()
        };
        let mut entry = PoseEntry::default();
        pose_part(&mut entry, &unit_part(), &bright, &bright, 0.0, Vec2::ZERO, false);
        assert!((entry.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_draw_order_follows_order_slots() {
        let mut pose = Pose::with_capacity(4);
        pose.reset(3);
        for (slot, (order, part)) in [(2, 20), (0, 10), (1, 11)].into_iter().enumerate() {
            let entry = &mut pose.entries_mut()[slot];
            entry.order = order;
            entry.part = part;
            entry.hidden = false;
        }
        pose.entries_mut()[1].hidden = true;
        let parts: Vec<usize> = pose.draw_order().map(|(_, e)| e.part).collect();
        // slot 0 draws row 2, slot 1 draws row 0, slot 2 draws row 1 (hidden)
        assert_eq!(parts, vec![11, 20]);
        assert_eq!(pose.visible_count(), 2);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut pose = Pose::with_capacity(5);
        pose.reset(2);
        assert_eq!(pose.entries().len(), 2);
        assert_eq!(pose.capacity(), 5);
        assert!(pose.entry(2).is_none());
    }
}
