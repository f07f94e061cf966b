//! Draw list: a pose turned into render-ready quads.
//!
//! The renderer stays external. This module only decides what to draw, in
//! what order, with which color and blend state:
//! - [`DrawItem`] per visible part in draw order
//! - [`BlendMode`] per item with a `blend_changed` marker where the renderer
//!   must flush its batch
//! - [`QuadInstance`] as a plain GPU record

use bytemuck::{Pod, Zeroable};
use cutout_common::Rect;
use glam::{Vec2, Vec4};

use crate::library::AnimationLibrary;
use crate::pose::{Pose, PoseEntry};

/// Render state a part is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending
    #[default]
    Alpha,
    /// Additive blending (glows, fire)
    Additive,
}

/// One part ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Global part index
    pub part: usize,
    /// Source rectangle on the sprite sheet
    pub source: Rect,
    /// World-space corners m1..m4
    pub corners: [Vec2; 4],
    /// RGBA in `[0, 1]`
    pub color: Vec4,
    /// Blend state
    pub blend: BlendMode,
    /// Blend state differs from the previous item (or from alpha blending
    /// for the first item)
    pub blend_changed: bool,
}

impl DrawItem {
    /// Packs the item for GPU upload.
    #[must_use]
    pub fn to_instance(&self) -> QuadInstance {
        QuadInstance {
            corners: self.corners.map(|c| c.to_array()),
            source: [
                self.source.x as f32,
                self.source.y as f32,
                self.source.width as f32,
                self.source.height as f32,
            ],
            color: self.color.to_array(),
            additive: u32::from(self.blend == BlendMode::Additive),
            _pad: [0; 3],
        }
    }
}

/// GPU instance record for one textured quad.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct QuadInstance {
    /// World-space corners (top-left, top-right, bottom-left, bottom-right).
    pub corners: [[f32; 2]; 4],
    /// Source rectangle in sheet pixels (x, y, width, height).
    pub source: [f32; 4],
    /// RGBA color.
    pub color: [f32; 4],
    /// Additive blending (0 or 1).
    pub additive: u32,
    /// Padding for 16-byte alignment.
    _pad: [u32; 3],
}

/// Iterator over the visible parts of a pose in draw order.
pub struct DrawItems<'a> {
    library: &'a AnimationLibrary,
    entries: &'a [PoseEntry],
    slot: usize,
    position: Vec2,
    tint: Vec4,
    premultiply: bool,
    blend: BlendMode,
}

impl<'a> DrawItems<'a> {
    /// Draw list for `pose` placed at `position`, with every color
    /// multiplied by `tint`.
    #[must_use]
    pub fn new(
        library: &'a AnimationLibrary,
        pose: &'a Pose,
        position: Vec2,
        tint: Vec4,
        premultiply: bool,
    ) -> Self {
        Self {
            library,
            entries: pose.entries(),
            slot: 0,
            position,
            tint,
            premultiply,
            blend: BlendMode::Alpha,
        }
    }

    fn color(&self, entry: &PoseEntry) -> Vec4 {
        let rgb = entry.tint * self.tint.truncate();
        let alpha = entry.alpha * self.tint.w;
        let color = rgb.extend(alpha).clamp(Vec4::ZERO, Vec4::ONE);
        if self.premultiply {
            (color.truncate() * color.w).extend(color.w)
        } else {
            color
        }
    }
}

impl Iterator for DrawItems<'_> {
    type Item = DrawItem;

    fn next(&mut self) -> Option<DrawItem> {
        while self.slot < self.entries.len() {
            let row = self.entries[self.slot].order;
            self.slot += 1;
            let Some(entry) = self.entries.get(row) else {
                continue;
            };
            if entry.hidden {
                continue;
            }
            let Some(part) = self.library.parts().get(entry.part) else {
                continue;
            };

            let blend = if part.additive {
                BlendMode::Additive
            } else {
                BlendMode::Alpha
            };
            let blend_changed = blend != self.blend;
            self.blend = blend;

            return Some(DrawItem {
                part: entry.part,
                source: part.source,
                corners: entry.corners.map(|c| c + self.position),
                color: self.color(entry),
                blend,
                blend_changed,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Part;
    use glam::Vec3;

    fn library() -> AnimationLibrary {
        let mut library = AnimationLibrary::new("fx.png");
        library.add_part(Part::new("body", Rect::new(0, 0, 8, 8)));
        library.add_part(Part::new("glow", Rect::new(8, 0, 8, 8)).with_additive(true));
        library.add_part(Part::new("arm", Rect::new(16, 0, 8, 8)));
        library
    }

    fn pose() -> Pose {
        let mut pose = Pose::with_capacity(3);
        pose.reset(3);
        for (row, entry) in pose.entries_mut().iter_mut().enumerate() {
            entry.order = row;
            entry.part = row;
            entry.hidden = false;
        }
        pose
    }

    #[test]
    fn test_blend_boundaries_are_marked() {
        let library = library();
        let pose = pose();
        let items: Vec<DrawItem> =
            DrawItems::new(&library, &pose, Vec2::ZERO, Vec4::ONE, false).collect();
        assert_eq!(items.len(), 3);
        assert!(!items[0].blend_changed);
        assert_eq!(items[1].blend, BlendMode::Additive);
        assert!(items[1].blend_changed);
        assert!(items[2].blend_changed);
        assert_eq!(items[2].blend, BlendMode::Alpha);
    }

    #[test]
    fn test_items_are_placed_and_tinted() {
        let library = library();
        let mut pose = pose();
        pose.entries_mut()[0].alpha = 0.5;
        pose.entries_mut()[0].tint = Vec3::new(1.0, 0.5, 0.0);
        pose.entries_mut()[0].corners[0] = Vec2::new(1.0, 2.0);
        let first = DrawItems::new(&library, &pose, Vec2::new(100.0, 50.0), Vec4::ONE, true)
            .next()
            .expect("first part is visible");
        assert_eq!(first.corners[0], Vec2::new(101.0, 52.0));
        assert_eq!(first.source, Rect::new(0, 0, 8, 8));
        assert!((first.color - Vec4::new(0.5, 0.25, 0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_hidden_parts_are_skipped() {
        let library = library();
        let mut pose = pose();
        pose.entries_mut()[1].hidden = true;
        let parts: Vec<usize> = DrawItems::new(&library, &pose, Vec2::ZERO, Vec4::ONE, false)
            .map(|item| item.part)
            .collect();
        assert_eq!(parts, vec![0, 2]);
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<QuadInstance>(), 80);
        let library = library();
        let pose = pose();
        let item = DrawItems::new(&library, &pose, Vec2::ZERO, Vec4::ONE, false)
            .nth(1)
            .expect("glow is visible");
        let instance = item.to_instance();
        assert_eq!(instance.additive, 1);
        assert_eq!(instance.source, [8.0, 0.0, 8.0, 8.0]);
        assert_eq!(bytemuck::bytes_of(&instance).len(), 80);
    }
}
