//! Keyframes and the per-timeline keyframe grid.

use std::ops::{Add, Mul};

use cutout_common::{LoadError, LoadResult};
use glam::{Vec2, Vec3};

/// Part transform and visual parameters at one key of a timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Part drawn for this row at this key (global part index)
    pub part: usize,
    /// Draw-order slot
    pub order: usize,
    /// Non-uniform scale
    pub scale: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Position relative to the character origin
    pub position: Vec2,
    /// Opacity
    pub alpha: f32,
    /// Per-corner distortion offsets
    pub offsets: [Vec2; 4],
    /// Inactive rows are hidden outright
    pub active: bool,
    /// RGB tint multipliers
    pub tint: Vec3,
}

impl Default for Keyframe {
    fn default() -> Self {
        Self {
            part: 0,
            order: 0,
            scale: Vec2::ONE,
            rotation: 0.0,
            position: Vec2::ZERO,
            alpha: 1.0,
            offsets: [Vec2::ZERO; 4],
            active: true,
            tint: Vec3::ONE,
        }
    }
}

impl Keyframe {
    /// Creates an active keyframe for `part` with neutral parameters.
    #[must_use]
    pub fn for_part(part: usize) -> Self {
        Self {
            part,
            ..Self::default()
        }
    }

    /// Interpolates every animatable channel toward `next` at fraction `t`.
    ///
    /// Uses the `a * (1 - t) + b * t` form so that `t = 0` and `t = 1`
    /// reproduce the authored values exactly.
    #[must_use]
    pub fn lerp(&self, next: &Self, t: f32) -> KeySample {
        KeySample {
            scale: mix(self.scale, next.scale, t),
            rotation: mix(self.rotation, next.rotation, t),
            position: mix(self.position, next.position, t),
            alpha: mix(self.alpha, next.alpha, t),
            offsets: [
                mix(self.offsets[0], next.offsets[0], t),
                mix(self.offsets[1], next.offsets[1], t),
                mix(self.offsets[2], next.offsets[2], t),
                mix(self.offsets[3], next.offsets[3], t),
            ],
            tint: mix(self.tint, next.tint, t),
        }
    }
}

/// Interpolated channels between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySample {
    /// Scale
    pub scale: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Position
    pub position: Vec2,
    /// Opacity (unclamped)
    pub alpha: f32,
    /// Per-corner distortion offsets
    pub offsets: [Vec2; 4],
    /// RGB tint
    pub tint: Vec3,
}

fn mix<T>(a: T, b: T, t: f32) -> T
where
    T: Copy + Mul<f32, Output = T> + Add<Output = T>,
{
    a * (1.0 - t) + b * t
}

/// Fully populated `[part_row][key]` keyframe table, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyGrid {
    rows: usize,
    keys: usize,
    cells: Vec<Keyframe>,
}

impl KeyGrid {
    /// Number of part rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of key columns.
    #[must_use]
    pub const fn keys(&self) -> usize {
        self.keys
    }

    /// Keyframe of `row` at `key`.
    #[must_use]
    pub fn get(&self, row: usize, key: usize) -> &Keyframe {
        assert!(
            row < self.rows && key < self.keys,
            "key grid access ({row}, {key}) outside {}x{}",
            self.rows,
            self.keys
        );
        &self.cells[row * self.keys + key]
    }

    /// Iterates every keyframe in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Keyframe> {
        self.cells.iter()
    }
}

/// Incrementally fills a [`KeyGrid`], tracking which cells were written.
#[derive(Debug, Clone)]
pub struct KeyGridBuilder {
    rows: usize,
    keys: usize,
    cells: Vec<Option<Keyframe>>,
}

impl KeyGridBuilder {
    /// Creates an empty builder for `rows` parts and `keys` keys.
    #[must_use]
    pub fn new(rows: usize, keys: usize) -> Self {
        Self {
            rows,
            keys,
            cells: vec![None; rows * keys],
        }
    }

    /// Number of part rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of key columns.
    #[must_use]
    pub const fn keys(&self) -> usize {
        self.keys
    }

    /// Writes a cell, replacing any previous value.
    pub fn set(&mut self, row: usize, key: usize, keyframe: Keyframe) {
        assert!(row < self.rows && key < self.keys, "key grid write outside bounds");
        self.cells[row * self.keys + key] = Some(keyframe);
    }

    /// Mutable access to a written cell.
    pub fn get_mut(&mut self, row: usize, key: usize) -> Option<&mut Keyframe> {
        if row >= self.rows || key >= self.keys {
            return None;
        }
        self.cells[row * self.keys + key].as_mut()
    }

    /// Fills the whole row with copies of `keyframe`.
    #[must_use]
    pub fn with_row(mut self, row: usize, keyframe: Keyframe) -> Self {
        for key in 0..self.keys {
            self.set(row, key, keyframe);
        }
        self
    }

    /// Finishes the grid; `animation` names the owner in errors.
    pub fn build(self, animation: &str) -> LoadResult<KeyGrid> {
        let keys = self.keys;
        let mut cells = Vec::with_capacity(self.cells.len());
        for (i, cell) in self.cells.into_iter().enumerate() {
            match cell {
                Some(keyframe) => cells.push(keyframe),
                None => {
                    return Err(LoadError::IncompleteKeys {
                        animation: animation.to_string(),
                        row: i / keys,
                        key: i % keys,
                    })
                },
            }
        }
        Ok(KeyGrid {
            rows: self.rows,
            keys,
            cells,
        })
    }
}
