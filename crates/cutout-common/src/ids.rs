//! ID types for animations and collision box classes.

use serde::{Deserialize, Serialize};

/// Index of a timeline inside an animation library.
///
/// Only produced by a library (registration or lookup), so a held id always
/// names a timeline of the library that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u32);

impl AnimationId {
    /// Creates an animation ID from a raw value (for deserialization).
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the ID as a slice index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AnimationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification of an animatable bounding box.
///
/// The id is authored per box and tells game logic what a box is for. Two
/// classes have fixed meaning for the convenience queries: [`BoxClass::BODY`]
/// (areas that can be struck) and [`BoxClass::ATTACK`] (areas that strike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxClass(i32);

impl BoxClass {
    /// Body / hurt region.
    pub const BODY: Self = Self(0);

    /// Attack region.
    pub const ATTACK: Self = Self(1);

    /// Creates a box class from its authored id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the authored id.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// RGBA display color used by debug overlays.
    #[must_use]
    pub const fn debug_color(self) -> [u8; 4] {
        match self.0 {
            0 => [255, 255, 255, 255],
            1 => [255, 0, 0, 255],
            2 => [50, 205, 50, 255],
            _ => [255, 255, 224, 255],
        }
    }
}

impl Default for BoxClass {
    fn default() -> Self {
        Self::BODY
    }
}
