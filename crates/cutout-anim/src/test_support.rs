//! Fixtures shared by unit tests.

use std::ops::Range;

use cutout_common::{AnimationId, BoxClass, Rect};
use glam::Vec2;

use crate::boxes::{BoundingBox, BoxKey};
use crate::keyframe::{KeyGridBuilder, Keyframe};
use crate::library::AnimationLibrary;
use crate::part::Part;
use crate::timeline::Timeline;

/// Part names of the six-part test character, in part-table order.
pub const HERO_PARTS: [&str; 6] = ["torso", "head", "leg_l", "arm_l", "arm_r", "leg_r"];

/// Timeline over `parts` whose row `r` at key `k` sits at
/// `(base_x + 10 * k, r)` with draw order `order(r)`.
pub fn stepped_timeline(
    name: &str,
    times: &[f32],
    parts: Range<usize>,
    looping: bool,
    base_x: f32,
    order: impl Fn(usize) -> usize,
) -> Timeline {
    let rows = parts.len();
    let mut grid = KeyGridBuilder::new(rows, times.len());
    for row in 0..rows {
        for key in 0..times.len() {
            grid.set(
                row,
                key,
                Keyframe {
                    part: parts.start + row,
                    order: order(row),
                    position: Vec2::new(base_x + 10.0 * key as f32, row as f32),
                    ..Keyframe::default()
                },
            );
        }
    }
    let grid = grid.build(name).expect("fixture grid is complete");
    Timeline::new(name, times.to_vec(), grid, parts)
        .expect("fixture timeline is valid")
        .with_looping(looping)
}

/// One-part timeline driving part 0.
pub fn single_part_timeline(name: &str, times: &[f32], looping: bool) -> Timeline {
    stepped_timeline(name, times, 0..1, looping, 0.0, |row| row)
}

/// Library with one part and one timeline registered under section `""`.
pub fn single_part_library(times: &[f32], looping: bool) -> (AnimationLibrary, AnimationId) {
    let mut library = AnimationLibrary::new("single.png");
    library.add_part(Part::new("body", Rect::new(0, 0, 4, 4)));
    let id = library
        .add_timeline("", single_part_timeline("anim", times, looping))
        .expect("fixture registers");
    (library, id)
}

/// Six-part character in section `hero` with `idle` (looping, drawn back
/// to front), `walk` (looping, three keys) and `attack` (one-shot with
/// boxes), registered in that order.
pub fn character() -> AnimationLibrary {
    let mut library = AnimationLibrary::new("hero.png");
    for name in HERO_PARTS {
        library.add_part(Part::new(name, Rect::new(0, 0, 4, 4)));
    }
    let parts = 0..HERO_PARTS.len();
    let last = HERO_PARTS.len() - 1;

    let idle = stepped_timeline("idle", &[0.0, 1000.0], parts.clone(), true, 0.0, |row| {
        last - row
    });
    let walk = stepped_timeline(
        "walk",
        &[0.0, 500.0, 1000.0],
        parts.clone(),
        true,
        100.0,
        |row| row,
    );
    let attack = stepped_timeline("attack", &[0.0, 1000.0], parts, false, 200.0, |row| row)
        .with_boxes(vec![
            BoundingBox::new("fist", BoxClass::ATTACK, 0, 1000)
                .with_key(BoxKey::new(0, Rect::new(10, -20, 10, 10)))
                .with_key(BoxKey::new(500, Rect::new(30, -20, 10, 10)))
                .with_key(BoxKey::new(1000, Rect::new(30, -20, 10, 10))),
            BoundingBox::new("body", BoxClass::BODY, 0, 1000)
                .with_key(BoxKey::new(0, Rect::new(-10, -40, 20, 40)))
                .with_key(BoxKey::new(1000, Rect::new(-10, -40, 20, 40))),
            BoundingBox::new("kick", BoxClass::new(2), 0, 500)
                .with_key(BoxKey::new(0, Rect::new(0, 0, 8, 8)))
                .with_key(BoxKey::new(500, Rect::new(0, 0, 8, 8))),
        ]);

    for timeline in [idle, walk, attack] {
        library.add_timeline("hero", timeline).expect("fixture registers");
    }
    library
}
