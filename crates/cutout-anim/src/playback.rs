//! Player: playback state of one character instance.
//!
//! A player owns everything that changes per frame (cursor, pose, mix mask,
//! box rectangles) and borrows the shared [`AnimationLibrary`] for every
//! operation that reads authored data. Buffers are sized in
//! [`Player::new`] and only grow when an animation starts;
//! [`Player::tick`] does not allocate.

use cutout_common::{AnimationId, BoxClass, Rect};
use glam::{Vec2, Vec4};
use tracing::{debug, warn};

use crate::boxes::{BoxSlot, BoxTrack};
use crate::cursor::{Cursor, CursorEvent, Direction};
use crate::draw::{DrawItem, DrawItems};
use crate::library::AnimationLibrary;
use crate::mix::{MixMask, MixParts, MixTrack};
use crate::pose::{pose_part, Pose};
use crate::timeline::Timeline;

/// Fixed step of content authored for 60 Hz playback, in milliseconds.
pub const DEFAULT_FIXED_STEP_MS: f32 = 1000.0 / 60.0;

/// How far a tick moves the timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeStep {
    /// Every tick advances by this many milliseconds, whatever the frame took
    Fixed(f32),
    /// Every tick advances by the elapsed time passed to [`Player::tick`]
    Elapsed,
}

impl Default for TimeStep {
    fn default() -> Self {
        Self::Fixed(DEFAULT_FIXED_STEP_MS)
    }
}

impl TimeStep {
    /// Milliseconds to advance for a frame that took `elapsed_ms`.
    #[must_use]
    pub fn step(self, elapsed_ms: f32) -> f32 {
        match self {
            Self::Fixed(ms) => ms,
            Self::Elapsed => elapsed_ms,
        }
    }
}

/// Something noteworthy that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The looping primary timeline wrapped around
    Looped,
    /// The non-looping primary timeline reached its end and stopped
    Finished,
}

/// Playback state for one character.
#[derive(Debug, Clone)]
pub struct Player {
    section: String,
    animation: Option<AnimationId>,
    cursor: Cursor,
    flip: bool,
    active: bool,
    play_speed: f32,
    done: bool,
    last_direction: Direction,
    part_count: usize,
    pose: Pose,
    mix: Option<MixTrack>,
    mix_mask: MixMask,
    boxes: BoxTrack,
    position: Vec2,
    time_step: TimeStep,
}

impl Player {
    /// Creates an inactive player for the characters of `section`.
    ///
    /// The pose, mix mask and box buffers are sized from `library` here.
    /// Starting an animation from a library with more parts or boxes grows
    /// them; ticking never does.
    #[must_use]
    pub fn new(library: &AnimationLibrary, section: impl Into<String>, position: Vec2) -> Self {
        Self {
            section: section.into(),
            animation: None,
            cursor: Cursor::default(),
            flip: false,
            active: false,
            play_speed: 1.0,
            done: false,
            last_direction: Direction::Forward,
            part_count: 0,
            pose: Pose::with_capacity(library.max_part_count() + 1),
            mix: None,
            mix_mask: MixMask::new(library.parts().len()),
            boxes: BoxTrack::with_capacity(library.max_box_count()),
            position,
            time_step: TimeStep::default(),
        }
    }

    /// Starts animation `id` from its first key, or from its last two keys in
    /// reverse when `backward` is set. Ends any mixing.
    pub fn set_animation(
        &mut self,
        library: &AnimationLibrary,
        id: AnimationId,
        flip: bool,
        backward: bool,
    ) {
        let timeline = library.timeline(id);
        debug!(animation = timeline.name(), %id, flip, backward, "Set animation");
        self.animation = Some(id);
        self.flip = flip;
        self.active = true;
        self.done = false;
        self.mix = None;
        self.cursor = Cursor::start(timeline, backward);
        self.last_direction = self.cursor.direction;
        self.part_count = timeline.part_count();
        self.pose.reset(self.part_count);
        self.mix_mask.grow(library.parts().len());
        self.boxes.reset(timeline);
    }

    /// Looks `name` up in the player's section and starts it.
    ///
    /// An unknown name [deactivates](Self::deactivate) the player and
    /// returns `false`.
    pub fn set_animation_by_name(
        &mut self,
        library: &AnimationLibrary,
        name: &str,
        flip: bool,
        backward: bool,
    ) -> bool {
        match library.resolve(&self.section, name) {
            Some(id) => {
                self.set_animation(library, id, flip, backward);
                true
            },
            None => {
                self.deactivate();
                false
            },
        }
    }

    /// Pauses the player; [`tick`](Self::tick) does nothing and no box
    /// reports a hit until the next `set_animation`.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.boxes.clear();
    }

    /// Jumps to the last two keys of the current animation and plays it in
    /// reverse from there.
    pub fn reverse_direction(&mut self, library: &AnimationLibrary) {
        if let Some(id) = self.animation {
            self.cursor = Cursor::at_end(library.timeline(id));
            self.done = false;
        }
    }

    /// Advances playback by one frame that took `elapsed_ms` milliseconds.
    ///
    /// Order within a tick: primary cursor, primary pose, secondary (mix)
    /// track, bounding boxes.
    pub fn tick(&mut self, library: &AnimationLibrary, elapsed_ms: f32) -> Option<PlaybackEvent> {
        if !self.active {
            return None;
        }
        let id = self.animation?;
        let timeline = library.timeline(id);
        if timeline.looping() {
            self.done = false;
        }

        let was_stopped = self.cursor.stopped;
        let step = self.time_step.step(elapsed_ms) * self.play_speed * timeline.speed();
        let event = match self.cursor.advance(timeline, step) {
            Some(CursorEvent::Looped) => {
                self.done = true;
                Some(PlaybackEvent::Looped)
            },
            Some(CursorEvent::Finished) => {
                self.done = true;
                Some(PlaybackEvent::Finished)
            },
            None => None,
        };

        if !was_stopped {
            self.pose_primary(library, timeline);
        }
        self.last_direction = self.cursor.direction;

        self.tick_mix(library, elapsed_ms);

        if !self.cursor.stopped {
            self.boxes.update(timeline, self.cursor.timer, self.flip);
        }
        event
    }

    fn pose_primary(&mut self, library: &AnimationLibrary, timeline: &Timeline) {
        let fraction = self.cursor.fraction(timeline);
        let (key1, key2) = (self.cursor.key1, self.cursor.key2);
        // rows the secondary timeline has no keyframes for stay primary
        let mix_rows = self
            .mix
            .map_or(0, |track| library.timeline(track.animation).part_count());
        let offset = timeline.offset();

        for (row, entry) in self.pose.entries_mut().iter_mut().enumerate() {
            let from = timeline.keyframe(row, key1);
            entry.order = from.order;
            if !from.active {
                entry.hidden = true;
                continue;
            }
            entry.hidden = false;
            entry.part = from.part;
            if row < mix_rows && self.mix_mask.contains(from.part) {
                continue;
            }
            let to = timeline.keyframe(row, key2);
            pose_part(entry, library.part(from.part), from, to, fraction, offset, self.flip);
        }
    }

    fn tick_mix(&mut self, library: &AnimationLibrary, elapsed_ms: f32) {
        let Some(track) = self.mix.as_mut() else {
            return;
        };
        let timeline = library.timeline(track.animation);
        let step = self.time_step.step(elapsed_ms) * track.speed * timeline.speed();
        track.advance(timeline, step);

        let fraction = track.cursor.fraction(timeline);
        let (key1, key2) = (track.cursor.key1, track.cursor.key2);
        let offset = timeline.offset();
        let rows = self.part_count.min(timeline.part_count());

        for (row, entry) in self.pose.entries_mut()[..rows].iter_mut().enumerate() {
            let from = timeline.keyframe(row, key1);
            if !self.mix_mask.contains(from.part) {
                continue;
            }
            entry.order = from.order;
            if !from.active {
                entry.hidden = true;
                continue;
            }
            entry.hidden = false;
            entry.part = from.part;
            let to = timeline.keyframe(row, key2);
            pose_part(entry, library.part(from.part), from, to, fraction, offset, self.flip);
        }
    }

    /// True after the non-looping animation stopped (or the looping one
    /// wrapped on the last tick), unless the direction just changed.
    ///
    /// Not cleared by reading; the next `set_animation` resets it.
    #[must_use]
    pub fn is_animation_done(&self) -> bool {
        self.last_direction == self.cursor.direction && self.done
    }

    // ---- mixing ----

    /// Plays `primary` on every part except the masked ones, which follow
    /// `secondary` on its own looping clock.
    #[allow(clippy::too_many_arguments)]
    pub fn mix_animation(
        &mut self,
        library: &AnimationLibrary,
        primary: AnimationId,
        secondary: AnimationId,
        parts: MixParts<'_>,
        flip: bool,
        backward: bool,
        backward_secondary: bool,
    ) {
        if primary == secondary {
            warn!(animation = %primary, "Mixing an animation with itself");
        }
        self.set_animation(library, primary, flip, backward);

        let timeline = library.timeline(secondary);
        if timeline.part_count() != self.part_count {
            warn!(
                primary = library.timeline(primary).name(),
                secondary = timeline.name(),
                primary_parts = self.part_count,
                secondary_parts = timeline.part_count(),
                "Mixed animations have different part counts"
            );
        }
        if let MixParts::Indices(indices) = parts {
            self.mix_mask.grow(library.parts().len());
            self.mix_mask.assign(indices);
        }
        self.mix = Some(MixTrack::new(
            secondary,
            timeline,
            self.play_speed,
            backward_secondary,
        ));
    }

    /// Name-based [`mix_animation`](Self::mix_animation). Returns `false`
    /// and deactivates the player if either name is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn mix_animation_by_name(
        &mut self,
        library: &AnimationLibrary,
        primary: &str,
        secondary: &str,
        parts: MixParts<'_>,
        flip: bool,
        backward: bool,
        backward_secondary: bool,
    ) -> bool {
        let ids = (
            library.resolve(&self.section, primary),
            library.resolve(&self.section, secondary),
        );
        match ids {
            (Some(primary), Some(secondary)) => {
                self.mix_animation(
                    library,
                    primary,
                    secondary,
                    parts,
                    flip,
                    backward,
                    backward_secondary,
                );
                true
            },
            _ => {
                self.deactivate();
                false
            },
        }
    }

    /// Replaces the mix mask with the parts called `names` in animation
    /// `id`'s part range. Later mixes can reuse it with [`MixParts::Keep`].
    pub fn flag_mix_parts(&mut self, library: &AnimationLibrary, id: AnimationId, names: &[&str]) {
        self.mix_mask = MixMask::from_part_names(library, id, names);
    }

    /// Replaces the mix mask.
    pub fn set_mix_mask(&mut self, mask: MixMask) {
        self.mix_mask = mask;
    }

    /// Current mix mask.
    #[must_use]
    pub fn mix_mask(&self) -> &MixMask {
        &self.mix_mask
    }

    /// Speed of the secondary track.
    pub fn set_mix_speed(&mut self, speed: f32) {
        if let Some(track) = self.mix.as_mut() {
            track.speed = speed;
        }
    }

    /// Plays the secondary track in reverse from its last two keys.
    pub fn reverse_mix_direction(&mut self, library: &AnimationLibrary) {
        if let Some(track) = self.mix.as_mut() {
            track.reverse(library.timeline(track.animation));
        }
    }

    /// Hands every part back to the primary timeline.
    pub fn stop_mixing(&mut self) {
        self.mix = None;
    }

    /// True while a secondary timeline is mixed in.
    #[must_use]
    pub const fn is_mixing(&self) -> bool {
        self.mix.is_some()
    }

    /// Secondary track state.
    #[must_use]
    pub fn mix_track(&self) -> Option<&MixTrack> {
        self.mix.as_ref()
    }

    // ---- boxes ----

    /// True if an attack box overlaps `rect` (world space).
    #[must_use]
    pub fn hits(&self, rect: &Rect) -> bool {
        self.hits_class(rect, BoxClass::ATTACK)
    }

    /// True if a body box overlaps `rect` (world space).
    #[must_use]
    pub fn was_hit_by(&self, rect: &Rect) -> bool {
        self.hits_class(rect, BoxClass::BODY)
    }

    /// True if a box of `class` overlaps `rect` (world space). Always
    /// false while inactive.
    #[must_use]
    pub fn hits_class(&self, rect: &Rect, class: BoxClass) -> bool {
        self.active && self.boxes.hit_test(self.position, rect, class)
    }

    /// Current box rectangles relative to the character origin.
    #[must_use]
    pub fn boxes(&self) -> &[BoxSlot] {
        self.boxes.slots()
    }

    /// World-space rectangles and display colors of the non-empty boxes,
    /// for a debug overlay. Nothing while stopped or inactive.
    pub fn debug_boxes(&self) -> impl Iterator<Item = (Rect, [u8; 4])> + '_ {
        let (dx, dy) = (self.position.x as i32, self.position.y as i32);
        let visible = self.active && !self.cursor.stopped;
        self.boxes
            .slots()
            .iter()
            .filter(move |slot| visible && slot.rect.width >= 1 && slot.rect.height >= 1)
            .map(move |slot| (slot.rect.translated(dx, dy), slot.class.debug_color()))
    }

    // ---- rendering ----

    /// Visible parts in draw order, placed at the player's position.
    /// Nothing while inactive.
    pub fn draw_items<'a>(
        &'a self,
        library: &'a AnimationLibrary,
        tint: Vec4,
        premultiply: bool,
    ) -> impl Iterator<Item = DrawItem> + 'a {
        self.active
            .then(|| DrawItems::new(library, &self.pose, self.position, tint, premultiply))
            .into_iter()
            .flatten()
    }

    /// Pose computed by the last tick.
    #[must_use]
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    // ---- accessors ----

    /// Sheet section used for name lookups.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Current primary animation.
    #[must_use]
    pub const fn animation(&self) -> Option<AnimationId> {
        self.animation
    }

    /// Bracketing key pair of the primary track.
    #[must_use]
    pub const fn key_pair(&self) -> (usize, usize) {
        (self.cursor.key1, self.cursor.key2)
    }

    /// Primary timer in the timeline's millisecond domain.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.cursor.timer
    }

    /// Interpolation fraction of the primary track.
    #[must_use]
    pub fn fraction(&self, library: &AnimationLibrary) -> f32 {
        self.animation
            .map_or(0.0, |id| self.cursor.fraction(library.timeline(id)))
    }

    /// Primary playback direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.cursor.direction
    }

    /// True once a non-looping primary animation reached its end.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.cursor.stopped
    }

    /// True while ticks advance playback.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Parts driven by the current primary animation.
    #[must_use]
    pub const fn part_count(&self) -> usize {
        self.part_count
    }

    /// Horizontal flip.
    #[must_use]
    pub const fn flip(&self) -> bool {
        self.flip
    }

    /// Sets the horizontal flip; takes effect on the next tick.
    pub fn set_flip(&mut self, flip: bool) {
        self.flip = flip;
    }

    /// Primary speed multiplier.
    #[must_use]
    pub const fn play_speed(&self) -> f32 {
        self.play_speed
    }

    /// Sets the primary speed multiplier. Mixes started afterwards use it as
    /// their initial secondary speed.
    pub fn set_play_speed(&mut self, speed: f32) {
        self.play_speed = speed;
    }

    /// Character origin in world space.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the character origin.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Time step mode.
    #[must_use]
    pub const fn time_step(&self) -> TimeStep {
        self.time_step
    }

    /// Sets the time step mode.
    pub fn set_time_step(&mut self, time_step: TimeStep) {
        self.time_step = time_step;
    }
}
