//! Playback cursor over a timeline's keys.
//!
//! A cursor tracks the bracketing key pair and the timer inside it. The
//! primary track of a player and the secondary (mix) track both step through
//! their timelines with the same state machine; they differ only in what
//! they do with the returned [`CursorEvent`].

use crate::timeline::{Timeline, KEY_EPSILON};

/// Playback direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Toward the last key
    #[default]
    Forward,
    /// Toward key 0
    Reverse,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Outcome of advancing a cursor past the end of its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorEvent {
    /// A looping timeline wrapped around
    Looped,
    /// A non-looping timeline reached its end and stopped
    Finished,
}

/// Key pair, timer and direction of one playback track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    /// Key at or before the timer
    pub key1: usize,
    /// Key after the timer
    pub key2: usize,
    /// Time in the timeline's millisecond domain
    pub timer: f32,
    /// Playback direction
    pub direction: Direction,
    /// Set when a non-looping timeline reached its end
    pub stopped: bool,
}

impl Cursor {
    /// Cursor at the start of `timeline` (or at its end when `backward`).
    #[must_use]
    pub fn start(timeline: &Timeline, backward: bool) -> Self {
        if backward {
            Self::at_end(timeline)
        } else {
            Self {
                key1: 0,
                key2: timeline.last_key().min(1),
                timer: timeline.time(0),
                direction: Direction::Forward,
                stopped: false,
            }
        }
    }

    /// Cursor on the last two keys of `timeline`, playing in reverse.
    #[must_use]
    pub fn at_end(timeline: &Timeline) -> Self {
        let last = timeline.last_key();
        Self {
            key1: last.saturating_sub(1),
            key2: last,
            timer: timeline.time(last),
            direction: Direction::Reverse,
            stopped: false,
        }
    }

    /// Advances the timer by `step` milliseconds in the current direction.
    ///
    /// A key counts as reached when the timer lands exactly on its time:
    /// forward playback passes key `k` once `timer >= time(k)`, reverse
    /// playback once `timer <= time(k)`.
    ///
    /// Returns an event when the cursor wrapped or stopped during this step.
    /// A stopped cursor does not move.
    pub fn advance(&mut self, timeline: &Timeline, step: f32) -> Option<CursorEvent> {
        self.advance_with(timeline, step, timeline.looping())
    }

    /// Like [`advance`](Self::advance) but wraps at the ends even when the
    /// timeline is not authored as looping.
    pub fn advance_looping(&mut self, timeline: &Timeline, step: f32) -> Option<CursorEvent> {
        self.advance_with(timeline, step, true)
    }

    fn advance_with(
        &mut self,
        timeline: &Timeline,
        step: f32,
        looping: bool,
    ) -> Option<CursorEvent> {
        if self.stopped {
            return None;
        }
        match self.direction {
            Direction::Forward => self.advance_forward(timeline, step, looping),
            Direction::Reverse => self.advance_reverse(timeline, step, looping),
        }
    }

    fn advance_forward(
        &mut self,
        timeline: &Timeline,
        step: f32,
        looping: bool,
    ) -> Option<CursorEvent> {
        let last = timeline.last_key();
        self.timer += step;
        while self.timer >= timeline.time(self.key2) {
            if self.key2 >= last {
                self.timer = 0.0;
                if looping {
                    self.key1 = 0;
                    self.key2 = last.min(1);
                    return Some(CursorEvent::Looped);
                }
                self.key1 = last;
                self.key2 = last;
                self.stopped = true;
                return Some(CursorEvent::Finished);
            }
            self.key1 = self.key2;
            self.key2 += 1;
        }
        None
    }

    fn advance_reverse(
        &mut self,
        timeline: &Timeline,
        step: f32,
        looping: bool,
    ) -> Option<CursorEvent> {
        let last = timeline.last_key();
        self.timer -= step;
        while self.timer <= timeline.time(self.key1) {
            if self.key1 == 0 {
                if looping {
                    self.key1 = last.saturating_sub(1);
                    self.key2 = last;
                    self.timer = timeline.time(last);
                    return Some(CursorEvent::Looped);
                }
                self.key1 = 0;
                self.key2 = 0;
                self.stopped = true;
                self.timer = timeline.time(0);
                return Some(CursorEvent::Finished);
            }
            self.key2 = self.key1;
            self.key1 -= 1;
        }
        None
    }

    /// Interpolation fraction between `key1` and `key2`, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, timeline: &Timeline) -> f32 {
        let t1 = timeline.time(self.key1);
        let mut span = timeline.time(self.key2) - t1;
        if span <= 0.0 {
            span = KEY_EPSILON;
        }
        ((self.timer - t1) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::single_part_timeline;
    use proptest::prelude::*;

    #[test]
    fn test_three_key_loop_sequence() {
        let timeline = single_part_timeline("walk", &[0.0, 500.0, 1000.0], true);
        let mut cursor = Cursor::start(&timeline, false);
        assert_eq!((cursor.key1, cursor.key2), (0, 1));
        assert!(cursor.fraction(&timeline).abs() < f32::EPSILON);

        let expected = [
            ((0, 1), 0.5, None),
            ((1, 2), 0.0, None),
            ((1, 2), 0.5, None),
            ((0, 1), 0.0, Some(CursorEvent::Looped)),
            ((0, 1), 0.5, None),
            ((1, 2), 0.0, None),
        ];
        for (pair, fraction, event) in expected {
            let got = cursor.advance(&timeline, 250.0);
            assert_eq!(got, event);
            assert_eq!((cursor.key1, cursor.key2), pair);
            assert!((cursor.fraction(&timeline) - fraction).abs() < 1e-6);
            assert!(!cursor.stopped);
        }
    }

    #[test]
    fn test_landing_on_key_time_reaches_key() {
        let timeline = single_part_timeline("swing", &[0.0, 500.0, 1000.0], false);
        let mut cursor = Cursor::start(&timeline, false);
        assert_eq!(cursor.advance(&timeline, 500.0), None);
        assert_eq!((cursor.key1, cursor.key2), (1, 2));
        assert!(cursor.fraction(&timeline).abs() < f32::EPSILON);
        assert_eq!(cursor.advance(&timeline, 500.0), Some(CursorEvent::Finished));

        let mut cursor = Cursor::at_end(&timeline);
        assert_eq!(cursor.advance(&timeline, 500.0), None);
        assert_eq!((cursor.key1, cursor.key2), (0, 1));
        assert!((cursor.fraction(&timeline) - 1.0).abs() < f32::EPSILON);
        assert_eq!(cursor.advance(&timeline, 500.0), Some(CursorEvent::Finished));
        assert_eq!((cursor.key1, cursor.key2), (0, 0));
    }

    #[test]
    fn test_non_looping_stops_on_last_key() {
        let timeline = single_part_timeline("attack", &[0.0, 1000.0], false);
        let mut cursor = Cursor::start(&timeline, false);
        for _ in 0..3 {
            assert_eq!(cursor.advance(&timeline, 300.0), None);
        }
        assert_eq!(cursor.advance(&timeline, 300.0), Some(CursorEvent::Finished));
        assert_eq!((cursor.key1, cursor.key2), (1, 1));
        assert!(cursor.stopped);
        assert_eq!(cursor.advance(&timeline, 300.0), None);
    }

    #[test]
    fn test_reverse_reaches_key_zero() {
        let timeline = single_part_timeline("crouch", &[0.0, 400.0, 800.0], false);
        let mut cursor = Cursor::at_end(&timeline);
        assert_eq!((cursor.key1, cursor.key2), (1, 2));
        let mut finished = 0;
        for _ in 0..10 {
            if cursor.advance(&timeline, 150.0) == Some(CursorEvent::Finished) {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert!(cursor.stopped);
        assert_eq!((cursor.key1, cursor.key2), (0, 0));
    }

    #[test]
    fn test_reverse_loop_wraps_to_last_pair() {
        let timeline = single_part_timeline("spin", &[0.0, 500.0, 1000.0], true);
        let mut cursor = Cursor::at_end(&timeline);
        assert_eq!(cursor.advance(&timeline, 600.0), None);
        assert_eq!((cursor.key1, cursor.key2), (0, 1));
        assert_eq!(cursor.advance(&timeline, 600.0), Some(CursorEvent::Looped));
        assert_eq!((cursor.key1, cursor.key2), (1, 2));
        assert!((cursor.timer - 1000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_shared_time_stamps_are_skipped() {
        let timeline = single_part_timeline("snap", &[0.0, 500.0, 500.0, 1000.0], false);
        let mut cursor = Cursor::start(&timeline, false);
        cursor.advance(&timeline, 600.0);
        assert_eq!((cursor.key1, cursor.key2), (2, 3));
        let fraction = cursor.fraction(&timeline);
        assert!((0.0..=1.0).contains(&fraction));
    }

    #[test]
    fn test_forced_loop_wraps_one_shot() {
        let timeline = single_part_timeline("walk", &[0.0, 1000.0], false);
        let mut cursor = Cursor::start(&timeline, false);
        assert_eq!(cursor.advance_looping(&timeline, 1200.0), Some(CursorEvent::Looped));
        assert!(!cursor.stopped);
        assert_eq!((cursor.key1, cursor.key2), (0, 1));
    }

    #[test]
    fn test_single_key_timeline() {
        let timeline = single_part_timeline("pose", &[0.0], false);
        let mut cursor = Cursor::start(&timeline, false);
        assert_eq!((cursor.key1, cursor.key2), (0, 0));
        assert_eq!(cursor.advance(&timeline, 16.0), Some(CursorEvent::Finished));
        assert!(cursor.stopped);
    }

    proptest! {
        #[test]
        fn prop_fraction_stays_in_unit_range(
            steps in proptest::collection::vec(0.0f32..400.0, 1..64),
            looping in any::<bool>(),
            reverse in any::<bool>(),
        ) {
            let timeline = single_part_timeline("p", &[0.0, 120.0, 120.0, 700.0, 1000.0], looping);
            let mut cursor = Cursor::start(&timeline, reverse);
            for step in steps {
                cursor.advance(&timeline, step);
                let fraction = cursor.fraction(&timeline);
                prop_assert!((0.0..=1.0).contains(&fraction));
                prop_assert!(cursor.key1 <= cursor.key2);
                prop_assert!(cursor.key2 <= timeline.last_key());
            }
        }

        #[test]
        fn prop_looping_never_stops(steps in proptest::collection::vec(1.0f32..800.0, 1..128)) {
            let timeline = single_part_timeline("loop", &[0.0, 250.0, 600.0, 1000.0], true);
            let mut cursor = Cursor::start(&timeline, false);
            for step in steps {
                prop_assert_ne!(cursor.advance(&timeline, step), Some(CursorEvent::Finished));
                prop_assert!(!cursor.stopped);
            }
        }

        #[test]
        fn prop_non_looping_finishes_once(step in 1.0f32..300.0) {
            let timeline = single_part_timeline("once", &[0.0, 300.0, 1000.0], false);
            let mut cursor = Cursor::start(&timeline, false);
            let mut finished = 0;
            for _ in 0..2000 {
                if cursor.advance(&timeline, step) == Some(CursorEvent::Finished) {
                    finished += 1;
                }
            }
            prop_assert_eq!(finished, 1);
            prop_assert!(cursor.stopped);
        }
    }
}
