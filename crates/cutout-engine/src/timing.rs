//! Frame timing.
//!
//! Converts display frame deltas into a whole number of fixed animation
//! ticks, carrying the remainder to the next frame.

/// Upper bound on ticks run for a single frame.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Fixed-step accumulator.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Tick length in milliseconds
    step_ms: f32,
    /// Unconsumed time
    accumulator: f32,
    /// Ticks run so far
    total_ticks: u64,
}

impl FrameClock {
    /// Create a clock ticking every `step_ms` milliseconds.
    #[must_use]
    pub fn new(step_ms: f32) -> Self {
        Self {
            step_ms: step_ms.max(0.001),
            accumulator: 0.0,
            total_ticks: 0,
        }
    }

    /// Tick length in milliseconds.
    #[must_use]
    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    /// Ticks run since creation.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Adds a frame's worth of time and returns how many ticks to run.
    pub fn accumulate(&mut self, frame_ms: f32) -> u32 {
        self.accumulator += frame_ms.max(0.0);
        let mut count = 0;

        while self.accumulator >= self.step_ms && count < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.step_ms;
            count += 1;
        }

        // Still behind after the cap: drop the backlog
        if self.accumulator > self.step_ms * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_ticks += u64::from(count);
        count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(cutout_anim::DEFAULT_FIXED_STEP_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = FrameClock::default();
        assert!((clock.step_ms() - 1000.0 / 60.0).abs() < 0.001);
        assert_eq!(clock.total_ticks(), 0);
    }

    #[test]
    fn test_slow_display_runs_extra_ticks() {
        let mut clock = FrameClock::new(10.0);
        // 25ms frames at a 10ms step: 2, 3, 2, 3 ticks
        let ticks: Vec<u32> = (0..4).map(|_| clock.accumulate(25.0)).collect();
        assert_eq!(ticks, vec![2, 3, 2, 3]);
        assert_eq!(clock.total_ticks(), 10);
    }

    #[test]
    fn test_fast_display_skips_ticks() {
        let mut clock = FrameClock::new(20.0);
        let ticks: Vec<u32> = (0..4).map(|_| clock.accumulate(10.0)).collect();
        assert_eq!(ticks, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_accumulate_spiral_prevention() {
        let mut clock = FrameClock::new(1000.0 / 60.0);

        // Simulate huge lag spike
        let updates = clock.accumulate(1000.0);
        assert_eq!(updates, MAX_TICKS_PER_FRAME);

        // The backlog is dropped rather than replayed
        assert!(clock.accumulate(0.0) <= 1);
    }
}
