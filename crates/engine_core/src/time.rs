//! Fixed-step time management for the game loop.

use std::time::Duration;

/// Default simulation tick in seconds (60 Hz).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Upper bound on ticks run for a single frame, so a long stall cannot spiral.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

/// Converts variable frame deltas into a whole number of fixed simulation ticks.
#[derive(Debug)]
pub struct FixedStep {
    /// Length of one tick.
    step: Duration,
    /// Frame time not yet consumed by a tick.
    accumulator: Duration,
    /// Ticks run since creation.
    tick_count: u64,
    /// Total simulated time.
    simulated: Duration,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl FixedStep {
    /// Create a stepper running at `hz` ticks per second.
    pub fn new(hz: f64) -> Self {
        Self {
            step: Duration::from_secs_f64(1.0 / hz.max(1.0)),
            accumulator: Duration::ZERO,
            tick_count: 0,
            simulated: Duration::ZERO,
        }
    }

    /// Feed a frame delta and return how many ticks to simulate this frame.
    pub fn advance(&mut self, frame_delta: Duration) -> u32 {
        self.accumulator += frame_delta;
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if self.accumulator >= self.step {
            log::warn!(
                "Dropping {:.1} ms of simulation after a long frame",
                self.accumulator.as_secs_f64() * 1000.0
            );
            self.accumulator = Duration::ZERO;
        }
        self.tick_count += u64::from(ticks);
        self.simulated += self.step * ticks;
        ticks
    }

    /// Tick length in seconds, the `dt` handed to every fixed update.
    pub fn dt(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Ticks run since creation.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total simulated time in seconds.
    pub fn simulated_seconds(&self) -> f32 {
        self.simulated.as_secs_f32()
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_frames() {
        let mut step = FixedStep::new(60.0);
        assert_eq!(step.advance(Duration::from_millis(10)), 0);
        assert_eq!(step.advance(Duration::from_millis(10)), 1);
        assert_eq!(step.tick_count(), 1);
        assert!(step.alpha() > 0.0 && step.alpha() < 1.0);
    }

    #[test]
    fn caps_catch_up_after_stall() {
        let mut step = FixedStep::new(60.0);
        assert_eq!(step.advance(Duration::from_secs(2)), MAX_TICKS_PER_FRAME);
        assert_eq!(step.alpha(), 0.0);
    }

    #[test]
    fn dt_matches_fixed_constant() {
        assert!((FixedStep::default().dt() - FIXED_DT).abs() < 1e-7);
    }
}
