use std::time::Duration;

use stagehand_core::FrameConfig;

/// Fixed-rate tick accumulator with a per-frame cap (anti spiral-of-death).
#[derive(Debug, Clone)]
pub struct FixedStep {
    tick_dt: Duration,
    max_ticks_per_frame: u32,
    max_dt: Duration,
    accumulator: Duration,
}

impl FixedStep {
    pub fn new(tick_hz: u32, max_ticks_per_frame: u32, max_dt: Duration) -> Self {
        let hz = u64::from(tick_hz.max(1));
        Self {
            tick_dt: Duration::from_nanos(1_000_000_000 / hz),
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            max_dt: max_dt.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
        }
    }

    pub fn from_config(frame: &FrameConfig) -> Self {
        Self::new(
            frame.tick_hz,
            frame.max_ticks_per_frame,
            Duration::from_millis(u64::from(frame.max_dt_ms)),
        )
    }

    #[inline]
    pub fn tick_dt(&self) -> Duration {
        self.tick_dt
    }

    /// Feed one frame of real time; returns how many ticks to run now.
    pub fn advance(&mut self, raw_dt: Duration) -> u32 {
        self.accumulator += raw_dt.min(self.max_dt);

        let mut ticks = 0;
        while self.accumulator >= self.tick_dt {
            if ticks >= self.max_ticks_per_frame {
                self.accumulator = Duration::ZERO;
                log::warn!(target: "engine", "tick cap reached (spiral prevented)");
                break;
            }
            self.accumulator -= self.tick_dt;
            ticks += 1;
        }
        ticks
    }

    /// Fraction of a tick left in the accumulator, for interpolation.
    pub fn alpha(&self) -> f32 {
        (self.accumulator.as_secs_f32() / self.tick_dt.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_whole_ticks_and_keeps_remainder() {
        let mut clock = FixedStep::new(100, 8, Duration::from_millis(250));
        assert_eq!(clock.tick_dt(), Duration::from_millis(10));

        assert_eq!(clock.advance(Duration::from_millis(25)), 2);
        assert!((clock.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(clock.advance(Duration::from_millis(5)), 1);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = FixedStep::new(100, 4, Duration::from_millis(250));
        assert_eq!(clock.advance(Duration::from_secs(5)), 4);
        assert_eq!(clock.alpha(), 0.0);
    }
}
