//! Frame clock
//!
//! Turns the absolute timestamps handed to a frame callback into clamped
//! deltas. A backgrounded tab can deliver a frame seconds after the last
//! one; the simulation never sees more than [`MAX_DT`] in a single step.

use crate::consts::MAX_DT;

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame, clamped to `[0, MAX_DT]`.
    /// The first frame after creation or [`reset`](Self::reset) yields 0.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, MAX_DT)
    }

    /// Forget the last timestamp (after a pause or restart)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1234.0), 0.0);
        assert!((clock.delta(1250.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut clock = FrameClock::new();
        clock.delta(0.0);
        assert_eq!(clock.delta(5000.0), MAX_DT);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = FrameClock::new();
        clock.delta(100.0);
        assert_eq!(clock.delta(50.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        clock.delta(0.0);
        clock.reset();
        assert_eq!(clock.delta(10_000.0), 0.0);
    }
}
