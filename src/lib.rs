//! Math Dodge - dodge falling bubbles, answer arithmetic when you hit one
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, spawning, quizzes, game state)
//! - `settings`: Canonical game configuration
//! - `platform`: Frame clock, session driver and browser bindings
//! - `highscores`: Leaderboard fed from game-over events

pub mod error;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::Error;
pub use highscores::HighScores;
pub use settings::{GameSettings, Preset};

/// Game configuration constants
pub mod consts {
    /// Logical canvas size (pixels)
    pub const CANVAS_WIDTH: f32 = 960.0;
    pub const CANVAS_HEIGHT: f32 = 540.0;

    /// Largest step a single tick may integrate (33 ms)
    pub const MAX_DT: f32 = 0.033;
    /// Period of the quiz countdown callback (seconds)
    pub const QUIZ_TICK_SECS: f32 = 0.1;

    /// Player avatar - a square riding near the bottom edge
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 300.0; // pixels per second
    pub const PLAYER_Y: f32 = CANVAS_HEIGHT - 50.0;
    pub const STARTING_LIVES: u32 = 3;

    /// Base bubble radius before escalation scaling
    pub const BUBBLE_RADIUS: f32 = 25.0;
    /// Cosmetic fade-in after spawning
    pub const BUBBLE_FADE_IN_SECS: f32 = 0.4;

    /// Global speed ramp: +2% every 20 seconds, capped at 1.5x
    pub const SPEED_STEP_SECS: f32 = 20.0;
    pub const SPEED_STEP: f32 = 0.02;
    pub const MAX_SPEED_MULTIPLIER: f32 = 1.5;

    /// Hazard BPM reaches its maximum after this much play time
    pub const HAZARD_RAMP_SECS: f32 = 120.0;
    /// Candidate positions tried per spawn before giving up
    pub const SPAWN_ATTEMPTS: usize = 10;
    /// Guaranteed operator bubble interval (seconds)
    pub const GUARANTEED_MIN_SECS: f32 = 8.0;
    pub const GUARANTEED_MAX_SECS: f32 = 12.0;

    /// Near-miss credit for hazards passing close by
    pub const GRAZE_DISTANCE: f32 = 12.0;
    pub const NEAR_MISS_POINTS: u64 = 5;
}

/// Linear interpolation that lands exactly on `a` at t=0 and `b` at t=1
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_exact() {
        assert_eq!(lerp(1.0, 1.4, 0.0), 1.0);
        assert_eq!(lerp(1.0, 1.4, 1.0), 1.4);
        assert!((lerp(0.0, 100.0, 0.25) - 25.0).abs() < 1e-4);
    }
}
