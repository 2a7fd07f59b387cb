//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulation clock only (no wall time)
//! - Injected RNG only
//! - No rendering, storage or platform dependencies

pub mod arith;
pub mod collision;
pub mod escalation;
pub mod pattern;
pub mod placement;
pub mod quiz;
pub mod rng;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use arith::{Operator, OperandRange, Problem, generate, generate_from_settings};
pub use collision::{Circle, Rect, circle_intersects_rect};
pub use escalation::{Escalation, escalation};
pub use pattern::{PatternKind, PatternState};
pub use placement::can_place;
pub use quiz::{QuizSession, advance_quiz_clock, close_quiz, submit_answer};
pub use rng::RandomSource;
pub use scoring::speed_score;
pub use spawn::SpawnScheduler;
pub use state::{Bubble, BubbleKind, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick, toggle_pause};
