//! Game state and core simulation types
//!
//! Everything the loop mutates lives in [`GameState`], so a snapshot of it is
//! a full picture of the run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arith::{Operator, Problem};
use super::collision::{Circle, Rect};
use super::quiz::QuizSession;
use super::spawn::SpawnScheduler;
use crate::consts::*;
use crate::settings::GameSettings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Bubbles fall and spawn
    Playing,
    /// Everything frozen until resumed
    Paused,
    /// Answering questions; motion and spawning suspended
    QuizActive,
    /// Run ended, waiting for restart
    GameOver,
}

/// What a bubble does on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BubbleKind {
    /// Costs a life
    Hazard,
    /// Starts a quiz for this operator
    Operator(Operator),
}

/// Hazard fill colour
pub const HAZARD_COLOR: u32 = 0xef4444;

/// A falling bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub kind: BubbleKind,
    /// Fill colour (0xRRGGBB)
    pub color: u32,
    /// Sim time at spawn, drives the fade-in
    pub born_at: f32,
    /// Near-miss bonus already paid
    pub grazed: bool,
    /// Smallest edge gap to the player seen so far
    pub closest_gap: f32,
}

impl Bubble {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, kind: BubbleKind, born_at: f32) -> Self {
        let color = match kind {
            BubbleKind::Hazard => HAZARD_COLOR,
            BubbleKind::Operator(op) => op.color(),
        };
        Self {
            id,
            pos,
            vel,
            radius,
            kind,
            color,
            born_at,
            grazed: false,
            closest_gap: f32::MAX,
        }
    }

    pub fn is_hazard(&self) -> bool {
        self.kind == BubbleKind::Hazard
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            BubbleKind::Operator(op) => Some(op),
            BubbleKind::Hazard => None,
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Cosmetic opacity, 0 at spawn rising to 1
    pub fn fade_alpha(&self, now: f32) -> f32 {
        ((now - self.born_at) / BUBBLE_FADE_IN_SECS).clamp(0.0, 1.0)
    }

    /// Fully below the bottom edge
    pub fn is_offscreen(&self) -> bool {
        self.pos.y - self.radius > CANVAS_HEIGHT
    }
}

/// Discrete events emitted to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    Collision { kind: BubbleKind },
    QuizStarted { operator: Operator, problems: Vec<Problem> },
    QuizAnswered { correct: bool, points: u32, timed_out: bool },
    QuizCompleted { correct: usize, total: usize, perfect: bool },
    NearMiss { points: u64 },
    Paused,
    Resumed,
    GameOver { final_score: u64, best_streak: u32 },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub lives: u32,
    pub score: u64,
    /// Consecutive correct answers
    pub streak: u32,
    pub best_streak: u32,
    pub phase: GamePhase,
    /// Centre of the player square
    pub player: Vec2,
    pub bubbles: Vec<Bubble>,
    /// Play time in seconds (frozen outside `Playing`)
    pub elapsed_time: f32,
    /// Play time since the last collision
    pub idle_time: f32,
    pub speed_multiplier: f32,
    /// Present iff phase is `QuizActive`
    pub quiz: Option<QuizSession>,
    pub spawner: SpawnScheduler,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, settings: &GameSettings) -> Self {
        Self {
            seed,
            lives: settings.starting_lives,
            score: 0,
            streak: 0,
            best_streak: 0,
            phase: GamePhase::Playing,
            player: Vec2::new(CANVAS_WIDTH * 0.5, PLAYER_Y),
            bubbles: Vec::new(),
            elapsed_time: 0.0,
            idle_time: 0.0,
            speed_multiplier: 1.0,
            quiz: None,
            spawner: SpawnScheduler::default(),
            next_id: 1,
        }
    }

    /// Throw away the run and start over
    pub fn restart(&mut self, seed: u64, settings: &GameSettings) {
        *self = Self::new(seed, settings);
        log::info!("Run restarted with seed {}", seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player_rect(&self) -> Rect {
        Rect::centered(self.player, PLAYER_SIZE)
    }

    pub fn hazard_count(&self) -> usize {
        self.bubbles.iter().filter(|b| b.is_hazard()).count()
    }

    pub fn operator_count(&self) -> usize {
        self.bubbles.len() - self.hazard_count()
    }

    /// Record a correct answer
    pub fn extend_streak(&mut self) {
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
    }

    /// Record a mistake: lose a life and the streak
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.streak = 0;
    }

    /// Enter `GameOver` and report the final result
    pub fn end_run(&mut self) -> GameEvent {
        self.phase = GamePhase::GameOver;
        self.quiz = None;
        log::info!(
            "Game over: score {} best streak {} after {:.1}s",
            self.score,
            self.best_streak,
            self.elapsed_time
        );
        GameEvent::GameOver {
            final_score: self.score,
            best_streak: self.best_streak,
        }
    }

    /// Snapshot for the presentation layer
    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string(self)?)
    }
}
