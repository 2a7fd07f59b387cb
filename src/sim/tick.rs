//! Simulation tick
//!
//! Advances the field by one frame: player, bubbles, collisions, near misses
//! and spawning. Quiz answers and the countdown come in through `quiz`.

use super::collision::{circle_intersects_rect, rect_gap};
use super::escalation::speed_multiplier;
use super::quiz::start_quiz;
use super::rng::RandomSource;
use super::spawn;
use super::state::{BubbleKind, GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::settings::GameSettings;

/// Input held during a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Pointer x on the canvas; overrides the arrow keys while present
    pub pointer_x: Option<f32>,
}

/// Advance the game state by `dt` seconds (clamped to [`MAX_DT`])
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    settings: &GameSettings,
    dt: f32,
    rng: &mut impl RandomSource,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }
    let dt = dt.clamp(0.0, MAX_DT);

    state.elapsed_time += dt;
    state.idle_time += dt;
    state.speed_multiplier = state.speed_multiplier.max(speed_multiplier(state.elapsed_time));

    move_player(state, input, dt);

    if let Some(kind) = move_bubbles(state, dt) {
        handle_collision(state, settings, kind, rng, &mut events);
        return events;
    }

    award_near_misses(state, &mut events);
    state.bubbles.retain(|b| !b.is_offscreen());

    spawn::update(state, settings, dt, rng);
    events
}

/// Pause or resume. Ignored during a quiz and after game over.
pub fn toggle_pause(state: &mut GameState) -> Option<GameEvent> {
    match state.phase {
        GamePhase::Playing => {
            state.phase = GamePhase::Paused;
            log::info!("Paused");
            Some(GameEvent::Paused)
        }
        GamePhase::Paused => {
            state.phase = GamePhase::Playing;
            log::info!("Resumed");
            Some(GameEvent::Resumed)
        }
        GamePhase::QuizActive | GamePhase::GameOver => None,
    }
}

fn move_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let half = PLAYER_SIZE * 0.5;
    let x = match input.pointer_x {
        Some(x) => x,
        None => {
            let dir = input.right as i32 - input.left as i32;
            state.player.x + dir as f32 * PLAYER_SPEED * dt
        }
    };
    state.player.x = x.clamp(half, CANVAS_WIDTH - half);
    state.player.y = state.player.y.clamp(half, CANVAS_HEIGHT - half);
}

/// Move every bubble and stop at the first one touching the player
fn move_bubbles(state: &mut GameState, dt: f32) -> Option<BubbleKind> {
    let player = state.player_rect();
    let speed = state.speed_multiplier;

    for bubble in &mut state.bubbles {
        bubble.pos += bubble.vel * speed * dt;

        // Side walls
        if bubble.pos.x - bubble.radius < 0.0 {
            bubble.pos.x = bubble.radius;
            bubble.vel.x = bubble.vel.x.abs();
        } else if bubble.pos.x + bubble.radius > CANVAS_WIDTH {
            bubble.pos.x = CANVAS_WIDTH - bubble.radius;
            bubble.vel.x = -bubble.vel.x.abs();
        }

        if circle_intersects_rect(bubble.circle(), player) {
            return Some(bubble.kind);
        }
        bubble.closest_gap = bubble.closest_gap.min(rect_gap(bubble.circle(), player));
    }
    None
}

fn handle_collision(
    state: &mut GameState,
    settings: &GameSettings,
    kind: BubbleKind,
    rng: &mut impl RandomSource,
    events: &mut Vec<GameEvent>,
) {
    state.bubbles.clear();
    state.spawner.cancel_pending();
    state.idle_time = 0.0;
    events.push(GameEvent::Collision { kind });

    match kind {
        BubbleKind::Hazard => {
            state.lose_life();
            log::info!("Hazard hit, {} lives left", state.lives);
            if state.lives == 0 {
                events.push(state.end_run());
            }
        }
        BubbleKind::Operator(op) => match start_quiz(state, settings, op, rng) {
            Some(event) => events.push(event),
            None => log::warn!("No {} problem fits the current settings, collision absorbed", op),
        },
    }
}

/// Pay the near-miss bonus for hazards that grazed the player and got past
fn award_near_misses(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player_bottom = state.player_rect().max().y;
    let mut paid = 0;
    for bubble in &mut state.bubbles {
        if bubble.is_hazard()
            && !bubble.grazed
            && bubble.closest_gap <= GRAZE_DISTANCE
            && bubble.pos.y - bubble.radius > player_bottom
        {
            bubble.grazed = true;
            paid += 1;
        }
    }
    for _ in 0..paid {
        state.score += NEAR_MISS_POINTS;
        events.push(GameEvent::NearMiss { points: NEAR_MISS_POINTS });
    }
}
