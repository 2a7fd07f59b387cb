//! Spawn scheduling
//!
//! Decides when, what and where bubbles appear. All timers run on the
//! simulation clock and live in [`SpawnScheduler`] inside the game state, so
//! replaying the same inputs with the same seed spawns the same bubbles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::escalation::{escalation, hazard_bpm};
use super::pattern::{self, PatternKind, PatternState, PendingSpawn};
use super::placement::can_place;
use super::rng::RandomSource;
use super::state::{Bubble, BubbleKind, GameState};
use crate::consts::*;
use crate::settings::GameSettings;

/// Spawn timers and pattern bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub hazard_timer: f32,
    pub op_timer: f32,
    pub guaranteed_timer: f32,
    /// Interval until the next guaranteed operator bubble
    pub next_guaranteed_in: f32,
    /// Sim time of the last quiz trigger
    pub last_quiz_at: Option<f32>,
    pub pattern: PatternState,
    /// Pattern members waiting for their spawn time
    pub pending: Vec<PendingSpawn>,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self {
            hazard_timer: 0.0,
            op_timer: 0.0,
            guaranteed_timer: 0.0,
            next_guaranteed_in: (GUARANTEED_MIN_SECS + GUARANTEED_MAX_SECS) * 0.5,
            last_quiz_at: None,
            pattern: PatternState::default(),
            pending: Vec::new(),
        }
    }
}

impl SpawnScheduler {
    /// Remember a quiz trigger for the operator cooldown
    pub fn note_quiz(&mut self, now: f32) {
        self.last_quiz_at = Some(now);
    }

    /// Drop queued pattern members (all bubbles were just cleared)
    pub fn cancel_pending(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Dropping {} queued pattern bubbles", self.pending.len());
            self.pending.clear();
        }
    }

    fn operator_cooldown_over(&self, now: f32, settings: &GameSettings) -> bool {
        match self.last_quiz_at {
            Some(at) => (now - at) * 1000.0 >= settings.spawn.quiz_cooldown_ms,
            None => true,
        }
    }
}

/// How a spawn picks its x coordinate
#[derive(Debug, Clone, Copy)]
enum Column {
    Uniform,
    /// Mean of two uniform draws over the middle half
    CenterBiased,
}

impl Column {
    fn pick(&self, rng: &mut impl RandomSource, radius: f32) -> f32 {
        match self {
            Column::Uniform => rng.range_f32(radius, CANVAS_WIDTH - radius),
            Column::CenterBiased => {
                let (lo, hi) = (CANVAS_WIDTH * 0.25, CANVAS_WIDTH * 0.75);
                (rng.range_f32(lo, hi) + rng.range_f32(lo, hi)) * 0.5
            }
        }
    }
}

/// Hazards fall faster and swing wider than operator bubbles
fn initial_velocity(rng: &mut impl RandomSource, kind: BubbleKind) -> Vec2 {
    match kind {
        BubbleKind::Hazard => Vec2::new(rng.range_f32(-60.0, 60.0), rng.range_f32(120.0, 200.0)),
        BubbleKind::Operator(_) => Vec2::new(rng.range_f32(-20.0, 20.0), rng.range_f32(80.0, 120.0)),
    }
}

/// Whether one more bubble of this kind fits under the caps
fn has_room(state: &GameState, settings: &GameSettings, hazard: bool) -> bool {
    if state.bubbles.len() >= settings.max_active_bubbles {
        return false;
    }
    if hazard {
        state.hazard_count() < settings.spawn.max_hazards
    } else {
        state.operator_count() < settings.spawn.max_ops
    }
}

/// Hazard slots left under both caps
fn hazard_slots(state: &GameState, settings: &GameSettings) -> usize {
    let by_kind = settings.spawn.max_hazards.saturating_sub(state.hazard_count());
    let total = settings.max_active_bubbles.saturating_sub(state.bubbles.len());
    by_kind.min(total)
}

fn push_bubble(state: &mut GameState, pos: Vec2, vel: Vec2, radius: f32, kind: BubbleKind) -> u32 {
    let id = state.next_entity_id();
    state
        .bubbles
        .push(Bubble::new(id, pos, vel, radius, kind, state.elapsed_time));
    id
}

/// Try a few columns; place the bubble in the first that passes placement
fn try_spawn(
    state: &mut GameState,
    settings: &GameSettings,
    rng: &mut impl RandomSource,
    kind: BubbleKind,
    radius: f32,
    column: Column,
) -> Option<u32> {
    if !has_room(state, settings, kind == BubbleKind::Hazard) {
        return None;
    }
    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = Vec2::new(column.pick(rng, radius), -radius);
        if can_place(candidate, &state.bubbles, state.player, &settings.spawn) {
            let vel = initial_velocity(rng, kind);
            let id = push_bubble(state, candidate, vel, radius, kind);
            log::debug!("Spawned {:?} #{} at x={:.0}", kind, id, candidate.x);
            return Some(id);
        }
    }
    log::debug!("No valid column for {:?} this tick", kind);
    None
}

/// Spawn an operator bubble for a random enabled operator
fn try_spawn_operator(
    state: &mut GameState,
    settings: &GameSettings,
    rng: &mut impl RandomSource,
    radius: f32,
    column: Column,
) -> Option<u32> {
    let enabled = settings.operators.enabled();
    let op = enabled[rng.index(enabled.len())?];
    try_spawn(state, settings, rng, BubbleKind::Operator(op), radius, column)
}

/// Spawn the pattern members whose time has come
fn release_pending(state: &mut GameState, settings: &GameSettings, radius: f32) {
    let now = state.elapsed_time;
    let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.spawner.pending)
        .into_iter()
        .partition(|p| p.at <= now);
    state.spawner.pending = waiting;

    for member in due {
        let pos = Vec2::new(member.x, -radius);
        if has_room(state, settings, true)
            && can_place(pos, &state.bubbles, state.player, &settings.spawn)
        {
            push_bubble(state, pos, member.vel, radius, BubbleKind::Hazard);
        } else {
            log::debug!("{:?} member at x={:.0} no longer fits", member.pattern, member.x);
        }
    }
}

/// Roll for a pattern in place of a normal hazard. Returns true if one fired.
fn try_pattern(
    state: &mut GameState,
    settings: &GameSettings,
    rng: &mut impl RandomSource,
    radius: f32,
) -> bool {
    let now = state.elapsed_time;
    if !state.spawner.pattern.ready(now) || !rng.chance(pattern::pattern_probability(now) as f64) {
        return false;
    }
    let Some(idx) = rng.index(PatternKind::ALL.len()) else {
        return false;
    };
    let kind = PatternKind::ALL[idx];
    let members = pattern::plan(kind, rng, now, radius, hazard_slots(state, settings));
    if members.is_empty() {
        return false;
    }
    log::debug!("Pattern {:?} with {} bubbles at t={:.1}", kind, members.len(), now);
    state.spawner.pattern.fire(now);
    state.spawner.pending.extend(members);
    true
}

/// Run the scheduler for one `Playing` tick
pub fn update(state: &mut GameState, settings: &GameSettings, dt: f32, rng: &mut impl RandomSource) {
    let now = state.elapsed_time;
    let esc = escalation(state.idle_time, &settings.escalation);
    let radius = BUBBLE_RADIUS * esc.size_multiplier;

    release_pending(state, settings, radius);

    // Hazards
    let hazard_interval = 60.0 / (hazard_bpm(now, &settings.spawn) * esc.spawn_multiplier);
    state.spawner.hazard_timer += dt;
    if state.spawner.hazard_timer >= hazard_interval {
        state.spawner.hazard_timer = 0.0;
        if !try_pattern(state, settings, rng, radius) {
            try_spawn(state, settings, rng, BubbleKind::Hazard, radius, Column::Uniform);
        }
    }

    let ops_allowed = state.spawner.operator_cooldown_over(now, settings);

    // Scheduled operator bubbles
    let op_interval = 60.0 / (settings.spawn.op_bpm * esc.spawn_multiplier);
    state.spawner.op_timer += dt;
    if state.spawner.op_timer >= op_interval {
        state.spawner.op_timer = 0.0;
        if ops_allowed {
            try_spawn_operator(state, settings, rng, radius, Column::Uniform);
        }
    }

    // Guaranteed operator bubble; retried every tick until it lands
    state.spawner.guaranteed_timer += dt;
    if ops_allowed && state.spawner.guaranteed_timer >= state.spawner.next_guaranteed_in {
        if try_spawn_operator(state, settings, rng, radius, Column::CenterBiased).is_some() {
            state.spawner.guaranteed_timer = 0.0;
            state.spawner.next_guaranteed_in =
                rng.range_f32(GUARANTEED_MIN_SECS, GUARANTEED_MAX_SECS);
        }
    }
}
