//! Multi-bubble hazard formations
//!
//! A pattern is planned all at once but spawned over time: each member is
//! queued with its own spawn time and checked against the placement rules
//! again when that time arrives.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::*;

/// No patterns before this much play time
pub const PATTERN_START_SECS: f32 = 15.0;
/// Probability gained per second after the start
pub const PATTERN_CHANCE_PER_SEC: f32 = 0.002;
pub const PATTERN_MAX_CHANCE: f32 = 0.25;
/// Minimum time between two patterns
pub const PATTERN_COOLDOWN_SECS: f32 = 8.0;

const BURST_STAGGER_SECS: f32 = 0.35;
const BURST_SPACING: f32 = 200.0;
const SWEEP_LANES: usize = 5;
const DRIFT_STAGGER_SECS: f32 = 0.4;
const DRIFT_SPACING: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    /// Three hazards across the screen, one after another
    StaggeredBurst,
    /// A row of hazards with one lane left open
    Sweep,
    /// A short stream sliding diagonally
    DiagonalDrift,
}

impl PatternKind {
    pub const ALL: [PatternKind; 3] = [
        PatternKind::StaggeredBurst,
        PatternKind::Sweep,
        PatternKind::DiagonalDrift,
    ];
}

/// Gate shared by all patterns of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternState {
    pub cooldown_until: f32,
}

/// A queued hazard of a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSpawn {
    /// Sim time at which to spawn
    pub at: f32,
    pub x: f32,
    pub vel: Vec2,
    pub pattern: PatternKind,
}

/// Chance that a due hazard spawn becomes a pattern
pub fn pattern_probability(elapsed: f32) -> f32 {
    if elapsed < PATTERN_START_SECS {
        return 0.0;
    }
    ((elapsed - PATTERN_START_SECS) * PATTERN_CHANCE_PER_SEC).min(PATTERN_MAX_CHANCE)
}

impl PatternState {
    pub fn ready(&self, now: f32) -> bool {
        now >= self.cooldown_until
    }

    pub fn fire(&mut self, now: f32) {
        self.cooldown_until = now + PATTERN_COOLDOWN_SECS;
    }
}

/// Lay out the members of a pattern.
///
/// `slots` is the number of hazards that may still appear. Returns an empty
/// plan if the pattern cannot fit.
pub fn plan(
    kind: PatternKind,
    rng: &mut impl RandomSource,
    now: f32,
    radius: f32,
    slots: usize,
) -> Vec<PendingSpawn> {
    match kind {
        PatternKind::StaggeredBurst => plan_burst(rng, now, radius, slots),
        PatternKind::Sweep => plan_sweep(rng, now, radius, slots),
        PatternKind::DiagonalDrift => plan_drift(rng, now, radius, slots),
    }
}

fn plan_burst(rng: &mut impl RandomSource, now: f32, radius: f32, slots: usize) -> Vec<PendingSpawn> {
    let count = slots.min(3);
    if count == 0 {
        return Vec::new();
    }
    let span = BURST_SPACING * 2.0;
    let start = rng.range_f32(radius, CANVAS_WIDTH - radius - span);
    // Left to right or right to left
    let (origin, step) = if rng.chance(0.5) {
        (start, BURST_SPACING)
    } else {
        (start + span, -BURST_SPACING)
    };
    let vy = rng.range_f32(140.0, 180.0);
    (0..count)
        .map(|i| PendingSpawn {
            at: now + i as f32 * BURST_STAGGER_SECS,
            x: origin + i as f32 * step,
            vel: Vec2::new(0.0, vy),
            pattern: PatternKind::StaggeredBurst,
        })
        .collect()
}

fn plan_sweep(rng: &mut impl RandomSource, now: f32, radius: f32, slots: usize) -> Vec<PendingSpawn> {
    if slots < 2 {
        return Vec::new();
    }
    let lane_width = CANVAS_WIDTH / SWEEP_LANES as f32;
    let gap = rng.index(SWEEP_LANES).unwrap_or(0);
    let vy = rng.range_f32(120.0, 160.0);
    (0..SWEEP_LANES)
        .filter(|lane| *lane != gap)
        .take(slots.min(SWEEP_LANES - 1))
        .map(|lane| PendingSpawn {
            at: now,
            x: (lane_width * (lane as f32 + 0.5)).clamp(radius, CANVAS_WIDTH - radius),
            vel: Vec2::new(0.0, vy),
            pattern: PatternKind::Sweep,
        })
        .collect()
}

fn plan_drift(rng: &mut impl RandomSource, now: f32, radius: f32, slots: usize) -> Vec<PendingSpawn> {
    let count = slots.min(rng.range_i32(3, 4) as usize);
    if count == 0 {
        return Vec::new();
    }
    let dir = rng.sign();
    let vx = dir * rng.range_f32(60.0, 100.0);
    let vy = rng.range_f32(130.0, 160.0);
    // Start on the side the stream drifts away from
    let origin = if dir > 0.0 {
        radius + rng.range_f32(0.0, CANVAS_WIDTH * 0.25)
    } else {
        CANVAS_WIDTH - radius - rng.range_f32(0.0, CANVAS_WIDTH * 0.25)
    };
    (0..count)
        .map(|i| PendingSpawn {
            at: now + i as f32 * DRIFT_STAGGER_SECS,
            x: (origin + dir * i as f32 * DRIFT_SPACING).clamp(radius, CANVAS_WIDTH - radius),
            vel: Vec2::new(vx, vy),
            pattern: PatternKind::DiagonalDrift,
        })
        .collect()
}
