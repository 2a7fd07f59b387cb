//! Difficulty curves
//!
//! Two independent ramps: idle escalation punishes a player who avoids every
//! bubble, and the global ramps make the run harder with elapsed time.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::lerp;
use crate::settings::{EscalationCurve, EscalationSettings, SpawnSettings};

/// Multipliers applied to spawn rate and bubble radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub spawn_multiplier: f32,
    pub size_multiplier: f32,
}

impl Escalation {
    pub const NONE: Escalation = Escalation {
        spawn_multiplier: 1.0,
        size_multiplier: 1.0,
    };
}

impl EscalationCurve {
    /// Remap ramp progress `p` in `[0, 1]`
    pub fn apply(&self, p: f32) -> f32 {
        match self {
            EscalationCurve::Linear => p,
            EscalationCurve::EaseIn => p * p,
            EscalationCurve::EaseOut => 1.0 - (1.0 - p) * (1.0 - p),
        }
    }
}

/// Escalation after `idle_seconds` without a collision
pub fn escalation(idle_seconds: f32, settings: &EscalationSettings) -> Escalation {
    if !settings.enabled || idle_seconds <= settings.idle_start_seconds {
        return Escalation::NONE;
    }
    if idle_seconds >= settings.idle_start_seconds + settings.ramp_seconds {
        return Escalation {
            spawn_multiplier: settings.max_spawn_multiplier,
            size_multiplier: settings.max_size_multiplier,
        };
    }
    let p = ((idle_seconds - settings.idle_start_seconds) / settings.ramp_seconds).min(1.0);
    let t = settings.curve.apply(p);
    Escalation {
        spawn_multiplier: lerp(1.0, settings.max_spawn_multiplier, t),
        size_multiplier: lerp(1.0, settings.max_size_multiplier, t),
    }
}

/// Global motion multiplier: a small step every [`SPEED_STEP_SECS`], capped
pub fn speed_multiplier(elapsed: f32) -> f32 {
    let steps = (elapsed / SPEED_STEP_SECS).floor();
    (1.0 + steps * SPEED_STEP).min(MAX_SPEED_MULTIPLIER)
}

/// Hazard spawn rate, ramping from base to max over [`HAZARD_RAMP_SECS`]
pub fn hazard_bpm(elapsed: f32, spawn: &SpawnSettings) -> f32 {
    let t = (elapsed / HAZARD_RAMP_SECS).clamp(0.0, 1.0);
    lerp(spawn.base_hazard_bpm, spawn.max_hazard_bpm, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn curve() -> impl Strategy<Value = EscalationCurve> {
        prop_oneof![
            Just(EscalationCurve::Linear),
            Just(EscalationCurve::EaseIn),
            Just(EscalationCurve::EaseOut),
        ]
    }

    proptest! {
        #[test]
        fn prop_no_escalation_before_idle_start(
            idle_start in 0.0f32..60.0,
            frac in 0.0f32..=1.0,
            curve in curve(),
        ) {
            let settings = EscalationSettings { idle_start_seconds: idle_start, curve, ..Default::default() };
            prop_assert_eq!(escalation(idle_start * frac, &settings), Escalation::NONE);
        }

        #[test]
        fn prop_full_escalation_after_ramp(
            idle_start in 0.0f32..60.0,
            ramp in 0.1f32..60.0,
            extra in prop_oneof![Just(0.0f32), 0.0f32..100.0],
            max_spawn in 1.0f32..4.0,
            max_size in 1.0f32..3.0,
            curve in curve(),
        ) {
            let settings = EscalationSettings {
                enabled: true,
                idle_start_seconds: idle_start,
                ramp_seconds: ramp,
                max_spawn_multiplier: max_spawn,
                max_size_multiplier: max_size,
                curve,
            };
            let e = escalation(idle_start + ramp + extra, &settings);
            prop_assert_eq!(e.spawn_multiplier, max_spawn);
            prop_assert_eq!(e.size_multiplier, max_size);
        }

        #[test]
        fn prop_escalation_is_monotone(a in 0.0f32..40.0, b in 0.0f32..40.0, curve in curve()) {
            let settings = EscalationSettings { curve, ..Default::default() };
            let (lo, hi) = (a.min(b), a.max(b));
            let e_lo = escalation(lo, &settings);
            let e_hi = escalation(hi, &settings);
            prop_assert!(e_lo.spawn_multiplier <= e_hi.spawn_multiplier + 1e-6);
            prop_assert!(e_lo.size_multiplier <= e_hi.size_multiplier + 1e-6);
        }
    }

    #[test]
    fn test_exact_maxima_at_ramp_end() {
        let settings = EscalationSettings {
            enabled: true,
            idle_start_seconds: 0.1,
            ramp_seconds: 0.9,
            max_spawn_multiplier: 2.0,
            max_size_multiplier: 1.4,
            curve: EscalationCurve::Linear,
        };
        for step in 0..200 {
            let start = step as f32 * 0.1;
            for ramp_step in 1..200 {
                let ramp = ramp_step as f32 * 0.1;
                let s = EscalationSettings { idle_start_seconds: start, ramp_seconds: ramp, ..settings.clone() };
                let e = escalation(start + ramp, &s);
                assert_eq!(e, Escalation { spawn_multiplier: 2.0, size_multiplier: 1.4 });
            }
        }
    }

    #[test]
    fn test_disabled_escalation() {
        let settings = EscalationSettings { enabled: false, ..Default::default() };
        assert_eq!(escalation(1000.0, &settings), Escalation::NONE);
    }

    #[test]
    fn test_curve_midpoints() {
        let settings = EscalationSettings::default();
        // Halfway through the default 10 s ramp
        let linear = escalation(15.0, &settings);
        assert!((linear.spawn_multiplier - 1.5).abs() < 1e-5);
        assert!((linear.size_multiplier - 1.2).abs() < 1e-5);

        let ease_in = escalation(15.0, &EscalationSettings { curve: EscalationCurve::EaseIn, ..settings.clone() });
        assert!((ease_in.spawn_multiplier - 1.25).abs() < 1e-5);

        let ease_out = escalation(15.0, &EscalationSettings { curve: EscalationCurve::EaseOut, ..settings });
        assert!((ease_out.spawn_multiplier - 1.75).abs() < 1e-5);
    }

    #[test]
    fn test_speed_multiplier_steps_and_caps() {
        assert_eq!(speed_multiplier(0.0), 1.0);
        assert_eq!(speed_multiplier(19.9), 1.0);
        assert!((speed_multiplier(20.0) - 1.02).abs() < 1e-6);
        assert!((speed_multiplier(59.0) - 1.04).abs() < 1e-6);
        assert_eq!(speed_multiplier(10_000.0), MAX_SPEED_MULTIPLIER);
    }

    #[test]
    fn test_hazard_bpm_ramp() {
        let spawn = SpawnSettings::default();
        assert_eq!(hazard_bpm(0.0, &spawn), 12.0);
        assert!((hazard_bpm(60.0, &spawn) - 21.0).abs() < 1e-4);
        assert_eq!(hazard_bpm(120.0, &spawn), 30.0);
        assert_eq!(hazard_bpm(500.0, &spawn), 30.0);
    }
}
