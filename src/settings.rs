//! Game settings
//!
//! One canonical shape for everything the simulation reads. JSON uses the
//! camelCase names of the web settings page, missing fields fall back to
//! defaults, and [`GameSettings::sanitized`] repairs out-of-range values
//! before the simulation ever sees them.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sim::arith::{OperandRange, Operator};

/// Range and toggle for one operator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperatorSettings {
    pub enabled: bool,
    pub min_a: i32,
    pub max_a: i32,
    pub min_b: i32,
    pub max_b: i32,
    /// Only meaningful for subtraction
    pub allow_negative: bool,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self::with_ranges(1, 10, 1, 10)
    }
}

impl OperatorSettings {
    pub fn with_ranges(min_a: i32, max_a: i32, min_b: i32, max_b: i32) -> Self {
        Self {
            enabled: true,
            min_a,
            max_a,
            min_b,
            max_b,
            allow_negative: false,
        }
    }

    pub fn range_a(&self) -> OperandRange {
        OperandRange::new(self.min_a, self.max_a)
    }

    pub fn range_b(&self) -> OperandRange {
        OperandRange::new(self.min_b, self.max_b)
    }

    fn sanitize(&mut self, lo: i32, hi: i32) {
        (self.min_a, self.max_a) = sanitize_range(self.min_a, self.max_a, lo, hi);
        (self.min_b, self.max_b) = sanitize_range(self.min_b, self.max_b, lo, hi);
    }
}

/// Swap inverted bounds, then clamp both ends into `[lo, hi]`
fn sanitize_range(min: i32, max: i32, lo: i32, hi: i32) -> (i32, i32) {
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    (min.clamp(lo, hi), max.clamp(lo, hi))
}

/// Per-operator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorTable {
    pub addition: OperatorSettings,
    pub subtraction: OperatorSettings,
    pub multiplication: OperatorSettings,
    pub division: OperatorSettings,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self {
            addition: OperatorSettings::with_ranges(1, 20, 1, 20),
            subtraction: OperatorSettings::with_ranges(1, 20, 1, 20),
            multiplication: OperatorSettings::with_ranges(1, 10, 1, 10),
            division: OperatorSettings::with_ranges(1, 10, 1, 10),
        }
    }
}

impl OperatorTable {
    pub fn get(&self, op: Operator) -> &OperatorSettings {
        match op {
            Operator::Add => &self.addition,
            Operator::Sub => &self.subtraction,
            Operator::Mul => &self.multiplication,
            Operator::Div => &self.division,
        }
    }

    pub fn get_mut(&mut self, op: Operator) -> &mut OperatorSettings {
        match op {
            Operator::Add => &mut self.addition,
            Operator::Sub => &mut self.subtraction,
            Operator::Mul => &mut self.multiplication,
            Operator::Div => &mut self.division,
        }
    }

    /// Enabled operators in canonical order (+, -, ×, ÷)
    pub fn enabled(&self) -> Vec<Operator> {
        Operator::ALL
            .into_iter()
            .filter(|op| self.get(*op).enabled)
            .collect()
    }
}

/// Spawn tuning for the scheduler and the placement validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    #[serde(rename = "baseHazardBPM")]
    pub base_hazard_bpm: f32,
    #[serde(rename = "maxHazardBPM")]
    pub max_hazard_bpm: f32,
    #[serde(rename = "opBPM")]
    pub op_bpm: f32,
    #[serde(rename = "maxHazards")]
    pub max_hazards: usize,
    #[serde(rename = "maxOps")]
    pub max_ops: usize,
    #[serde(rename = "minXYGapPx")]
    pub min_xy_gap_px: f32,
    #[serde(rename = "minRowGapPx")]
    pub min_row_gap_px: f32,
    #[serde(rename = "rowBandPx")]
    pub row_band_px: f32,
    #[serde(rename = "minPlayerXGapPx")]
    pub min_player_x_gap_px: f32,
    #[serde(rename = "quizCooldownMs")]
    pub quiz_cooldown_ms: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            base_hazard_bpm: 12.0,
            max_hazard_bpm: 30.0,
            op_bpm: 15.0,
            max_hazards: 3,
            max_ops: 4,
            min_xy_gap_px: 80.0,
            min_row_gap_px: 120.0,
            row_band_px: 60.0,
            min_player_x_gap_px: 100.0,
            quiz_cooldown_ms: 3000.0,
        }
    }
}

/// Shape of the idle escalation ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscalationCurve {
    #[default]
    Linear,
    /// Slow start (p²)
    EaseIn,
    /// Fast start (1 - (1-p)²)
    EaseOut,
}

/// Anti-parking difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscalationSettings {
    pub enabled: bool,
    /// No-collision time before the ramp starts
    pub idle_start_seconds: f32,
    /// Time from ramp start to full escalation
    pub ramp_seconds: f32,
    /// Cap on the spawn-rate multiplier (2.0 = 200%)
    pub max_spawn_multiplier: f32,
    /// Cap on the radius multiplier (1.4 = +40%)
    pub max_size_multiplier: f32,
    pub curve: EscalationCurve,
}

impl Default for EscalationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_start_seconds: 10.0,
            ramp_seconds: 10.0,
            max_spawn_multiplier: 2.0,
            max_size_multiplier: 1.4,
            curve: EscalationCurve::Linear,
        }
    }
}

/// Speed-based answer scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringSettings {
    pub base_points: u32,
    /// Width of one scoring tier
    pub bucket_seconds: f32,
    /// Bonus percent for an instant answer
    pub fast_bonus_pct_at_zero: f32,
    /// Bonus percent for an answer at the last moment
    pub slow_bonus_pct_at_timeout: f32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            base_points: 100,
            bucket_seconds: 2.0,
            fast_bonus_pct_at_zero: 100.0,
            slow_bonus_pct_at_timeout: 0.0,
        }
    }
}

/// Canonical game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub operators: OperatorTable,
    pub questions_per_collision: u32,
    #[serde(alias = "secondsPerQuestion")]
    pub question_time_limit_seconds: f32,
    /// Legacy single spawn rate; feeds `spawn.op_bpm` when that is unset
    pub bubbles_per_minute: f32,
    /// Hard cap on bubbles of any kind on screen
    pub max_active_bubbles: usize,
    pub starting_lives: u32,
    /// A timed-out question ends the quiz immediately
    pub fail_fast: bool,
    pub spawn: SpawnSettings,
    pub escalation: EscalationSettings,
    pub scoring: ScoringSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            operators: OperatorTable::default(),
            questions_per_collision: 3,
            question_time_limit_seconds: 15.0,
            bubbles_per_minute: 30.0,
            max_active_bubbles: 15,
            starting_lives: crate::consts::STARTING_LIVES,
            fail_fast: false,
            spawn: SpawnSettings::default(),
            escalation: EscalationSettings::default(),
            scoring: ScoringSettings::default(),
        }
    }
}

impl GameSettings {
    /// Clamp every field into the range the simulation supports
    pub fn sanitized(mut self) -> Self {
        self.operators.addition.sanitize(0, 100);
        self.operators.subtraction.sanitize(0, 100);
        self.operators.multiplication.sanitize(0, 20);
        // Divisors and quotients are never zero
        self.operators.division.sanitize(1, 20);

        self.questions_per_collision = self.questions_per_collision.clamp(1, 10);
        self.question_time_limit_seconds = self.question_time_limit_seconds.clamp(5.0, 30.0);
        self.starting_lives = self.starting_lives.clamp(1, 9);

        let spawn = &mut self.spawn;
        if spawn.op_bpm <= 0.0 {
            spawn.op_bpm = self.bubbles_per_minute;
        }
        spawn.base_hazard_bpm = spawn.base_hazard_bpm.max(0.1);
        spawn.max_hazard_bpm = spawn.max_hazard_bpm.max(spawn.base_hazard_bpm);
        spawn.op_bpm = spawn.op_bpm.max(0.1);
        spawn.min_xy_gap_px = spawn.min_xy_gap_px.max(0.0);
        spawn.min_row_gap_px = spawn.min_row_gap_px.max(0.0);
        spawn.row_band_px = spawn.row_band_px.max(0.0);
        spawn.min_player_x_gap_px = spawn.min_player_x_gap_px.max(0.0);
        spawn.quiz_cooldown_ms = spawn.quiz_cooldown_ms.max(0.0);

        let esc = &mut self.escalation;
        esc.idle_start_seconds = esc.idle_start_seconds.max(0.0);
        esc.ramp_seconds = esc.ramp_seconds.max(0.1);
        esc.max_spawn_multiplier = esc.max_spawn_multiplier.max(1.0);
        esc.max_size_multiplier = esc.max_size_multiplier.max(1.0);

        self.scoring.bucket_seconds = self.scoring.bucket_seconds.max(0.1);

        self
    }

    /// Parse settings JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let settings: GameSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the operator mix with a practice preset
    pub fn apply_preset(&mut self, preset: Preset) {
        for op in Operator::ALL {
            self.operators.get_mut(op).enabled = false;
        }
        let (min_a, max_a, min_b, max_b) = preset.multiplication_ranges();
        let mul = &mut self.operators.multiplication;
        mul.enabled = true;
        mul.min_a = min_a;
        mul.max_a = max_a;
        mul.min_b = min_b;
        mul.max_b = max_b;
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mathDodgeSettings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Stored settings rejected: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: impl AsRef<std::path::Path>) -> Result<(), Error> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}

/// Times-table practice presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    #[serde(rename = "7_table")]
    SevenTable,
    #[serde(rename = "8_table")]
    EightTable,
    #[serde(rename = "9_table")]
    NineTable,
    #[serde(rename = "warmup_2_5")]
    Warmup2To5,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::SevenTable => "7_table",
            Preset::EightTable => "8_table",
            Preset::NineTable => "9_table",
            Preset::Warmup2To5 => "warmup_2_5",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "7_table" | "7" => Some(Preset::SevenTable),
            "8_table" | "8" => Some(Preset::EightTable),
            "9_table" | "9" => Some(Preset::NineTable),
            "warmup_2_5" | "warmup" => Some(Preset::Warmup2To5),
            _ => None,
        }
    }

    /// (min_a, max_a, min_b, max_b) for multiplication
    fn multiplication_ranges(&self) -> (i32, i32, i32, i32) {
        match self {
            Preset::SevenTable => (7, 7, 1, 12),
            Preset::EightTable => (8, 8, 1, 12),
            Preset::NineTable => (9, 9, 1, 12),
            Preset::Warmup2To5 => (2, 5, 2, 5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let json = r#"{
            "operators": { "division": { "enabled": false } },
            "questionsPerCollision": 5,
            "spawn": { "maxHazards": 6, "minXYGapPx": 50 }
        }"#;
        let settings = GameSettings::from_json(json).unwrap();
        assert_eq!(settings.questions_per_collision, 5);
        assert_eq!(settings.spawn.max_hazards, 6);
        assert_eq!(settings.spawn.min_xy_gap_px, 50.0);
        // Untouched fields keep their defaults
        assert_eq!(settings.spawn.min_row_gap_px, 120.0);
        assert!(settings.operators.addition.enabled);
        assert!(!settings.operators.division.enabled);
        assert_eq!(settings.escalation, EscalationSettings::default());
    }

    #[test]
    fn test_legacy_seconds_per_question_alias() {
        let settings = GameSettings::from_json(r#"{ "secondsPerQuestion": 20 }"#).unwrap();
        assert_eq!(settings.question_time_limit_seconds, 20.0);
    }

    #[test]
    fn test_sanitize_swaps_and_clamps() {
        let mut settings = GameSettings::default();
        settings.operators.addition = OperatorSettings::with_ranges(10, 1, 200, -5);
        settings.operators.division = OperatorSettings::with_ranges(0, 30, 0, 4);
        settings.question_time_limit_seconds = 45.0;
        settings.questions_per_collision = 0;

        let s = settings.sanitized();
        assert_eq!((s.operators.addition.min_a, s.operators.addition.max_a), (1, 10));
        assert_eq!((s.operators.addition.min_b, s.operators.addition.max_b), (0, 100));
        assert_eq!((s.operators.division.min_a, s.operators.division.max_a), (1, 20));
        assert_eq!((s.operators.division.min_b, s.operators.division.max_b), (1, 4));
        assert_eq!(s.question_time_limit_seconds, 30.0);
        assert_eq!(s.questions_per_collision, 1);
    }

    #[test]
    fn test_sanitize_keeps_all_disabled() {
        let mut settings = GameSettings::default();
        for op in Operator::ALL {
            settings.operators.get_mut(op).enabled = false;
        }
        let s = settings.sanitized();
        assert!(s.operators.enabled().is_empty());
    }

    #[test]
    fn test_curve_names() {
        let settings =
            GameSettings::from_json(r#"{ "escalation": { "curve": "easeOut" } }"#).unwrap();
        assert_eq!(settings.escalation.curve, EscalationCurve::EaseOut);
        assert!(GameSettings::from_json(r#"{ "escalation": { "curve": "wobbly" } }"#).is_err());
    }

    #[test]
    fn test_legacy_bpm_feeds_op_rate() {
        let settings =
            GameSettings::from_json(r#"{ "bubblesPerMinute": 24, "spawn": { "opBPM": 0 } }"#)
                .unwrap();
        assert_eq!(settings.spawn.op_bpm, 24.0);
    }

    #[test]
    fn test_apply_preset() {
        let mut settings = GameSettings::default();
        settings.apply_preset(Preset::SevenTable);
        assert_eq!(settings.operators.enabled(), vec![Operator::Mul]);
        let mul = settings.operators.multiplication;
        assert_eq!((mul.min_a, mul.max_a, mul.min_b, mul.max_b), (7, 7, 1, 12));
        assert_eq!(Preset::from_name("warmup"), Some(Preset::Warmup2To5));
        assert_eq!(Preset::from_name("nope"), None);
    }

    #[test]
    fn test_json_roundtrip_keeps_wire_names() {
        let json = GameSettings::default().to_json().unwrap();
        assert!(json.contains("\"baseHazardBPM\""));
        assert!(json.contains("\"minXYGapPx\""));
        assert!(json.contains("\"questionTimeLimitSeconds\""));
    }
}
