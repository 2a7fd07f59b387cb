//! Answer scoring
//!
//! Fast answers earn a bonus. Time is cut into buckets so that answers a few
//! hundred milliseconds apart score the same.

use crate::lerp;
use crate::settings::ScoringSettings;

/// Points for a correct answer given after `time_used` of `time_limit` seconds
pub fn speed_score(time_used: f32, time_limit: f32, scoring: &ScoringSettings) -> u32 {
    let buckets = (time_used.max(0.0) / scoring.bucket_seconds).floor();
    let max_buckets = (time_limit / scoring.bucket_seconds).floor().max(1.0);
    let ratio = (1.0 - buckets / max_buckets).clamp(0.0, 1.0);
    let bonus_pct = lerp(
        scoring.slow_bonus_pct_at_timeout,
        scoring.fast_bonus_pct_at_zero,
        ratio,
    );
    let points = scoring.base_points as f32 * (1.0 + bonus_pct / 100.0);
    points.round().max(0.0) as u32
}
