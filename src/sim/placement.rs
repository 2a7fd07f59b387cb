//! Spawn placement rules
//!
//! A candidate spawn point is refused when it would crowd an existing bubble
//! or drop straight onto the player's column. Each bubble is dodgeable alone;
//! these gaps keep groups of them from walling off every lane.

use glam::Vec2;

use super::state::Bubble;
use crate::settings::SpawnSettings;

/// True if a bubble may spawn at `candidate`
pub fn can_place(candidate: Vec2, existing: &[Bubble], player: Vec2, spawn: &SpawnSettings) -> bool {
    if (player.x - candidate.x).abs() < spawn.min_player_x_gap_px {
        return false;
    }
    existing.iter().all(|b| {
        let dx = (b.pos.x - candidate.x).abs();
        let dy = (b.pos.y - candidate.y).abs();
        let too_close = dx < spawn.min_xy_gap_px && dy < spawn.min_xy_gap_px;
        let same_row = dy < spawn.row_band_px && dx < spawn.min_row_gap_px;
        !too_close && !same_row
    })
}
