//! Difficulty scaling by player count
//!
//! Table-driven and stateless. Designers tune fire rates in shots per second
//! per eligible shooter; the per-tick probability is derived from the
//! configured tick rate.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Per-player-count tuning row
#[derive(Debug, Clone, Copy)]
struct ScalingRow {
    cols: u32,
    rows: u32,
    /// Multiplier on the configured formation move interval
    move_interval_scale: f64,
    /// Shots per second for each eligible alien
    shots_per_second: f64,
}

/// Rows for 1, 2, 3 and 4 players
const SCALING_TABLE: [ScalingRow; 4] = [
    ScalingRow {
        cols: 11,
        rows: 5,
        move_interval_scale: 1.0,
        shots_per_second: 0.04,
    },
    ScalingRow {
        cols: 11,
        rows: 5,
        move_interval_scale: 0.9,
        shots_per_second: 0.05,
    },
    ScalingRow {
        cols: 13,
        rows: 5,
        move_interval_scale: 0.8,
        shots_per_second: 0.06,
    },
    ScalingRow {
        cols: 15,
        rows: 6,
        move_interval_scale: 0.7,
        shots_per_second: 0.07,
    },
];

/// Derived tunables for a room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaled {
    /// Ticks between formation steps (before the wave speed multiplier)
    pub move_interval: u64,
    /// Per-tick fire probability for each eligible alien
    pub fire_probability: f64,
    pub cols: u32,
    pub rows: u32,
    /// Lives each player starts with
    pub lives: u32,
}

/// Scale tunables for `player_count` players
///
/// Counts outside 1..=4 use the 1-player formation row, but lives always
/// follow the real count.
pub fn scale(player_count: usize, config: &GameConfig) -> Scaled {
    let row = match player_count {
        1..=4 => SCALING_TABLE[player_count - 1],
        _ => SCALING_TABLE[0],
    };

    let move_interval =
        ((config.alien_move_interval_ticks as f64) * row.move_interval_scale).round() as u64;
    let extra_players = (player_count as u32).saturating_sub(1);

    Scaled {
        move_interval: move_interval.max(1),
        fire_probability: row.shots_per_second / config.tick_rate(),
        cols: row.cols,
        rows: row.rows,
        lives: config.base_lives + extra_players * config.lives_per_extra_player,
    }
}
