//! Game tuning constants
//!
//! Stored inside every `GameState` so a room keeps the tunables it started
//! with. Loaded from JSON by the orchestrator; missing fields fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{field}` out of range: {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunable constants for one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Timing ===
    /// Interval between TICK actions (milliseconds)
    pub tick_interval_ms: u32,
    /// Countdown length before a co-op game starts (COUNTDOWN_TICK count)
    pub countdown_seconds: u32,
    /// Wipe transition lengths (ticks)
    pub wipe_exit_ticks: u32,
    pub wipe_hold_ticks: u32,
    pub wipe_reveal_ticks: u32,

    // === Player ===
    /// Cells moved per tick while input is held
    pub player_move_speed: i32,
    /// Minimum ticks between two shots
    pub player_cooldown_ticks: u64,
    /// Ticks between death and respawn
    pub respawn_delay_ticks: u64,
    /// Lives for a solo game
    pub base_lives: u32,
    /// Extra lives for each additional player
    pub lives_per_extra_player: u32,

    // === Projectiles ===
    /// Cells a friendly bullet travels per tick
    pub bullet_speed: i32,

    // === Formation ===
    /// Base ticks between formation steps (scaled by player count and wave)
    pub alien_move_interval_ticks: u64,
    /// Horizontal cells per formation step
    pub alien_step_x: i32,
    /// Rows dropped on a wall bounce
    pub alien_drop_y: i32,

    // === UFO ===
    /// Per-tick spawn probability while no UFO is active
    pub ufo_spawn_chance: f64,

    // === Enhanced mode ===
    /// Per-tick dive probability for a dive-bomber in formation
    pub dive_chance: f64,
    /// Per-tick dive probability for a commander in formation
    pub commander_dive_chance: f64,
    /// Maximum enemies diving at once
    pub max_concurrent_dives: usize,
    /// Per-tick tractor beam probability for an idle commander
    pub tractor_beam_chance: f64,
    /// Ticks a tractor beam stays active
    pub tractor_beam_ticks: u32,
    /// Ticks before a captured player is returned if not rescued
    pub capture_release_ticks: u64,
    /// Lifetime of transform fragments (ticks)
    pub transform_lifetime_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 33,
            countdown_seconds: 3,
            wipe_exit_ticks: 15,
            wipe_hold_ticks: 15,
            wipe_reveal_ticks: 30,

            // Player
            player_move_speed: 1,
            player_cooldown_ticks: 6,
            respawn_delay_ticks: 90,
            base_lives: 3,
            lives_per_extra_player: 1,

            // Projectiles
            bullet_speed: 1,

            // Formation
            alien_move_interval_ticks: 18,
            alien_step_x: 2,
            alien_drop_y: 1,

            // UFO
            ufo_spawn_chance: 0.001,

            // Enhanced mode
            dive_chance: 0.003,
            commander_dive_chance: 0.0008,
            max_concurrent_dives: 3,
            tractor_beam_chance: 0.002,
            tractor_beam_ticks: 45,
            capture_release_ticks: 150,
            transform_lifetime_ticks: 60,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded game config ({} ms ticks)", config.tick_interval_ms);
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "tick_interval_ms",
                reason: "must be positive",
            });
        }
        if self.alien_move_interval_ticks == 0 {
            return Err(ConfigError::OutOfRange {
                field: "alien_move_interval_ticks",
                reason: "must be positive",
            });
        }
        if self.bullet_speed < 1 || self.bullet_speed > 2 {
            return Err(ConfigError::OutOfRange {
                field: "bullet_speed",
                reason: "must be 1 or 2",
            });
        }
        let probabilities = [
            ("ufo_spawn_chance", self.ufo_spawn_chance),
            ("dive_chance", self.dive_chance),
            ("commander_dive_chance", self.commander_dive_chance),
            ("tractor_beam_chance", self.tractor_beam_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    reason: "probability must be within 0..=1",
                });
            }
        }
        Ok(())
    }

    /// Ticks per second
    pub fn tick_rate(&self) -> f64 {
        1000.0 / f64::from(self.tick_interval_ms)
    }
}
