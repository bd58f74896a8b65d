//! Invaders Sim - authoritative simulation core for a multiplayer space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machine, tick pass, collisions)
//! - `config`: Tunable constants with JSON loading

pub mod config;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use sim::{Action, GameEvent, GameState, GameStatus, Transition, apply};

/// Playfield geometry and fixed game constants
pub mod consts {
    /// Playfield size in terminal cells
    pub const PLAYFIELD_WIDTH: i32 = 120;
    pub const PLAYFIELD_HEIGHT: i32 = 36;

    /// Player ship (x is the left edge)
    pub const PLAYER_Y: i32 = 31;
    pub const PLAYER_WIDTH: i32 = 5;
    pub const PLAYER_HEIGHT: i32 = 2;
    pub const PLAYER_MIN_X: i32 = 1;
    pub const PLAYER_MAX_X: i32 = PLAYFIELD_WIDTH - PLAYER_WIDTH - 1;

    /// Maximum players per room
    pub const MAX_PLAYERS: usize = 4;

    /// Formation cell size (aliens, commanders, dive-bombers)
    pub const ALIEN_WIDTH: i32 = 5;
    pub const ALIEN_HEIGHT: i32 = 2;
    pub const ALIEN_COL_SPACING: i32 = 7;
    pub const ALIEN_ROW_SPACING: i32 = 3;
    pub const FORMATION_TOP: i32 = 4;
    pub const FORMATION_MIN_X: i32 = 1;
    pub const FORMATION_MAX_X: i32 = PLAYFIELD_WIDTH - ALIEN_WIDTH - 1;

    /// A formation hostile at or below this row ends the game
    pub const GAME_OVER_Y: i32 = PLAYER_Y - ALIEN_HEIGHT;

    /// UFO lane
    pub const UFO_Y: i32 = 1;
    pub const UFO_WIDTH: i32 = 6;
    pub const UFO_HEIGHT: i32 = 1;
    /// Bounty table rolled on each UFO spawn
    pub const UFO_BOUNTIES: [u32; 4] = [50, 100, 150, 300];

    /// Barriers
    pub const BARRIER_COUNT: i32 = 4;
    pub const BARRIER_WIDTH: i32 = 5;
    pub const BARRIER_HEIGHT: i32 = 2;
    pub const BARRIER_Y: i32 = PLAYER_Y - 5;
    pub const MAX_SEGMENT_HEALTH: u8 = 4;

    /// Hostile bullets skip one move in this many ticks
    pub const HOSTILE_BULLET_SKIP_PERIOD: u64 = 5;

    /// Transform fragment size
    pub const TRANSFORM_WIDTH: i32 = 3;
    pub const TRANSFORM_HEIGHT: i32 = 1;
}
