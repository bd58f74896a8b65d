//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `TICK` action = one step)
//! - Seeded RNG only, with the seed stored in `GameState`
//! - Stable iteration order (entity creation order, players by id)
//! - No I/O, clocks or platform dependencies

pub mod action;
pub mod collision;
mod enhanced;
pub mod entity;
pub mod mode;
pub mod reducer;
pub mod scaling;
pub mod state;
pub mod tick;
pub mod wave;

pub use action::{Action, ActionKind, GameEvent, GameResult, ScoreSource};
pub use entity::{
    Alien, AlienKind, Barrier, Bullet, Commander, DiveBomber, Entity, FlyThrough, Transform, Ufo,
};
pub use mode::{ClassicRules, EnhancedRules, ModeRules, WaveConfig, rules_for};
pub use reducer::{Transition, action_allowed, apply};
pub use scaling::{Scaled, scale};
pub use state::{GameMode, GameState, GameStatus, InputState, Player, RngState};
pub use tick::tick;
pub use wave::generate_wave;
