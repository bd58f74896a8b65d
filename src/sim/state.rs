//! Game state and core simulation types
//!
//! All state that must be persisted for replay/determinism lives here.

use std::collections::BTreeMap;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::config::GameConfig;
use crate::consts::*;

/// Coarse lifecycle phase of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Lobby: players join and ready up
    Waiting,
    /// Co-op start countdown
    Countdown,
    /// Previous wave sweeps off screen
    WipeExit,
    /// Empty field between waves
    WipeHold,
    /// New formation slides in (`entering` aliens)
    WipeReveal,
    /// Active gameplay
    Playing,
    /// Run ended (terminal)
    GameOver,
}

impl GameStatus {
    pub const ALL: [GameStatus; 7] = [
        GameStatus::Waiting,
        GameStatus::Countdown,
        GameStatus::WipeExit,
        GameStatus::WipeHold,
        GameStatus::WipeReveal,
        GameStatus::Playing,
        GameStatus::GameOver,
    ];

    pub fn is_wipe(self) -> bool {
        matches!(
            self,
            GameStatus::WipeExit | GameStatus::WipeHold | GameStatus::WipeReveal
        )
    }
}

/// Solo or co-op session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Solo,
    Coop,
}

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// Horizontal direction implied by the held keys
    pub fn direction(self) -> i32 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// A connected player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Display slot 1..=MAX_PLAYERS (assigned on join)
    pub slot: u8,
    /// Left edge of the ship
    pub x: i32,
    pub lives: u32,
    pub kills: u32,
    pub alive: bool,
    pub input: InputState,
    pub last_shot_tick: Option<u64>,
    pub respawn_at_tick: Option<u64>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slot: 0,
            x: (PLAYFIELD_WIDTH - PLAYER_WIDTH) / 2,
            lives: 0,
            kills: 0,
            alive: true,
            input: InputState::default(),
            last_shot_tick: None,
            respawn_at_tick: None,
        }
    }

    /// Column bullets leave from
    pub fn center_x(&self) -> i32 {
        self.x + PLAYER_WIDTH / 2
    }
}

/// Spawn x for the `index`-th of `count` players, evenly spread
pub fn spawn_x(index: usize, count: usize) -> i32 {
    let count = count.max(1) as i32;
    let index = index as i32;
    let x = PLAYFIELD_WIDTH * (index + 1) / (count + 1) - PLAYER_WIDTH / 2;
    x.clamp(PLAYER_MIN_X, PLAYER_MAX_X)
}

/// Seeded RNG living inside the state
///
/// Each draw rebuilds a `Pcg32` from the stored seed, takes one value and
/// writes the generator's next output back as the new seed. Replaying the
/// same actions from the same seed therefore yields the same draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }

    /// Draw a raw value and advance the seed
    pub fn next_u32(&mut self) -> u32 {
        let mut rng = self.to_rng();
        let value = rng.next_u32();
        self.seed = rng.next_u64();
        value
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Bernoulli roll; always consumes one draw
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform in [0, n); `n` must be non-zero
    pub fn below(&mut self, n: u32) -> u32 {
        ((u64::from(self.next_u32()) * u64::from(n)) >> 32) as u32
    }

    /// Uniformly pick one element of a fixed table
    pub fn pick<T: Copy, const N: usize>(&mut self, table: &[T; N]) -> T {
        table[self.below(N as u32) as usize]
    }
}

/// Complete room state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Simulation tick counter
    pub tick: u64,
    pub status: GameStatus,
    pub mode: GameMode,
    /// Selects the enhanced rule set (commanders, dive-bombers, transforms)
    pub enhanced_mode: bool,
    /// Current wave (0 before the first wave is revealed)
    pub wave: u32,
    /// Team score
    pub score: u64,
    /// Formation travel direction (±1)
    pub alien_direction: i32,
    pub rng: RngState,
    pub config: GameConfig,
    /// Players keyed by id (ordered for deterministic iteration)
    pub players: BTreeMap<String, Player>,
    /// Every entity, in creation order
    pub entities: Vec<Entity>,
    pub ready_player_ids: Vec<String>,
    pub countdown_remaining: Option<u32>,
    pub wipe_ticks_remaining: Option<u32>,
    pub wipe_target_wave: Option<u32>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a waiting room with the given seed
    pub fn new(seed: u64, config: GameConfig) -> Self {
        Self {
            tick: 0,
            status: GameStatus::Waiting,
            mode: GameMode::Solo,
            enhanced_mode: false,
            wave: 0,
            score: 0,
            alien_direction: 1,
            rng: RngState::new(seed),
            config,
            players: BTreeMap::new(),
            entities: Vec::new(),
            ready_player_ids: Vec::new(),
            countdown_remaining: None,
            wipe_ticks_remaining: None,
            wipe_target_wave: None,
            next_id: 1,
        }
    }

    /// Waiting room using the enhanced rule set
    pub fn enhanced(seed: u64, config: GameConfig) -> Self {
        Self {
            enhanced_mode: true,
            ..Self::new(seed, config)
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Push an entity, assigning it a fresh id through `build`
    pub fn spawn(&mut self, build: impl FnOnce(u32) -> Entity) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(build(id));
        id
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Aliens + commanders + dive-bombers + transforms still alive
    pub fn living_hostile_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_living_hostile()).count()
    }

    pub fn is_ready(&self, player_id: &str) -> bool {
        self.ready_player_ids.iter().any(|id| id == player_id)
    }

    /// Lowest display slot not taken by a current player
    pub fn free_slot(&self) -> Option<u8> {
        (1..=MAX_PLAYERS as u8).find(|slot| self.players.values().all(|p| p.slot != *slot))
    }

    /// Keep `mode` consistent with the number of players
    pub fn refresh_mode(&mut self) {
        self.mode = if self.players.len() > 1 {
            GameMode::Coop
        } else {
            GameMode::Solo
        };
    }
}
