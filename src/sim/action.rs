//! Actions consumed from the orchestrator and events emitted back

use serde::{Deserialize, Serialize};

use super::state::{InputState, Player};

/// One discrete external trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Tick,
    PlayerJoin { player: Player },
    PlayerLeave { player_id: String },
    PlayerInput { player_id: String, input: InputState },
    PlayerShoot { player_id: String },
    PlayerReady { player_id: String },
    PlayerUnready { player_id: String },
    StartSolo,
    StartCountdown,
    CountdownTick,
    CountdownCancel { reason: String },
    /// Begin the transition to the next wave once the current one is cleared
    NextWave,
}

/// Payload-free discriminant, used as the allow-table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Tick,
    PlayerJoin,
    PlayerLeave,
    PlayerInput,
    PlayerShoot,
    PlayerReady,
    PlayerUnready,
    StartSolo,
    StartCountdown,
    CountdownTick,
    CountdownCancel,
    NextWave,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Tick,
        ActionKind::PlayerJoin,
        ActionKind::PlayerLeave,
        ActionKind::PlayerInput,
        ActionKind::PlayerShoot,
        ActionKind::PlayerReady,
        ActionKind::PlayerUnready,
        ActionKind::StartSolo,
        ActionKind::StartCountdown,
        ActionKind::CountdownTick,
        ActionKind::CountdownCancel,
        ActionKind::NextWave,
    ];
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Tick => ActionKind::Tick,
            Action::PlayerJoin { .. } => ActionKind::PlayerJoin,
            Action::PlayerLeave { .. } => ActionKind::PlayerLeave,
            Action::PlayerInput { .. } => ActionKind::PlayerInput,
            Action::PlayerShoot { .. } => ActionKind::PlayerShoot,
            Action::PlayerReady { .. } => ActionKind::PlayerReady,
            Action::PlayerUnready { .. } => ActionKind::PlayerUnready,
            Action::StartSolo => ActionKind::StartSolo,
            Action::StartCountdown => ActionKind::StartCountdown,
            Action::CountdownTick => ActionKind::CountdownTick,
            Action::CountdownCancel { .. } => ActionKind::CountdownCancel,
            Action::NextWave => ActionKind::NextWave,
        }
    }
}

/// What earned a score award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Alien,
    Ufo,
    Commander,
    DiveBomber,
    Transform,
    Rescue,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// A formation enemy reached the player row
    Invaded,
    /// Every player is down with no lives left
    Eliminated,
}

/// Notification for the orchestrator to broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined { player: Player },
    PlayerLeft { player_id: String },
    PlayerReady { player_id: String },
    PlayerUnready { player_id: String },
    CountdownTick { count: u32 },
    CountdownCancelled { reason: String },
    GameStart,
    PlayerRespawned { player_id: String },
    AlienKilled { alien_id: u32, player_id: String },
    ScoreAwarded {
        player_id: String,
        points: u32,
        source: ScoreSource,
    },
    PlayerDied { player_id: String },
    UfoSpawn { x: i32 },
    WaveComplete { wave: u32 },
    GameOver { result: GameResult },
    PlayerCaptured { player_id: String, commander_id: u32 },
    PlayerReleased { player_id: String },
}
