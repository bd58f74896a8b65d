//! Rule sets: classic and enhanced
//!
//! Selected once per room from `GameState::enhanced_mode` and passed to the
//! tick simulator as `&dyn ModeRules`.

use serde::{Deserialize, Serialize};

use super::scaling::scale;
use crate::config::GameConfig;

/// Enemy mix and abilities unlocked for a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyFlags {
    pub commanders: u32,
    pub dive_bombers: u32,
    pub tractor_beam: bool,
    pub transforms: bool,
    /// Probability a killed dive-bomber splits into fragments
    pub transform_chance: f64,
    /// Bonus fly-through wave: no hostile fire, no UFO
    pub challenging_stage: bool,
    pub hostile_fire: bool,
    pub ufo: bool,
}

impl Default for EnemyFlags {
    fn default() -> Self {
        Self {
            commanders: 0,
            dive_bombers: 0,
            tractor_beam: false,
            transforms: false,
            transform_chance: 0.0,
            challenging_stage: false,
            hostile_fire: true,
            ufo: true,
        }
    }
}

/// Wave composition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub cols: u32,
    pub rows: u32,
    /// Divides the formation move interval
    pub speed_multiplier: f64,
    pub enemies: EnemyFlags,
}

impl WaveConfig {
    /// Formation move interval after the speed multiplier
    pub fn move_interval(&self, base_interval: u64) -> u64 {
        ((base_interval as f64) / self.speed_multiplier).round().max(1.0) as u64
    }
}

/// What was destroyed and in which situation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTarget {
    Alien { base: u32, challenging_stage: bool },
    Ufo { bounty: u32 },
    Commander { diving: bool, escorts: usize },
    DiveBomber { diving: bool },
    Transform,
    /// Freeing a captured player
    Rescue,
}

/// Shared interface of both rule sets
pub trait ModeRules {
    fn name(&self) -> &'static str;
    fn wave_config(&self, wave: u32, player_count: usize, config: &GameConfig) -> WaveConfig;
    fn points(&self, target: ScoreTarget) -> u32;
}

/// Original arcade rules: one formation, UFO, barriers
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicRules;

impl ModeRules for ClassicRules {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn wave_config(&self, wave: u32, player_count: usize, config: &GameConfig) -> WaveConfig {
        let scaled = scale(player_count, config);
        WaveConfig {
            cols: scaled.cols,
            rows: scaled.rows,
            speed_multiplier: 1.0 + 0.1 * f64::from(wave.saturating_sub(1)),
            enemies: EnemyFlags::default(),
        }
    }

    fn points(&self, target: ScoreTarget) -> u32 {
        match target {
            ScoreTarget::Alien { base, .. } => base,
            ScoreTarget::Ufo { bounty } => bounty,
            ScoreTarget::Commander { .. } => 150,
            ScoreTarget::DiveBomber { .. } => 50,
            ScoreTarget::Transform => 100,
            ScoreTarget::Rescue => 0,
        }
    }
}

/// Galaga-style rules: commanders, dive-bombers, transforms, bonus stages
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedRules;

/// Fixed challenging-stage formation (8 x 5 = 40 enemies)
const CHALLENGING_COLS: u32 = 8;
const CHALLENGING_ROWS: u32 = 5;
/// Flat value of each challenging-stage kill
const CHALLENGING_KILL_POINTS: u32 = 100;
const RESCUE_BONUS: u32 = 1000;

impl EnhancedRules {
    /// Every 4th wave starting at wave 3
    pub fn is_challenging_stage(wave: u32) -> bool {
        wave >= 3 && (wave - 3) % 4 == 0
    }
}

impl ModeRules for EnhancedRules {
    fn name(&self) -> &'static str {
        "enhanced"
    }

    fn wave_config(&self, wave: u32, player_count: usize, config: &GameConfig) -> WaveConfig {
        if Self::is_challenging_stage(wave) {
            return WaveConfig {
                cols: CHALLENGING_COLS,
                rows: CHALLENGING_ROWS,
                speed_multiplier: 1.5,
                enemies: EnemyFlags {
                    challenging_stage: true,
                    hostile_fire: false,
                    ufo: false,
                    ..EnemyFlags::default()
                },
            };
        }

        let scaled = scale(player_count, config);
        // Commander and dive-bomber rows take the place of one alien row
        let rows = scaled.rows.saturating_sub(1).max(2);

        let (commanders, dive_bombers, tractor_beam, transforms) = match wave {
            0 | 1 => (2, 0, false, false),
            2 => (2, 4, false, false),
            4 | 5 => (3, 4, true, false),
            _ => (4, 6, true, true),
        };
        let transform_chance = if transforms {
            (0.2 + 0.05 * f64::from(wave.saturating_sub(6))).min(0.5)
        } else {
            0.0
        };

        WaveConfig {
            cols: scaled.cols,
            rows,
            speed_multiplier: 1.0 + 0.12 * f64::from(wave.saturating_sub(1)),
            enemies: EnemyFlags {
                commanders: commanders.min(scaled.cols),
                dive_bombers: dive_bombers.min(scaled.cols),
                tractor_beam,
                transforms,
                transform_chance,
                ..EnemyFlags::default()
            },
        }
    }

    fn points(&self, target: ScoreTarget) -> u32 {
        match target {
            ScoreTarget::Alien {
                challenging_stage: true,
                ..
            } => CHALLENGING_KILL_POINTS,
            ScoreTarget::Alien { base, .. } => base,
            ScoreTarget::Ufo { bounty } => bounty,
            ScoreTarget::Commander { diving: false, .. } => 150,
            ScoreTarget::Commander {
                diving: true,
                escorts: 0,
            } => 400,
            ScoreTarget::Commander {
                diving: true,
                escorts: 1,
            } => 800,
            ScoreTarget::Commander { diving: true, .. } => 1600,
            ScoreTarget::DiveBomber { diving: false } => 50,
            ScoreTarget::DiveBomber { diving: true } => 100,
            ScoreTarget::Transform => 160,
            ScoreTarget::Rescue => RESCUE_BONUS,
        }
    }
}

static CLASSIC: ClassicRules = ClassicRules;
static ENHANCED: EnhancedRules = EnhancedRules;

/// Rule set for a room
pub fn rules_for(enhanced_mode: bool) -> &'static dyn ModeRules {
    if enhanced_mode { &ENHANCED } else { &CLASSIC }
}
