//! Entity model
//!
//! Every room keeps one flat, ordered `Vec<Entity>`. Iteration order is
//! creation order, which is what collision resolution relies on to break
//! ties deterministically.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Regular formation alien types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlienKind {
    Squid,
    Crab,
    Octopus,
}

impl AlienKind {
    /// Type for a formation row (top row is worth the most)
    pub fn for_row(row: u32) -> Self {
        match row {
            0 => AlienKind::Squid,
            1 | 2 => AlienKind::Crab,
            _ => AlienKind::Octopus,
        }
    }

    /// Base kill value
    pub fn points(self) -> u32 {
        match self {
            AlienKind::Squid => 30,
            AlienKind::Crab => 20,
            AlienKind::Octopus => 10,
        }
    }
}

/// A formation alien
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alien {
    pub id: u32,
    pub row: u32,
    pub col: u32,
    pub x: i32,
    pub y: i32,
    pub alive: bool,
    pub points: u32,
    pub kind: AlienKind,
    /// True only while the formation is being revealed
    pub entering: bool,
    /// Set on challenging-stage aliens, which never join the formation
    #[serde(default)]
    pub fly_through: Option<FlyThrough>,
}

/// Scripted path of a challenging-stage alien: wait, sweep down, leave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyThrough {
    /// Ticks left before this alien sets off
    pub delay: u32,
    pub progress: u32,
    pub direction: i32,
}

impl Alien {
    /// Alive, revealed and holding a formation slot
    pub fn in_formation(&self) -> bool {
        self.alive && !self.entering && self.fly_through.is_none()
    }
}

/// A projectile. `owner_id == None` means hostile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub owner_id: Option<String>,
    /// -1 travels up (friendly), 1 travels down (hostile)
    pub dy: i32,
}

impl Bullet {
    pub fn is_hostile(&self) -> bool {
        self.owner_id.is_none()
    }
}

/// One destructible cell of a barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierSegment {
    pub dx: i32,
    pub dy: i32,
    /// 0 = destroyed, MAX_SEGMENT_HEALTH = intact
    pub health: u8,
}

/// A shield bunker made of segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub segments: Vec<BarrierSegment>,
}

impl Barrier {
    /// Build an intact barrier with its top-left corner at (x, y)
    pub fn intact(id: u32, x: i32, y: i32) -> Self {
        let mut segments = Vec::with_capacity((BARRIER_WIDTH * BARRIER_HEIGHT) as usize);
        for dy in 0..BARRIER_HEIGHT {
            for dx in 0..BARRIER_WIDTH {
                // Notch out the bottom middle cell, like the arcade bunkers
                if dy == BARRIER_HEIGHT - 1 && dx == BARRIER_WIDTH / 2 {
                    continue;
                }
                segments.push(BarrierSegment {
                    dx,
                    dy,
                    health: MAX_SEGMENT_HEALTH,
                });
            }
        }
        Self { id, x, y, segments }
    }

    /// Index of the live segment occupying (x, y), if any
    pub fn segment_at(&self, x: i32, y: i32) -> Option<usize> {
        self.segments.iter().position(|segment| {
            segment.health > 0 && self.x + segment.dx == x && self.y + segment.dy == y
        })
    }
}

/// Bonus saucer crossing the top lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ufo {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub direction: i32,
    pub alive: bool,
    pub bounty: u32,
}

/// Where a diving enemy is in its attack run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivePhase {
    Formation,
    Diving,
    Returning,
}

/// Dive bookkeeping shared by dive-bombers and commanders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dive {
    pub phase: DivePhase,
    /// Ticks spent on the current dive
    pub progress: u32,
    /// Initial sweep direction (±1)
    pub direction: i32,
    pub home_row: u32,
    pub home_col: u32,
    /// Formation slot position; tracks formation steps while away
    pub home_x: i32,
    pub home_y: i32,
}

impl Dive {
    pub fn in_formation(row: u32, col: u32, x: i32, y: i32) -> Self {
        Self {
            phase: DivePhase::Formation,
            progress: 0,
            direction: 1,
            home_row: row,
            home_col: col,
            home_x: x,
            home_y: y,
        }
    }

    pub fn is_away(&self) -> bool {
        self.phase != DivePhase::Formation
    }
}

/// Commander tractor beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TractorBeam {
    Idle,
    Firing { remaining: u32 },
}

/// Enhanced-mode boss enemy (two hits to kill)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commander {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub alive: bool,
    /// 2 when fresh, 1 after the first hit; never increases
    pub health: u8,
    /// Dive-bombers flying with this commander on its current dive
    pub escorts: Vec<u32>,
    pub beam: TractorBeam,
    pub captured_player: Option<String>,
    pub dive: Dive,
}

/// Enhanced-mode enemy that leaves the formation on attack runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiveBomber {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub alive: bool,
    pub dive: Dive,
}

/// Fragment types a dive-bomber can split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Scorpion,
    Stingray,
    Galaxip,
}

impl TransformKind {
    pub const ALL: [TransformKind; 3] = [
        TransformKind::Scorpion,
        TransformKind::Stingray,
        TransformKind::Galaxip,
    ];
}

/// Short-lived fragment spawned when a dive-bomber splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub kind: TransformKind,
    pub vx: i32,
    pub vy: i32,
    /// Ticks left; 0 means expired (or destroyed)
    pub lifetime: u32,
}

impl Transform {
    pub fn is_alive(&self) -> bool {
        self.lifetime > 0
    }
}

/// Every kind of thing on the playfield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Alien(Alien),
    Bullet(Bullet),
    Barrier(Barrier),
    Ufo(Ufo),
    Commander(Commander),
    DiveBomber(DiveBomber),
    Transform(Transform),
}

impl Entity {
    pub fn id(&self) -> u32 {
        match self {
            Entity::Alien(a) => a.id,
            Entity::Bullet(b) => b.id,
            Entity::Barrier(b) => b.id,
            Entity::Ufo(u) => u.id,
            Entity::Commander(c) => c.id,
            Entity::DiveBomber(d) => d.id,
            Entity::Transform(t) => t.id,
        }
    }

    /// Living enemy that must be destroyed to clear the wave
    pub fn is_living_hostile(&self) -> bool {
        match self {
            Entity::Alien(a) => a.alive,
            Entity::Commander(c) => c.alive,
            Entity::DiveBomber(d) => d.alive,
            Entity::Transform(t) => t.is_alive(),
            Entity::Bullet(_) | Entity::Barrier(_) | Entity::Ufo(_) => false,
        }
    }

    /// Living enemy holding a formation slot (used for the invasion check)
    pub fn in_formation(&self) -> bool {
        match self {
            Entity::Alien(a) => a.in_formation(),
            Entity::Commander(c) => c.alive && !c.dive.is_away(),
            Entity::DiveBomber(d) => d.alive && !d.dive.is_away(),
            Entity::Bullet(_) | Entity::Barrier(_) | Entity::Ufo(_) | Entity::Transform(_) => false,
        }
    }

    /// Top-left corner
    pub fn position(&self) -> (i32, i32) {
        match self {
            Entity::Alien(a) => (a.x, a.y),
            Entity::Bullet(b) => (b.x, b.y),
            Entity::Barrier(b) => (b.x, b.y),
            Entity::Ufo(u) => (u.x, u.y),
            Entity::Commander(c) => (c.x, c.y),
            Entity::DiveBomber(d) => (d.x, d.y),
            Entity::Transform(t) => (t.x, t.y),
        }
    }
}
