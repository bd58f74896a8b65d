//! Enhanced-mode enemy behaviour
//!
//! Commanders (tractor beam, escorted dives), dive-bomber attack runs,
//! transform fragments and the challenging-stage fly-through. Runs as
//! step 8 of the tick, after the formation, fire and UFO steps.

use super::action::{GameEvent, ScoreSource};
use super::collision::{HitBox, boxes_overlap, off_playfield};
use super::entity::{Dive, DivePhase, Entity, FlyThrough, TractorBeam, Transform, TransformKind};
use super::mode::{ModeRules, ScoreTarget, WaveConfig};
use super::state::{GameState, InputState};
use super::tick::{kill_player, spawn_hostile_bullet};
use crate::consts::*;

/// Ticks of the outward sweep before the diver curves back
const SWEEP_OUT_TICKS: u32 = 12;
/// Last tick of the return curve
const SWEEP_BACK_TICKS: u32 = 30;
/// Dive ticks on which the diver drops a bullet
const DIVE_FIRE_TICKS: [u32; 2] = [10, 24];
/// Horizontal cells per tick while flying home
const RETURN_SPEED_X: i32 = 3;
/// Extra cells on either side of a commander covered by its beam
const BEAM_REACH: i32 = 2;
/// Dive-bombers pulled along on a commander's dive
const MAX_ESCORTS: usize = 2;

/// Step 8 of the tick
pub(super) fn update(state: &mut GameState, wave_config: &WaveConfig, events: &mut Vec<GameEvent>) {
    let flags = wave_config.enemies;
    if !flags.challenging_stage {
        commanders_act(state, flags.tractor_beam, events);
        launch_dive_bombers(state);
    }
    fly_divers(state);
    fly_challengers(state);
    move_transforms(state);
    ram_players(state, events);
}

/// Sideways step on tick `progress` of a sweep: out, back across, out again
fn sweep_dx(progress: u32, direction: i32) -> i32 {
    if progress <= SWEEP_OUT_TICKS || progress > SWEEP_BACK_TICKS {
        direction
    } else {
        -direction
    }
}

/// Move a formation slot by (dx, dy). Divers that are away only carry
/// their home slot along.
pub(super) fn shift_slot(dive: &mut Dive, x: &mut i32, y: &mut i32, dx: i32, dy: i32) {
    if dive.is_away() {
        dive.home_x += dx;
        dive.home_y += dy;
    } else {
        *x += dx;
        *y += dy;
        dive.home_x = *x;
        dive.home_y = *y;
    }
}

fn begin_dive(dive: &mut Dive, x: i32, y: i32, direction: i32) {
    dive.phase = DivePhase::Diving;
    dive.progress = 0;
    dive.direction = direction;
    dive.home_x = x;
    dive.home_y = y;
}

/// Advance one tick along the dive path. Returns true when the diver fires.
///
/// The path sweeps out, curves back across, then straightens; on leaving
/// the bottom edge the diver reappears at the top and flies home.
pub(super) fn advance_dive(dive: &mut Dive, x: &mut i32, y: &mut i32) -> bool {
    match dive.phase {
        DivePhase::Formation => false,
        DivePhase::Diving => {
            dive.progress += 1;
            let progress = dive.progress;
            let dx = sweep_dx(progress, dive.direction);
            *x = (*x + dx).clamp(FORMATION_MIN_X, FORMATION_MAX_X);
            *y += 1;
            if *y >= PLAYFIELD_HEIGHT {
                *y = 0;
                dive.phase = DivePhase::Returning;
            }
            DIVE_FIRE_TICKS.contains(&progress)
        }
        DivePhase::Returning => {
            dive.progress += 1;
            *x += (dive.home_x - *x).clamp(-RETURN_SPEED_X, RETURN_SPEED_X);
            *y += (dive.home_y - *y).clamp(-1, 1);
            if *x == dive.home_x && *y == dive.home_y {
                dive.phase = DivePhase::Formation;
                dive.progress = 0;
            }
            false
        }
    }
}

fn diving_count(state: &GameState) -> usize {
    state
        .entities
        .iter()
        .filter(|e| match e {
            Entity::Commander(c) => c.alive && c.dive.is_away(),
            Entity::DiveBomber(d) => d.alive && d.dive.is_away(),
            _ => false,
        })
        .count()
}

/// Escorts still flying with their commander
pub(super) fn living_escorts(entities: &[Entity], escorts: &[u32]) -> usize {
    entities
        .iter()
        .filter(|e| match e {
            Entity::DiveBomber(d) => d.alive && d.dive.is_away() && escorts.contains(&d.id),
            _ => false,
        })
        .count()
}

fn roll_direction(state: &mut GameState) -> i32 {
    if state.rng.below(2) == 0 { 1 } else { -1 }
}

fn commanders_act(state: &mut GameState, tractor_beam: bool, events: &mut Vec<GameEvent>) {
    for index in 0..state.entities.len() {
        let Entity::Commander(commander) = &state.entities[index] else {
            continue;
        };
        if !commander.alive || commander.dive.is_away() {
            continue;
        }
        let beam = commander.beam;
        let holding_captive = commander.captured_player.is_some();

        match beam {
            TractorBeam::Firing { remaining } => run_beam(state, index, remaining, events),
            TractorBeam::Idle => {
                let can_beam = tractor_beam && !holding_captive;
                if can_beam && state.rng.chance(state.config.tractor_beam_chance) {
                    let ticks = state.config.tractor_beam_ticks;
                    if let Entity::Commander(commander) = &mut state.entities[index] {
                        commander.beam = TractorBeam::Firing { remaining: ticks };
                        log::debug!("Commander {} beam on", commander.id);
                    }
                    continue;
                }
                if diving_count(state) < state.config.max_concurrent_dives
                    && state.rng.chance(state.config.commander_dive_chance)
                {
                    launch_commander(state, index);
                }
            }
        }
    }
}

fn run_beam(state: &mut GameState, index: usize, remaining: u32, events: &mut Vec<GameEvent>) {
    let Entity::Commander(commander) = &state.entities[index] else {
        return;
    };
    let commander_id = commander.id;
    let reach = (commander.x - BEAM_REACH)..(commander.x + ALIEN_WIDTH + BEAM_REACH);

    let target = state
        .players
        .values()
        .find(|p| p.alive && reach.contains(&p.center_x()))
        .map(|p| p.id.clone());

    let beam = match target {
        Some(player_id) => {
            capture(state, index, commander_id, player_id, events);
            TractorBeam::Idle
        }
        None if remaining <= 1 => TractorBeam::Idle,
        None => TractorBeam::Firing {
            remaining: remaining - 1,
        },
    };
    if let Entity::Commander(commander) = &mut state.entities[index] {
        commander.beam = beam;
    }
}

/// Captured players are out of play but keep their lives; they come back
/// after `capture_release_ticks` or when the commander is shot down.
fn capture(
    state: &mut GameState,
    index: usize,
    commander_id: u32,
    player_id: String,
    events: &mut Vec<GameEvent>,
) {
    let release_at = state.tick + state.config.capture_release_ticks;
    let Some(player) = state.players.get_mut(&player_id) else {
        return;
    };
    player.alive = false;
    player.input = InputState::default();
    player.respawn_at_tick = Some(release_at);

    if let Entity::Commander(commander) = &mut state.entities[index] {
        commander.captured_player = Some(player_id.clone());
    }
    log::info!("Player {} captured by commander {}", player_id, commander_id);
    events.push(GameEvent::PlayerCaptured {
        player_id,
        commander_id,
    });
}

fn launch_commander(state: &mut GameState, index: usize) {
    let direction = roll_direction(state);
    let Entity::Commander(commander) = &state.entities[index] else {
        return;
    };
    let col = commander.dive.home_col;

    // Nearest idle dive-bombers by column, ties by creation order
    let mut candidates: Vec<(u32, usize)> = state
        .entities
        .iter()
        .enumerate()
        .filter_map(|(i, e)| match e {
            Entity::DiveBomber(d) if d.alive && !d.dive.is_away() => {
                Some((d.dive.home_col.abs_diff(col), i))
            }
            _ => None,
        })
        .collect();
    candidates.sort_unstable();

    let mut escorts = Vec::with_capacity(MAX_ESCORTS);
    for (_, i) in candidates.into_iter().take(MAX_ESCORTS) {
        if let Entity::DiveBomber(bomber) = &mut state.entities[i] {
            begin_dive(&mut bomber.dive, bomber.x, bomber.y, direction);
            escorts.push(bomber.id);
        }
    }

    if let Entity::Commander(commander) = &mut state.entities[index] {
        begin_dive(&mut commander.dive, commander.x, commander.y, direction);
        log::debug!(
            "Commander {} diving with {} escorts",
            commander.id,
            escorts.len()
        );
        commander.escorts = escorts;
    }
}

fn launch_dive_bombers(state: &mut GameState) {
    for index in 0..state.entities.len() {
        let idle = matches!(
            &state.entities[index],
            Entity::DiveBomber(d) if d.alive && !d.dive.is_away()
        );
        if !idle {
            continue;
        }
        if diving_count(state) >= state.config.max_concurrent_dives {
            break;
        }
        if !state.rng.chance(state.config.dive_chance) {
            continue;
        }
        let direction = roll_direction(state);
        if let Entity::DiveBomber(bomber) = &mut state.entities[index] {
            begin_dive(&mut bomber.dive, bomber.x, bomber.y, direction);
        }
    }
}

fn fly_divers(state: &mut GameState) {
    let mut shots = Vec::new();
    for entity in &mut state.entities {
        let (dive, x, y) = match entity {
            Entity::Commander(c) if c.alive => (&mut c.dive, &mut c.x, &mut c.y),
            Entity::DiveBomber(d) if d.alive => (&mut d.dive, &mut d.x, &mut d.y),
            _ => continue,
        };
        if advance_dive(dive, x, y) {
            shots.push((*x + ALIEN_WIDTH / 2, *y + ALIEN_HEIGHT));
        }
    }

    // Back home: the escort group disbands
    for entity in &mut state.entities {
        if let Entity::Commander(c) = entity {
            if !c.dive.is_away() {
                c.escorts.clear();
            }
        }
    }

    for (x, y) in shots {
        spawn_hostile_bullet(state, x, y);
    }
}

/// Advance one tick along a fly-through. Returns true once the alien has
/// left the bottom of the field.
fn advance_fly_through(path: &mut FlyThrough, x: &mut i32, y: &mut i32) -> bool {
    if path.delay > 0 {
        path.delay -= 1;
        return false;
    }
    path.progress += 1;
    *x = (*x + sweep_dx(path.progress, path.direction)).clamp(FORMATION_MIN_X, FORMATION_MAX_X);
    *y += 1;
    *y >= PLAYFIELD_HEIGHT
}

/// Challenging-stage aliens never fire or ram; the ones that get away
/// are dropped without points
fn fly_challengers(state: &mut GameState) {
    for entity in &mut state.entities {
        let Entity::Alien(alien) = entity else {
            continue;
        };
        if !alien.alive || alien.entering {
            continue;
        }
        let Some(path) = alien.fly_through.as_mut() else {
            continue;
        };
        if advance_fly_through(path, &mut alien.x, &mut alien.y) {
            alien.alive = false;
            log::trace!("Alien {} escaped the challenging stage", alien.id);
        }
    }
}

fn move_transforms(state: &mut GameState) {
    for entity in &mut state.entities {
        let Entity::Transform(fragment) = entity else {
            continue;
        };
        if !fragment.is_alive() {
            continue;
        }
        let x = fragment.x + fragment.vx;
        if (0..=PLAYFIELD_WIDTH - TRANSFORM_WIDTH).contains(&x) {
            fragment.x = x;
        } else {
            fragment.vx = -fragment.vx;
        }
        fragment.y += fragment.vy;
        fragment.lifetime -= 1;
        if off_playfield(fragment.y) {
            fragment.lifetime = 0;
        }
    }
}

/// Body of an enemy that can ram a player
fn ramming_body(entity: &Entity) -> Option<(i32, i32, HitBox)> {
    match entity {
        Entity::Commander(c) if c.alive && c.dive.is_away() => Some((c.x, c.y, HitBox::ALIEN)),
        Entity::DiveBomber(d) if d.alive && d.dive.is_away() => Some((d.x, d.y, HitBox::ALIEN)),
        Entity::Transform(t) if t.is_alive() => Some((t.x, t.y, HitBox::TRANSFORM)),
        _ => None,
    }
}

/// Diving enemies and fragments that touch a ship destroy both, for no points
fn ram_players(state: &mut GameState, events: &mut Vec<GameEvent>) {
    for index in 0..state.entities.len() {
        let Some((x, y, body)) = ramming_body(&state.entities[index]) else {
            continue;
        };
        let victim = state
            .players
            .values()
            .find(|p| p.alive && boxes_overlap(x, y, body, p.x, PLAYER_Y, HitBox::PLAYER))
            .map(|p| p.id.clone());
        let Some(player_id) = victim else {
            continue;
        };

        match &mut state.entities[index] {
            Entity::Commander(c) => {
                c.alive = false;
                c.captured_player = None;
            }
            Entity::DiveBomber(d) => d.alive = false,
            Entity::Transform(t) => t.lifetime = 0,
            _ => {}
        }
        kill_player(state, &player_id, events);
    }
}

/// Maybe split a destroyed dive-bomber into three fragments
pub(super) fn split_dive_bomber(state: &mut GameState, wave_config: &WaveConfig, x: i32, y: i32) {
    let flags = wave_config.enemies;
    if !flags.transforms || !state.rng.chance(flags.transform_chance) {
        return;
    }
    let kind = state.rng.pick(&TransformKind::ALL);
    let lifetime = state.config.transform_lifetime_ticks;
    let x = x + (ALIEN_WIDTH - TRANSFORM_WIDTH) / 2;
    for vx in [-1, 0, 1] {
        state.spawn(|id| {
            Entity::Transform(Transform {
                id,
                x,
                y,
                kind,
                vx,
                vy: 1,
                lifetime,
            })
        });
    }
    log::debug!("Dive-bomber split into {:?} fragments at ({}, {})", kind, x, y);
}

/// Free a player held by a commander that was just shot down
pub(super) fn release_captive(
    state: &mut GameState,
    rules: &dyn ModeRules,
    captive: &str,
    rescuer: &str,
    events: &mut Vec<GameEvent>,
) {
    let Some(player) = state.players.get_mut(captive) else {
        return;
    };
    if player.alive {
        return;
    }
    player.alive = true;
    player.respawn_at_tick = None;
    player.input = InputState::default();
    log::info!("Player {} rescued by {}", captive, rescuer);
    events.push(GameEvent::PlayerReleased {
        player_id: captive.to_string(),
    });

    let points = rules.points(ScoreTarget::Rescue);
    if points > 0 {
        state.score += u64::from(points);
        events.push(GameEvent::ScoreAwarded {
            player_id: rescuer.to_string(),
            points,
            source: ScoreSource::Rescue,
        });
    }
}

/// Drop any commander's hold on a player who just respawned
pub(super) fn forget_captive(state: &mut GameState, player_id: &str) {
    for entity in &mut state.entities {
        if let Entity::Commander(c) = entity {
            if c.captured_player.as_deref() == Some(player_id) {
                c.captured_player = None;
            }
        }
    }
}
