//! Fixed timestep simulation tick
//!
//! One call advances a `Playing` room by exactly one tick. Step order is
//! part of the determinism contract; do not reorder.

use std::collections::{BTreeMap, BTreeSet};

use super::action::{GameEvent, GameResult, ScoreSource};
use super::collision::{HitBox, off_playfield, point_in_box};
use super::enhanced;
use super::entity::{Bullet, Entity, Ufo};
use super::mode::{ModeRules, ScoreTarget, WaveConfig};
use super::scaling::scale;
use super::state::{GameState, GameStatus, InputState};
use crate::consts::*;

/// Bookkeeping for the current tick
#[derive(Debug, Default)]
pub(super) struct TickFrame {
    /// Bullets consumed by a hit
    pub spent: BTreeSet<u32>,
    /// Enemies destroyed this tick; they stay as `alive = false` markers
    /// until the next tick's purge
    pub killed: BTreeSet<u32>,
}

/// Advance a playing room by one tick
pub fn tick(state: &mut GameState, rules: &dyn ModeRules, events: &mut Vec<GameEvent>) {
    if state.status != GameStatus::Playing {
        return;
    }

    state.tick += 1;
    let wave_config = rules.wave_config(state.wave, state.player_count(), &state.config);
    let scaled = scale(state.player_count(), &state.config);
    let mut frame = TickFrame::default();

    // 1. Players
    move_players(state, events);

    // 2-3. Projectiles advance one cell per sub-step; every cell on the
    // path is checked in fixed collision order
    for substep in 0..state.config.bullet_speed.max(1) {
        advance_bullets(state, &frame, substep);
        resolve_bullet_hostile_hits(state, rules, &wave_config, &mut frame, events);
        resolve_bullet_ufo_hits(state, rules, &mut frame, events);
        resolve_bullet_player_hits(state, &mut frame, events);
        resolve_bullet_barrier_hits(state, &mut frame);
    }

    // 4. Structural pass
    purge_entities(state, &frame);

    // 5. Formation
    move_formation(state, wave_config.move_interval(scaled.move_interval));

    // 6. Hostile fire
    if wave_config.enemies.hostile_fire && !wave_config.enemies.challenging_stage {
        hostile_fire(state, scaled.fire_probability);
    }

    // 7. UFO
    update_ufo(state, wave_config.enemies.ufo, events);

    // 8. Enhanced enemies
    if state.enhanced_mode {
        enhanced::update(state, &wave_config, events);
    }

    // 9. End conditions
    check_end_conditions(state, events);
}

fn move_players(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let tick = state.tick;
    let speed = state.config.player_move_speed;
    let mut respawned = Vec::new();

    for player in state.players.values_mut() {
        if player.alive {
            let dx = player.input.direction() * speed;
            player.x = (player.x + dx).clamp(PLAYER_MIN_X, PLAYER_MAX_X);
        } else if player.respawn_at_tick.is_some_and(|at| at <= tick) {
            // Back where they went down
            player.alive = true;
            player.respawn_at_tick = None;
            player.input = InputState::default();
            respawned.push(player.id.clone());
        }
    }

    for player_id in respawned {
        enhanced::forget_captive(state, &player_id);
        events.push(GameEvent::PlayerRespawned { player_id });
    }
}

/// Move every unspent bullet one cell. Friendly bullets move on each
/// sub-step, hostile ones only on the first and never on skip ticks.
fn advance_bullets(state: &mut GameState, frame: &TickFrame, substep: i32) {
    let hostile_moves = substep == 0 && state.tick % HOSTILE_BULLET_SKIP_PERIOD != 0;
    for entity in &mut state.entities {
        let Entity::Bullet(bullet) = entity else {
            continue;
        };
        if frame.spent.contains(&bullet.id) {
            continue;
        }
        if !bullet.is_hostile() || hostile_moves {
            bullet.y += bullet.dy;
        }
    }
}

/// Indices of bullets not yet consumed this tick
fn live_bullets(state: &GameState, frame: &TickFrame, hostile: Option<bool>) -> Vec<usize> {
    state
        .entities
        .iter()
        .enumerate()
        .filter_map(|(index, entity)| match entity {
            Entity::Bullet(b)
                if !frame.spent.contains(&b.id)
                    && hostile.is_none_or(|want| b.is_hostile() == want) =>
            {
                Some(index)
            }
            _ => None,
        })
        .collect()
}

fn bullet_at(state: &GameState, index: usize) -> Option<&Bullet> {
    match state.entities.get(index) {
        Some(Entity::Bullet(b)) => Some(b),
        _ => None,
    }
}

/// Can a friendly bullet at (x, y) strike this enemy?
fn strikeable(entity: &Entity, x: i32, y: i32) -> bool {
    if !entity.is_living_hostile() {
        return false;
    }
    if let Entity::Alien(alien) = entity {
        if alien.entering {
            return false;
        }
    }
    let (ex, ey) = entity.position();
    HitBox::of(entity).is_some_and(|hit_box| point_in_box(x, y, ex, ey, hit_box))
}

/// Award a kill to `player_id` (the player may have left; score still counts)
fn credit_kill(
    state: &mut GameState,
    player_id: &str,
    target_id: u32,
    points: u32,
    source: ScoreSource,
    events: &mut Vec<GameEvent>,
) {
    state.score += u64::from(points);
    if let Some(player) = state.players.get_mut(player_id) {
        player.kills += 1;
    }
    events.push(GameEvent::AlienKilled {
        alien_id: target_id,
        player_id: player_id.to_string(),
    });
    events.push(GameEvent::ScoreAwarded {
        player_id: player_id.to_string(),
        points,
        source,
    });
}

fn resolve_bullet_hostile_hits(
    state: &mut GameState,
    rules: &dyn ModeRules,
    wave_config: &WaveConfig,
    frame: &mut TickFrame,
    events: &mut Vec<GameEvent>,
) {
    let challenging_stage = wave_config.enemies.challenging_stage;
    let mut splits = Vec::new();
    let mut rescues = Vec::new();

    for bullet_index in live_bullets(state, frame, Some(false)) {
        let Some(bullet) = bullet_at(state, bullet_index) else {
            continue;
        };
        let (bullet_id, bx, by) = (bullet.id, bullet.x, bullet.y);
        let Some(owner) = bullet.owner_id.clone() else {
            continue;
        };
        let Some(target) = state.entities.iter().position(|e| strikeable(e, bx, by)) else {
            continue;
        };
        frame.spent.insert(bullet_id);

        let escorts = match &state.entities[target] {
            Entity::Commander(c) => enhanced::living_escorts(&state.entities, &c.escorts),
            _ => 0,
        };

        let hit = match &mut state.entities[target] {
            Entity::Alien(alien) => {
                alien.alive = false;
                Some((
                    alien.id,
                    ScoreTarget::Alien {
                        base: alien.points,
                        challenging_stage,
                    },
                    ScoreSource::Alien,
                ))
            }
            Entity::Commander(commander) if commander.health > 1 => {
                commander.health -= 1;
                None
            }
            Entity::Commander(commander) => {
                commander.alive = false;
                if let Some(captive) = commander.captured_player.take() {
                    rescues.push((captive, owner.clone()));
                }
                Some((
                    commander.id,
                    ScoreTarget::Commander {
                        diving: commander.dive.is_away(),
                        escorts,
                    },
                    ScoreSource::Commander,
                ))
            }
            Entity::DiveBomber(bomber) => {
                bomber.alive = false;
                splits.push((bomber.x, bomber.y));
                Some((
                    bomber.id,
                    ScoreTarget::DiveBomber {
                        diving: bomber.dive.is_away(),
                    },
                    ScoreSource::DiveBomber,
                ))
            }
            Entity::Transform(fragment) => {
                fragment.lifetime = 0;
                Some((fragment.id, ScoreTarget::Transform, ScoreSource::Transform))
            }
            Entity::Bullet(_) | Entity::Barrier(_) | Entity::Ufo(_) => None,
        };

        if let Some((target_id, score_target, source)) = hit {
            frame.killed.insert(target_id);
            let points = rules.points(score_target);
            credit_kill(state, &owner, target_id, points, source, events);
        }
    }

    for (x, y) in splits {
        enhanced::split_dive_bomber(state, wave_config, x, y);
    }
    for (captive, rescuer) in rescues {
        enhanced::release_captive(state, rules, &captive, &rescuer, events);
    }
}

fn resolve_bullet_ufo_hits(
    state: &mut GameState,
    rules: &dyn ModeRules,
    frame: &mut TickFrame,
    events: &mut Vec<GameEvent>,
) {
    for bullet_index in live_bullets(state, frame, Some(false)) {
        let Some(bullet) = bullet_at(state, bullet_index) else {
            continue;
        };
        let (bullet_id, bx, by) = (bullet.id, bullet.x, bullet.y);
        let Some(owner) = bullet.owner_id.clone() else {
            continue;
        };

        let hit = state.entities.iter_mut().find_map(|entity| match entity {
            Entity::Ufo(ufo) if ufo.alive && point_in_box(bx, by, ufo.x, ufo.y, HitBox::UFO) => {
                ufo.alive = false;
                Some((ufo.id, ufo.bounty))
            }
            _ => None,
        });

        if let Some((ufo_id, bounty)) = hit {
            frame.spent.insert(bullet_id);
            frame.killed.insert(ufo_id);
            let points = rules.points(ScoreTarget::Ufo { bounty });
            credit_kill(state, &owner, ufo_id, points, ScoreSource::Ufo, events);
        }
    }
}

/// Take a life from a player. Unknown or already-down players are ignored.
pub(super) fn kill_player(state: &mut GameState, player_id: &str, events: &mut Vec<GameEvent>) {
    let tick = state.tick;
    let delay = state.config.respawn_delay_ticks;
    let Some(player) = state.players.get_mut(player_id) else {
        return;
    };
    if !player.alive {
        return;
    }
    player.lives = player.lives.saturating_sub(1);
    player.alive = false;
    player.input = InputState::default();
    player.respawn_at_tick = (player.lives > 0).then_some(tick + delay);
    events.push(GameEvent::PlayerDied {
        player_id: player_id.to_string(),
    });
}

fn resolve_bullet_player_hits(
    state: &mut GameState,
    frame: &mut TickFrame,
    events: &mut Vec<GameEvent>,
) {
    for bullet_index in live_bullets(state, frame, Some(true)) {
        let Some(bullet) = bullet_at(state, bullet_index) else {
            continue;
        };
        let (bullet_id, bx, by) = (bullet.id, bullet.x, bullet.y);

        let victim = state
            .players
            .values()
            .find(|p| p.alive && point_in_box(bx, by, p.x, PLAYER_Y, HitBox::PLAYER))
            .map(|p| p.id.clone());

        if let Some(player_id) = victim {
            frame.spent.insert(bullet_id);
            kill_player(state, &player_id, events);
        }
    }
}

fn resolve_bullet_barrier_hits(state: &mut GameState, frame: &mut TickFrame) {
    for bullet_index in live_bullets(state, frame, None) {
        let Some(bullet) = bullet_at(state, bullet_index) else {
            continue;
        };
        let (bullet_id, bx, by) = (bullet.id, bullet.x, bullet.y);

        let hit = state.entities.iter_mut().any(|entity| match entity {
            Entity::Barrier(barrier) => match barrier.segment_at(bx, by) {
                Some(segment) => {
                    let health = &mut barrier.segments[segment].health;
                    *health = health.saturating_sub(1);
                    true
                }
                None => false,
            },
            _ => false,
        });

        if hit {
            frame.spent.insert(bullet_id);
        }
    }
}

/// Drop spent/off-field bullets, dead UFOs and last tick's enemy markers
fn purge_entities(state: &mut GameState, frame: &TickFrame) {
    state.entities.retain(|entity| match entity {
        Entity::Bullet(b) => !frame.spent.contains(&b.id) && !off_playfield(b.y),
        Entity::Ufo(u) => u.alive,
        Entity::Alien(a) => a.alive || frame.killed.contains(&a.id),
        Entity::Commander(c) => c.alive || frame.killed.contains(&c.id),
        Entity::DiveBomber(d) => d.alive || frame.killed.contains(&d.id),
        Entity::Transform(t) => t.is_alive() || frame.killed.contains(&t.id),
        Entity::Barrier(_) => true,
    });
}

/// Step the whole formation, or reverse and drop when a member would
/// cross a wall
fn move_formation(state: &mut GameState, interval: u64) {
    if state.tick % interval.max(1) != 0 {
        return;
    }

    let step = state.config.alien_step_x * state.alien_direction;
    let crosses = |x: i32| !(FORMATION_MIN_X..=FORMATION_MAX_X).contains(&(x + step));

    // Slots of divers that are away move with the formation too
    let mut members = 0usize;
    let mut hits_wall = false;
    for entity in &state.entities {
        let slot_x = match entity {
            Entity::Alien(a) if a.in_formation() => Some(a.x),
            Entity::Commander(c) if c.alive => Some(if c.dive.is_away() { c.dive.home_x } else { c.x }),
            Entity::DiveBomber(d) if d.alive => Some(if d.dive.is_away() { d.dive.home_x } else { d.x }),
            _ => None,
        };
        if let Some(x) = slot_x {
            members += 1;
            hits_wall |= crosses(x);
        }
    }
    if members == 0 {
        return;
    }

    let (dx, dy) = if hits_wall {
        state.alien_direction = -state.alien_direction;
        (0, state.config.alien_drop_y)
    } else {
        (step, 0)
    };

    for entity in &mut state.entities {
        match entity {
            Entity::Alien(a) if a.in_formation() => {
                a.x += dx;
                a.y += dy;
            }
            Entity::Commander(c) if c.alive => {
                enhanced::shift_slot(&mut c.dive, &mut c.x, &mut c.y, dx, dy);
            }
            Entity::DiveBomber(d) if d.alive => {
                enhanced::shift_slot(&mut d.dive, &mut d.x, &mut d.y, dx, dy);
            }
            _ => {}
        }
    }
}

/// Lowest living alien in each column rolls to fire
fn hostile_fire(state: &mut GameState, probability: f64) {
    let mut lowest: BTreeMap<u32, (i32, i32)> = BTreeMap::new();
    for entity in &state.entities {
        if let Entity::Alien(a) = entity {
            if !a.in_formation() {
                continue;
            }
            let slot = lowest.entry(a.col).or_insert((a.x, a.y));
            if a.y > slot.1 {
                *slot = (a.x, a.y);
            }
        }
    }

    for (x, y) in lowest.into_values() {
        if state.rng.chance(probability) {
            spawn_hostile_bullet(state, x + ALIEN_WIDTH / 2, y + ALIEN_HEIGHT);
        }
    }
}

pub(super) fn spawn_hostile_bullet(state: &mut GameState, x: i32, y: i32) {
    state.spawn(|id| {
        Entity::Bullet(Bullet {
            id,
            x,
            y,
            owner_id: None,
            dy: 1,
        })
    });
}

fn update_ufo(state: &mut GameState, allowed: bool, events: &mut Vec<GameEvent>) {
    let active = state.entities.iter_mut().find_map(|entity| match entity {
        Entity::Ufo(ufo) if ufo.alive => Some(ufo),
        _ => None,
    });
    if let Some(ufo) = active {
        ufo.x += ufo.direction;
        if ufo.x < -UFO_WIDTH || ufo.x > PLAYFIELD_WIDTH {
            ufo.alive = false;
        }
        return;
    }

    if !allowed || !state.rng.chance(state.config.ufo_spawn_chance) {
        return;
    }

    let direction = if state.rng.below(2) == 0 { 1 } else { -1 };
    let x = if direction > 0 {
        0
    } else {
        PLAYFIELD_WIDTH - UFO_WIDTH
    };
    let bounty = state.rng.pick(&UFO_BOUNTIES);
    state.spawn(|id| {
        Entity::Ufo(Ufo {
            id,
            x,
            y: UFO_Y,
            direction,
            alive: true,
            bounty,
        })
    });
    log::debug!("UFO spawned at x={} worth {}", x, bounty);
    events.push(GameEvent::UfoSpawn { x });
}

fn check_end_conditions(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let invaded = state
        .entities
        .iter()
        .any(|e| e.in_formation() && e.position().1 >= GAME_OVER_Y);

    if state.living_hostile_count() == 0 {
        events.push(GameEvent::WaveComplete { wave: state.wave });
    }

    let eliminated = !state.players.is_empty()
        && state.players.values().all(|p| !p.alive && p.lives == 0);

    let result = if invaded {
        Some(GameResult::Invaded)
    } else if eliminated {
        Some(GameResult::Eliminated)
    } else {
        None
    };

    if let Some(result) = result {
        log::info!(
            "Game over at tick {} (wave {}, score {}): {:?}",
            state.tick,
            state.wave,
            state.score,
            result
        );
        state.status = GameStatus::GameOver;
        events.push(GameEvent::GameOver { result });
    }
}
