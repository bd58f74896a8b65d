//! Wave construction
//!
//! Lays out the formation for the current wave (commanders on top, then
//! dive-bombers, then regular aliens) and rebuilds the barriers.

use super::entity::{
    Alien, AlienKind, Barrier, Commander, Dive, DiveBomber, Entity, FlyThrough, TractorBeam,
};
use super::mode::ModeRules;
use super::state::GameState;
use crate::consts::*;

/// Left edge of a formation `cols` wide, centred on the playfield
fn formation_left(cols: u32) -> i32 {
    let width = (cols.max(1) as i32 - 1) * ALIEN_COL_SPACING + ALIEN_WIDTH;
    ((PLAYFIELD_WIDTH - width) / 2).max(FORMATION_MIN_X)
}

/// Ticks between challenging-stage aliens setting off, within a row
const FLY_THROUGH_COL_GAP: u32 = 3;
/// Extra wait per row so rows fly through one after another
const FLY_THROUGH_ROW_GAP: u32 = 30;

/// First column of a `count`-wide group centred in a `cols`-wide formation
fn centred_start(cols: u32, count: u32) -> u32 {
    cols.saturating_sub(count) / 2
}

/// Replace all entities with a fresh formation for `state.wave`
///
/// Aliens spawn with `entering = true`; the reveal phase clears the flag.
/// On a challenging stage every alien gets a staggered fly-through path.
pub fn generate_wave(state: &mut GameState, rules: &dyn ModeRules) {
    let wave_config = rules.wave_config(state.wave, state.player_count(), &state.config);
    let enemies = wave_config.enemies;
    let left = formation_left(wave_config.cols);

    state.entities.clear();
    state.alien_direction = 1;

    let mut formation_row = 0u32;
    let row_y = |row: u32| FORMATION_TOP + row as i32 * ALIEN_ROW_SPACING;
    let col_x = |col: u32| left + col as i32 * ALIEN_COL_SPACING;

    if enemies.commanders > 0 {
        let start = centred_start(wave_config.cols, enemies.commanders);
        for col in start..start + enemies.commanders {
            let (x, y) = (col_x(col), row_y(formation_row));
            state.spawn(|id| {
                Entity::Commander(Commander {
                    id,
                    x,
                    y,
                    alive: true,
                    health: 2,
                    escorts: Vec::new(),
                    beam: TractorBeam::Idle,
                    captured_player: None,
                    dive: Dive::in_formation(formation_row, col, x, y),
                })
            });
        }
        formation_row += 1;
    }

    if enemies.dive_bombers > 0 {
        let start = centred_start(wave_config.cols, enemies.dive_bombers);
        for col in start..start + enemies.dive_bombers {
            let (x, y) = (col_x(col), row_y(formation_row));
            state.spawn(|id| {
                Entity::DiveBomber(DiveBomber {
                    id,
                    x,
                    y,
                    alive: true,
                    dive: Dive::in_formation(formation_row, col, x, y),
                })
            });
        }
        formation_row += 1;
    }

    for alien_row in 0..wave_config.rows {
        let kind = AlienKind::for_row(alien_row);
        let y = row_y(formation_row + alien_row);
        for col in 0..wave_config.cols {
            let x = col_x(col);
            // Rows alternate sweep direction
            let fly_through = enemies.challenging_stage.then(|| FlyThrough {
                delay: alien_row * FLY_THROUGH_ROW_GAP + col * FLY_THROUGH_COL_GAP,
                progress: 0,
                direction: if alien_row % 2 == 0 { 1 } else { -1 },
            });
            state.spawn(|id| {
                Entity::Alien(Alien {
                    id,
                    row: alien_row,
                    col,
                    x,
                    y,
                    alive: true,
                    points: kind.points(),
                    kind,
                    entering: true,
                    fly_through,
                })
            });
        }
    }

    for i in 0..BARRIER_COUNT {
        let x = PLAYFIELD_WIDTH * (i + 1) / (BARRIER_COUNT + 1) - BARRIER_WIDTH / 2;
        state.spawn(|id| Entity::Barrier(Barrier::intact(id, x, BARRIER_Y)));
    }

    log::info!(
        "Wave {} ({}): {}x{} formation, {} commanders, {} dive-bombers{}",
        state.wave,
        rules.name(),
        wave_config.cols,
        wave_config.rows,
        enemies.commanders,
        enemies.dive_bombers,
        if enemies.challenging_stage {
            ", challenging stage"
        } else {
            ""
        }
    );
}
