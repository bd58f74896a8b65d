//! Invaders Sim headless runner
//!
//! Plays a scripted solo session against the simulation core and writes
//! every emitted event to stdout as one JSON object per line.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use invaders_sim::consts::ALIEN_WIDTH;
use invaders_sim::sim::{Action, Entity, GameEvent, GameState, GameStatus, InputState, Player};
use invaders_sim::{GameConfig, apply};

const PILOT_ID: &str = "pilot";

#[derive(Parser, Debug)]
#[command(name = "invaders-sim")]
#[command(about = "Play a scripted solo session and print events as JSON lines")]
struct Cli {
    /// Use the enhanced rule set (commanders, dive-bombers, challenging stages)
    #[arg(long)]
    enhanced: bool,
    #[arg(long, default_value_t = 0x1DEA_F00D)]
    seed: u64,
    /// Partial JSON game config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this many simulation ticks
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,
}

/// Steer under the nearest living alien and keep firing
fn pilot_actions(state: &GameState) -> Vec<Action> {
    let Some(pilot) = state.players.get(PILOT_ID) else {
        return Vec::new();
    };
    if !pilot.alive {
        return Vec::new();
    }

    let target = state
        .entities
        .iter()
        .filter(|e| e.is_living_hostile())
        .map(|e| e.position().0 + ALIEN_WIDTH / 2)
        .min_by_key(|x| (x - pilot.center_x()).abs());

    let input = match target {
        Some(x) if x < pilot.center_x() => InputState {
            left: true,
            right: false,
        },
        Some(x) if x > pilot.center_x() => InputState {
            left: false,
            right: true,
        },
        _ => InputState::default(),
    };

    vec![
        Action::PlayerInput {
            player_id: PILOT_ID.to_string(),
            input,
        },
        Action::PlayerShoot {
            player_id: PILOT_ID.to_string(),
        },
    ]
}

fn emit(out: &mut impl Write, events: &[GameEvent]) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            GameConfig::from_json(&json)?
        }
        None => GameConfig::default(),
    };

    let mut state = if cli.enhanced {
        GameState::enhanced(cli.seed, config)
    } else {
        GameState::new(cli.seed, config)
    };
    log::info!(
        "Invaders Sim starting (seed {}, {} mode)",
        cli.seed,
        if cli.enhanced { "enhanced" } else { "classic" }
    );

    let mut out = BufWriter::new(io::stdout().lock());

    let opening = [
        Action::PlayerJoin {
            player: Player::new(PILOT_ID, "Pilot"),
        },
        Action::StartSolo,
    ];
    for action in &opening {
        let transition = apply(&state, action);
        emit(&mut out, &transition.events)?;
        state = transition.state;
    }

    while state.tick < cli.ticks && state.status != GameStatus::GameOver {
        let mut actions = pilot_actions(&state);
        if state.status == GameStatus::Playing
            && !state.entities.iter().any(Entity::is_living_hostile)
        {
            actions.push(Action::NextWave);
        } else {
            actions.push(Action::Tick);
        }

        for action in &actions {
            let transition = apply(&state, action);
            emit(&mut out, &transition.events)?;
            if transition.persist {
                log::debug!("Checkpoint at tick {}", transition.state.tick);
            }
            state = transition.state;
        }
    }
    out.flush()?;

    log::info!(
        "Finished at tick {}: wave {}, score {}, status {:?}",
        state.tick,
        state.wave,
        state.score,
        state.status
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_sim::sim::{Alien, AlienKind};

    #[test]
    fn test_cli_defaults_and_flags() {
        let cli = Cli::try_parse_from(["invaders-sim"]).unwrap();
        assert!(!cli.enhanced);
        assert_eq!(cli.seed, 0x1DEA_F00D);
        assert_eq!(cli.ticks, 20_000);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from([
            "invaders-sim",
            "--enhanced",
            "--seed",
            "7",
            "--ticks",
            "300",
            "--config",
            "room.json",
        ])
        .unwrap();
        assert!(cli.enhanced);
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.ticks, 300);
        assert_eq!(cli.config, Some(PathBuf::from("room.json")));
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["invaders-sim", "--seed", "soon"]).is_err());
    }

    #[test]
    fn test_pilot_holds_under_alien_centre() {
        let mut state = GameState::new(1, GameConfig::default());
        let mut pilot = Player::new(PILOT_ID, "Pilot");
        pilot.x = 40;
        let centre = pilot.center_x();
        state.players.insert(pilot.id.clone(), pilot);
        state.spawn(|id| {
            Entity::Alien(Alien {
                id,
                row: 0,
                col: 0,
                x: centre - ALIEN_WIDTH / 2,
                y: 5,
                alive: true,
                points: 10,
                kind: AlienKind::Octopus,
                entering: false,
                fly_through: None,
            })
        });

        let actions = pilot_actions(&state);
        assert!(matches!(
            &actions[0],
            Action::PlayerInput { input, .. } if *input == InputState::default()
        ));
        assert!(matches!(&actions[1], Action::PlayerShoot { .. }));
    }
}
