//! Action router
//!
//! `apply` is the single entry point: it checks the allow-table for the
//! current status, clones the state and hands it to one sub-reducer.
//! Anything illegal for the phase, or aimed at a missing/ineligible
//! player, is a silent no-op.

use super::action::{Action, ActionKind, GameEvent};
use super::enhanced::forget_captive;
use super::entity::{Bullet, Entity};
use super::mode::{ModeRules, rules_for};
use super::scaling::scale;
use super::state::{GameState, GameStatus, InputState, Player, spawn_x};
use super::tick::tick;
use super::wave::generate_wave;
use crate::consts::*;

/// Result of applying one action
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    /// Ordered notifications for the orchestrator
    pub events: Vec<GameEvent>,
    /// Whether the orchestrator should durably save `state`
    pub persist: bool,
}

impl Transition {
    fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
            persist: false,
        }
    }
}

/// Actions accepted in each status; absent pairs are rejected
const ALLOW_TABLE: &[(GameStatus, &[ActionKind])] = &[
    (
        GameStatus::Waiting,
        &[
            ActionKind::PlayerJoin,
            ActionKind::PlayerLeave,
            ActionKind::PlayerReady,
            ActionKind::PlayerUnready,
            ActionKind::StartSolo,
            ActionKind::StartCountdown,
        ],
    ),
    (
        GameStatus::Countdown,
        &[
            ActionKind::CountdownTick,
            ActionKind::CountdownCancel,
            ActionKind::PlayerLeave,
        ],
    ),
    (
        GameStatus::WipeExit,
        &[ActionKind::Tick, ActionKind::PlayerLeave],
    ),
    (
        GameStatus::WipeHold,
        &[ActionKind::Tick, ActionKind::PlayerLeave],
    ),
    (
        GameStatus::WipeReveal,
        &[ActionKind::Tick, ActionKind::PlayerLeave],
    ),
    (
        GameStatus::Playing,
        &[
            ActionKind::Tick,
            ActionKind::PlayerInput,
            ActionKind::PlayerShoot,
            ActionKind::PlayerLeave,
            ActionKind::NextWave,
        ],
    ),
    (GameStatus::GameOver, &[]),
];

/// Is `kind` legal while the room is in `status`?
pub fn action_allowed(status: GameStatus, kind: ActionKind) -> bool {
    ALLOW_TABLE
        .iter()
        .any(|(allowed_status, kinds)| *allowed_status == status && kinds.contains(&kind))
}

/// Apply one action to a room. The input state is never modified.
pub fn apply(state: &GameState, action: &Action) -> Transition {
    let kind = action.kind();
    if !action_allowed(state.status, kind) {
        log::trace!("{:?} rejected while {:?}", kind, state.status);
        return Transition::unchanged(state);
    }

    let mut next = state.clone();
    let mut events = Vec::new();
    let rules = rules_for(next.enhanced_mode);

    let persist = match action {
        Action::Tick => advance(&mut next, rules, &mut events),
        Action::PlayerJoin { player } => join(&mut next, player, &mut events),
        Action::PlayerLeave { player_id } => leave(&mut next, player_id, &mut events),
        Action::PlayerInput { player_id, input } => set_input(&mut next, player_id, *input),
        Action::PlayerShoot { player_id } => shoot(&mut next, player_id),
        Action::PlayerReady { player_id } => ready(&mut next, player_id, &mut events),
        Action::PlayerUnready { player_id } => unready(&mut next, player_id, &mut events),
        Action::StartSolo => start_solo(&mut next, &mut events),
        Action::StartCountdown => start_countdown(&mut next, &mut events),
        Action::CountdownTick => countdown_tick(&mut next, &mut events),
        Action::CountdownCancel { reason } => countdown_cancel(&mut next, reason, &mut events),
        Action::NextWave => next_wave(&mut next),
    };

    Transition {
        state: next,
        events,
        persist,
    }
}

fn advance(state: &mut GameState, rules: &dyn ModeRules, events: &mut Vec<GameEvent>) -> bool {
    if state.status.is_wipe() {
        advance_wipe(state, rules);
        return false;
    }
    tick(state, rules, events);
    state.status == GameStatus::GameOver
}

/// Count down the current wipe phase and move to the next one when it runs out
fn advance_wipe(state: &mut GameState, rules: &dyn ModeRules) {
    state.tick += 1;
    let remaining = state.wipe_ticks_remaining.unwrap_or(0).saturating_sub(1);
    if remaining > 0 {
        state.wipe_ticks_remaining = Some(remaining);
        return;
    }

    match state.status {
        GameStatus::WipeExit => {
            state.entities.clear();
            enter_status(state, GameStatus::WipeHold);
            state.wipe_ticks_remaining = Some(state.config.wipe_hold_ticks);
        }
        GameStatus::WipeHold => {
            state.wave = state.wipe_target_wave.unwrap_or(state.wave + 1);
            generate_wave(state, rules);
            for player in state.players.values_mut() {
                if !player.alive && player.lives > 0 {
                    player.alive = true;
                    player.respawn_at_tick = None;
                    player.input = InputState::default();
                }
            }
            enter_status(state, GameStatus::WipeReveal);
            state.wipe_ticks_remaining = Some(state.config.wipe_reveal_ticks);
        }
        GameStatus::WipeReveal => {
            for entity in &mut state.entities {
                if let Entity::Alien(alien) = entity {
                    alien.entering = false;
                }
            }
            state.wipe_ticks_remaining = None;
            state.wipe_target_wave = None;
            enter_status(state, GameStatus::Playing);
        }
        _ => {}
    }
}

fn enter_status(state: &mut GameState, status: GameStatus) {
    log::info!(
        "Status {:?} -> {:?} (tick {}, wave {})",
        state.status,
        status,
        state.tick,
        state.wave
    );
    state.status = status;
}

fn join(state: &mut GameState, player: &Player, events: &mut Vec<GameEvent>) -> bool {
    if state.players.contains_key(&player.id) {
        return false;
    }
    let Some(slot) = state.free_slot() else {
        return false;
    };

    let player = Player {
        slot,
        ..Player::new(player.id.clone(), player.name.clone())
    };
    log::info!("Player {} joined in slot {}", player.id, slot);
    state.players.insert(player.id.clone(), player.clone());
    state.refresh_mode();
    events.push(GameEvent::PlayerJoined { player });
    true
}

fn leave(state: &mut GameState, player_id: &str, events: &mut Vec<GameEvent>) -> bool {
    if state.players.remove(player_id).is_none() {
        return false;
    }
    state.ready_player_ids.retain(|id| id != player_id);
    forget_captive(state, player_id);
    state.refresh_mode();
    log::info!("Player {} left", player_id);
    events.push(GameEvent::PlayerLeft {
        player_id: player_id.to_string(),
    });
    true
}

fn set_input(state: &mut GameState, player_id: &str, input: InputState) -> bool {
    if let Some(player) = state.players.get_mut(player_id) {
        if player.alive {
            player.input = input;
        }
    }
    false
}

fn shoot(state: &mut GameState, player_id: &str) -> bool {
    let now = state.tick;
    let cooldown = state.config.player_cooldown_ticks;
    let Some(player) = state.players.get_mut(player_id) else {
        return false;
    };
    let cooling = player
        .last_shot_tick
        .is_some_and(|last| now.saturating_sub(last) < cooldown);
    if !player.alive || cooling {
        return false;
    }

    player.last_shot_tick = Some(now);
    let x = player.center_x();
    let owner_id = Some(player.id.clone());
    state.spawn(|id| {
        Entity::Bullet(Bullet {
            id,
            x,
            y: PLAYER_Y - 1,
            owner_id,
            dy: -1,
        })
    });
    false
}

fn ready(state: &mut GameState, player_id: &str, events: &mut Vec<GameEvent>) -> bool {
    if !state.players.contains_key(player_id) || state.is_ready(player_id) {
        return false;
    }
    state.ready_player_ids.push(player_id.to_string());
    events.push(GameEvent::PlayerReady {
        player_id: player_id.to_string(),
    });
    true
}

fn unready(state: &mut GameState, player_id: &str, events: &mut Vec<GameEvent>) -> bool {
    if !state.players.contains_key(player_id) || !state.is_ready(player_id) {
        return false;
    }
    state.ready_player_ids.retain(|id| id != player_id);
    events.push(GameEvent::PlayerUnready {
        player_id: player_id.to_string(),
    });
    true
}

fn start_solo(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if state.player_count() != 1 {
        return false;
    }
    begin_game(state, events);
    true
}

fn start_countdown(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let all_ready = state.players.keys().all(|id| state.is_ready(id));
    if state.player_count() < 2 || !all_ready {
        return false;
    }
    let count = state.config.countdown_seconds;
    state.countdown_remaining = Some(count);
    enter_status(state, GameStatus::Countdown);
    events.push(GameEvent::CountdownTick { count });
    true
}

fn countdown_tick(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let Some(remaining) = state.countdown_remaining else {
        return false;
    };
    let count = remaining.saturating_sub(1);
    if count > 0 {
        state.countdown_remaining = Some(count);
        events.push(GameEvent::CountdownTick { count });
    } else {
        begin_game(state, events);
    }
    true
}

fn countdown_cancel(state: &mut GameState, reason: &str, events: &mut Vec<GameEvent>) -> bool {
    state.countdown_remaining = None;
    enter_status(state, GameStatus::Waiting);
    events.push(GameEvent::CountdownCancelled {
        reason: reason.to_string(),
    });
    true
}

fn next_wave(state: &mut GameState) -> bool {
    if state.living_hostile_count() > 0 {
        return false;
    }
    state.wipe_target_wave = Some(state.wave + 1);
    state.wipe_ticks_remaining = Some(state.config.wipe_exit_ticks);
    enter_status(state, GameStatus::WipeExit);
    true
}

/// Reset the run and head into the first wave's wipe
fn begin_game(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let count = state.player_count();
    let lives = scale(count, &state.config).lives;

    for (index, player) in state.players.values_mut().enumerate() {
        player.x = spawn_x(index, count);
        player.lives = lives;
        player.kills = 0;
        player.alive = true;
        player.input = InputState::default();
        player.last_shot_tick = None;
        player.respawn_at_tick = None;
    }

    state.refresh_mode();
    state.wave = 0;
    state.score = 0;
    state.entities.clear();
    state.countdown_remaining = None;
    state.wipe_target_wave = Some(1);
    state.wipe_ticks_remaining = Some(state.config.wipe_hold_ticks);
    enter_status(state, GameStatus::WipeHold);
    events.push(GameEvent::GameStart);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::action::{GameResult, ScoreSource};
    use crate::sim::entity::{Alien, AlienKind};
    use proptest::prelude::*;

    fn join_action(id: &str) -> Action {
        Action::PlayerJoin {
            player: Player::new(id, id.to_uppercase()),
        }
    }

    fn apply_all(state: &GameState, actions: &[Action]) -> (GameState, Vec<GameEvent>) {
        let mut state = state.clone();
        let mut events = Vec::new();
        for action in actions {
            let transition = apply(&state, action);
            state = transition.state;
            events.extend(transition.events);
        }
        (state, events)
    }

    /// Solo room already in play with an empty field
    fn solo_playing() -> GameState {
        let mut state = GameState::new(2024, GameConfig::default());
        state = apply(&state, &join_action("p1")).state;
        state.status = GameStatus::Playing;
        state.wave = 1;
        let player = state.players.get_mut("p1").unwrap();
        player.lives = 3;
        state
    }

    fn bullets(state: &GameState) -> Vec<&Bullet> {
        state
            .entities
            .iter()
            .filter_map(|e| match e {
                Entity::Bullet(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    fn run_wipe(state: GameState) -> GameState {
        let mut state = state;
        for _ in 0..1000 {
            if state.status == GameStatus::Playing {
                break;
            }
            state = apply(&state, &Action::Tick).state;
        }
        state
    }

    #[test]
    fn test_tick_in_waiting_is_noop() {
        let state = GameState::new(1, GameConfig::default());
        let transition = apply(&state, &Action::Tick);
        assert_eq!(transition.state, state);
        assert_eq!(transition.state.tick, 0);
        assert!(transition.events.is_empty());
        assert!(!transition.persist);
    }

    #[test]
    fn test_join_assigns_lowest_free_slot() {
        let state = GameState::new(1, GameConfig::default());
        let (state, events) = apply_all(&state, &[join_action("a"), join_action("b")]);
        assert_eq!(state.players["a"].slot, 1);
        assert_eq!(state.players["b"].slot, 2);
        assert_eq!(events.len(), 2);

        let state = apply(&state, &Action::PlayerLeave {
            player_id: "a".into(),
        })
        .state;
        let state = apply(&state, &join_action("c")).state;
        assert_eq!(state.players["c"].slot, 1);
    }

    #[test]
    fn test_join_rejects_duplicates_and_full_room() {
        let state = GameState::new(1, GameConfig::default());
        let (state, _) = apply_all(
            &state,
            &[join_action("a"), join_action("b"), join_action("c"), join_action("d")],
        );
        assert_eq!(state.player_count(), MAX_PLAYERS);

        let full = apply(&state, &join_action("e"));
        assert!(!full.persist);
        assert!(full.events.is_empty());
        assert_eq!(full.state, state);

        let duplicate = apply(&state, &join_action("a"));
        assert!(!duplicate.persist);
        assert_eq!(duplicate.state, state);
    }

    #[test]
    fn test_leave_clears_ready_flag() {
        let state = GameState::new(1, GameConfig::default());
        let (state, _) = apply_all(
            &state,
            &[
                join_action("a"),
                Action::PlayerReady {
                    player_id: "a".into(),
                },
            ],
        );
        assert!(state.is_ready("a"));
        let transition = apply(&state, &Action::PlayerLeave {
            player_id: "a".into(),
        });
        assert!(transition.persist);
        assert!(transition.state.ready_player_ids.is_empty());
        assert!(transition.state.players.is_empty());
    }

    #[test]
    fn test_ready_twice_is_noop() {
        let state = GameState::new(1, GameConfig::default());
        let ready = Action::PlayerReady {
            player_id: "a".into(),
        };
        let (state, _) = apply_all(&state, &[join_action("a"), ready.clone()]);
        let again = apply(&state, &ready);
        assert!(!again.persist);
        assert!(again.events.is_empty());

        let unknown = apply(&state, &Action::PlayerUnready {
            player_id: "zz".into(),
        });
        assert!(!unknown.persist);
    }

    #[test]
    fn test_start_solo_requires_one_player() {
        let empty = GameState::new(1, GameConfig::default());
        assert!(!apply(&empty, &Action::StartSolo).persist);

        let solo = apply(&empty, &join_action("a")).state;
        let transition = apply(&solo, &Action::StartSolo);
        assert!(transition.persist);
        assert_eq!(transition.events, vec![GameEvent::GameStart]);
        assert_eq!(transition.state.status, GameStatus::WipeHold);
        assert_eq!(transition.state.wipe_target_wave, Some(1));
        assert_eq!(transition.state.players["a"].lives, 3);

        let duo = apply(&solo, &join_action("b")).state;
        assert!(!apply(&duo, &Action::StartSolo).persist);
    }

    #[test]
    fn test_countdown_needs_everyone_ready() {
        let state = GameState::new(1, GameConfig::default());
        let (state, _) = apply_all(
            &state,
            &[
                join_action("a"),
                join_action("b"),
                Action::PlayerReady {
                    player_id: "a".into(),
                },
            ],
        );
        assert!(!apply(&state, &Action::StartCountdown).persist);

        let state = apply(&state, &Action::PlayerReady {
            player_id: "b".into(),
        })
        .state;
        let transition = apply(&state, &Action::StartCountdown);
        assert!(transition.persist);
        assert_eq!(transition.state.status, GameStatus::Countdown);
        assert_eq!(transition.events, vec![GameEvent::CountdownTick { count: 3 }]);
    }

    #[test]
    fn test_countdown_runs_into_game_start() {
        let state = GameState::new(1, GameConfig::default());
        let (state, _) = apply_all(
            &state,
            &[
                join_action("a"),
                join_action("b"),
                Action::PlayerReady {
                    player_id: "a".into(),
                },
                Action::PlayerReady {
                    player_id: "b".into(),
                },
                Action::StartCountdown,
            ],
        );
        // Join is rejected during the countdown
        assert!(!apply(&state, &join_action("c")).persist);

        let (state, events) = apply_all(
            &state,
            &[Action::CountdownTick, Action::CountdownTick, Action::CountdownTick],
        );
        assert_eq!(
            events,
            vec![
                GameEvent::CountdownTick { count: 2 },
                GameEvent::CountdownTick { count: 1 },
                GameEvent::GameStart,
            ]
        );
        assert_eq!(state.status, GameStatus::WipeHold);
        // Co-op lives: 3 + 1 extra
        assert!(state.players.values().all(|p| p.lives == 4));
        assert!(state.players["a"].x < state.players["b"].x);
    }

    #[test]
    fn test_countdown_cancel_returns_to_waiting() {
        let state = GameState::new(1, GameConfig::default());
        let (state, _) = apply_all(
            &state,
            &[
                join_action("a"),
                join_action("b"),
                Action::PlayerReady {
                    player_id: "a".into(),
                },
                Action::PlayerReady {
                    player_id: "b".into(),
                },
                Action::StartCountdown,
            ],
        );
        let transition = apply(&state, &Action::CountdownCancel {
            reason: "player_left".into(),
        });
        assert_eq!(transition.state.status, GameStatus::Waiting);
        assert_eq!(transition.state.countdown_remaining, None);
        assert_eq!(
            transition.events,
            vec![GameEvent::CountdownCancelled {
                reason: "player_left".into()
            }]
        );
    }

    #[test]
    fn test_wipe_phases_reveal_first_wave() {
        let state = GameState::new(1, GameConfig::default());
        let (state, _) = apply_all(&state, &[join_action("a"), Action::StartSolo]);

        let mut state = state;
        let mut saw_reveal = false;
        for _ in 0..1000 {
            if state.status == GameStatus::WipeReveal {
                saw_reveal = true;
                assert_eq!(state.wave, 1);
                assert!(state.entities.iter().any(
                    |e| matches!(e, Entity::Alien(a) if a.entering)
                ));
            }
            if state.status == GameStatus::Playing {
                break;
            }
            let transition = apply(&state, &Action::Tick);
            assert!(!transition.persist);
            state = transition.state;
        }
        assert!(saw_reveal);
        assert_eq!(state.status, GameStatus::Playing);
        assert!(state.entities.iter().all(
            |e| !matches!(e, Entity::Alien(a) if a.entering)
        ));
        assert_eq!(
            state.tick,
            u64::from(state.config.wipe_hold_ticks + state.config.wipe_reveal_ticks)
        );
    }

    #[test]
    fn test_next_wave_only_when_cleared() {
        let mut state = solo_playing();
        state.spawn(|id| {
            Entity::Alien(Alien {
                id,
                row: 0,
                col: 0,
                x: 10,
                y: 5,
                alive: true,
                points: 10,
                kind: AlienKind::Octopus,
                entering: false,
                fly_through: None,
            })
        });
        assert!(!apply(&state, &Action::NextWave).persist);

        state.entities.clear();
        let transition = apply(&state, &Action::NextWave);
        assert!(transition.persist);
        assert_eq!(transition.state.status, GameStatus::WipeExit);
        assert_eq!(transition.state.wipe_target_wave, Some(2));

        let state = run_wipe(transition.state);
        assert_eq!(state.wave, 2);
        assert!(state.living_hostile_count() > 0);
    }

    #[test]
    fn test_downed_player_revived_between_waves() {
        let mut state = solo_playing();
        {
            let player = state.players.get_mut("p1").unwrap();
            player.alive = false;
            player.lives = 2;
            player.respawn_at_tick = Some(10_000);
        }
        let state = apply(&state, &Action::NextWave).state;
        let state = run_wipe(state);
        let player = &state.players["p1"];
        assert!(player.alive);
        assert_eq!(player.respawn_at_tick, None);
    }

    #[test]
    fn test_shoot_cooldown() {
        let mut state = solo_playing();
        state.players.get_mut("p1").unwrap().last_shot_tick = Some(10);

        state.tick = 14;
        let early = apply(&state, &Action::PlayerShoot {
            player_id: "p1".into(),
        });
        assert!(bullets(&early.state).is_empty());

        state.tick = 16;
        let shot = apply(&state, &Action::PlayerShoot {
            player_id: "p1".into(),
        });
        let fired = bullets(&shot.state);
        assert_eq!(fired.len(), 1);
        let player = &shot.state.players["p1"];
        assert_eq!(fired[0].owner_id.as_deref(), Some("p1"));
        assert_eq!(fired[0].dy, -1);
        assert_eq!(fired[0].x, player.center_x());
        assert_eq!(fired[0].y, PLAYER_Y - 1);
        assert_eq!(player.last_shot_tick, Some(16));
        assert!(!shot.persist);
    }

    #[test]
    fn test_dead_player_cannot_shoot_or_steer() {
        let mut state = solo_playing();
        state.players.get_mut("p1").unwrap().alive = false;
        let shot = apply(&state, &Action::PlayerShoot {
            player_id: "p1".into(),
        });
        assert!(bullets(&shot.state).is_empty());

        let steer = apply(&state, &Action::PlayerInput {
            player_id: "p1".into(),
            input: InputState {
                left: true,
                right: false,
            },
        });
        assert_eq!(steer.state, state);
    }

    #[test]
    fn test_single_shot_clears_wave() {
        let mut state = solo_playing();
        state.players.get_mut("p1").unwrap().x = 60;
        let alien_id = state.spawn(|id| {
            Entity::Alien(Alien {
                id,
                row: 0,
                col: 0,
                x: 60,
                y: PLAYER_Y - 5,
                alive: true,
                points: 30,
                kind: AlienKind::Squid,
                entering: false,
                fly_through: None,
            })
        });

        let shot = apply(&state, &Action::PlayerShoot {
            player_id: "p1".into(),
        });
        assert_eq!(bullets(&shot.state).len(), 1);

        let mut state = shot.state;
        let mut events = Vec::new();
        for _ in 0..20 {
            let transition = apply(&state, &Action::Tick);
            state = transition.state;
            events.extend(transition.events);
            if events.iter().any(|e| matches!(e, GameEvent::WaveComplete { .. })) {
                break;
            }
        }

        assert_eq!(state.score, 30);
        assert_eq!(state.living_hostile_count(), 0);
        let killed = events
            .iter()
            .position(|e| {
                *e == GameEvent::AlienKilled {
                    alien_id,
                    player_id: "p1".into(),
                }
            })
            .unwrap();
        let complete = events
            .iter()
            .position(|e| *e == GameEvent::WaveComplete { wave: 1 })
            .unwrap();
        assert!(killed < complete);
        assert!(events.contains(&GameEvent::ScoreAwarded {
            player_id: "p1".into(),
            points: 30,
            source: ScoreSource::Alien
        }));
    }

    #[test]
    fn test_game_over_tick_persists() {
        let mut state = solo_playing();
        state.spawn(|id| {
            Entity::Alien(Alien {
                id,
                row: 0,
                col: 0,
                x: 10,
                y: GAME_OVER_Y,
                alive: true,
                points: 10,
                kind: AlienKind::Octopus,
                entering: false,
                fly_through: None,
            })
        });
        let transition = apply(&state, &Action::Tick);
        assert!(transition.persist);
        assert_eq!(transition.state.status, GameStatus::GameOver);
        assert!(transition.events.contains(&GameEvent::GameOver {
            result: GameResult::Invaded
        }));

        // Terminal
        let after = apply(&transition.state, &Action::Tick);
        assert_eq!(after.state, transition.state);
        assert!(after.events.is_empty());
    }

    #[test]
    fn test_apply_never_mutates_input() {
        let state = solo_playing();
        let snapshot = state.clone();
        let _ = apply(&state, &Action::PlayerShoot {
            player_id: "p1".into(),
        });
        let _ = apply(&state, &Action::Tick);
        assert_eq!(state, snapshot);
    }

    fn arb_status() -> impl Strategy<Value = GameStatus> {
        proptest::sample::select(GameStatus::ALL.to_vec())
    }

    fn arb_kind() -> impl Strategy<Value = ActionKind> {
        proptest::sample::select(ActionKind::ALL.to_vec())
    }

    fn action_of(kind: ActionKind) -> Action {
        let player_id = "p1".to_string();
        match kind {
            ActionKind::Tick => Action::Tick,
            ActionKind::PlayerJoin => join_action("p9"),
            ActionKind::PlayerLeave => Action::PlayerLeave { player_id },
            ActionKind::PlayerInput => Action::PlayerInput {
                player_id,
                input: InputState {
                    left: true,
                    right: false,
                },
            },
            ActionKind::PlayerShoot => Action::PlayerShoot { player_id },
            ActionKind::PlayerReady => Action::PlayerReady { player_id },
            ActionKind::PlayerUnready => Action::PlayerUnready { player_id },
            ActionKind::StartSolo => Action::StartSolo,
            ActionKind::StartCountdown => Action::StartCountdown,
            ActionKind::CountdownTick => Action::CountdownTick,
            ActionKind::CountdownCancel => Action::CountdownCancel {
                reason: "test".into(),
            },
            ActionKind::NextWave => Action::NextWave,
        }
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            4 => Just(Action::Tick),
            1 => Just(Action::PlayerShoot { player_id: "p1".into() }),
            1 => any::<(bool, bool)>().prop_map(|(left, right)| Action::PlayerInput {
                player_id: "p1".into(),
                input: InputState { left, right },
            }),
            1 => Just(Action::NextWave),
        ]
    }

    proptest! {
        #[test]
        fn prop_disallowed_actions_are_noops(status in arb_status(), kind in arb_kind()) {
            prop_assume!(!action_allowed(status, kind));
            let mut state = solo_playing();
            state.status = status;
            let transition = apply(&state, &action_of(kind));
            prop_assert_eq!(&transition.state, &state);
            prop_assert!(transition.events.is_empty());
            prop_assert!(!transition.persist);
        }

        #[test]
        fn prop_replay_is_deterministic(
            seed in any::<u64>(),
            enhanced in any::<bool>(),
            actions in proptest::collection::vec(arb_action(), 0..200),
        ) {
            let config = GameConfig::default();
            let start = if enhanced {
                GameState::enhanced(seed, config)
            } else {
                GameState::new(seed, config)
            };
            let (start, _) = apply_all(&start, &[join_action("p1"), Action::StartSolo]);

            let (a, events_a) = apply_all(&start, &actions);
            let (b, events_b) = apply_all(&start, &actions);
            let json_a = serde_json::to_string(&a).unwrap();
            let json_b = serde_json::to_string(&b).unwrap();
            prop_assert_eq!(json_a, json_b);
            prop_assert_eq!(events_a, events_b);
        }
    }
}
