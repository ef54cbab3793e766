//! Controllers driven one event at a time, without a bus.

mod common;

use std::time::Duration;

use crossterm::event::KeyCode;
use rand::rngs::mock::StepRng;
use rand::RngCore;

use snake_game::config::GameConfig;
use snake_game::controllers::*;
use snake_game::entities::*;
use snake_game::events::{GameEvent, Listener};

use common::{ScriptedRng, PICK_GHOST, PICK_SHRINK, PICK_SLOW, ROLL_HIT};

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

fn board(cols: i32, rows: i32) -> GameConfig {
    GameConfig {
        cols,
        rows,
        initial_length: 3,
        base_tick_ms: 100,
        ..GameConfig::default()
    }
}

/// Every roll succeeds and every range pick is its low end.
fn always() -> Box<StepRng> {
    Box::new(StepRng::new(0, 0))
}

/// Every roll fails.
fn never() -> Box<StepRng> {
    Box::new(StepRng::new(u64::MAX, 0))
}

// ── Collision ─────────────────────────────────────────────────────────────────

#[test]
fn wall_hit_ends_the_game_without_probing_food() {
    let mut c = CollisionController::new(&board(10, 10));
    c.on_event(&GameEvent::SnakeInit {
        segments: vec![p(9, 5), p(8, 5), p(7, 5)],
    });

    let out = c.on_event(&GameEvent::SnakeMove {
        head: p(10, 5),
        tail: Some(p(7, 5)),
    });
    assert_eq!(
        out,
        vec![
            GameEvent::SnakeCollision {
                kind: CollisionKind::Wall
            },
            GameEvent::GameOver {
                reason: Some(CollisionKind::Wall)
            },
        ]
    );
}

#[test]
fn head_into_body_is_a_self_hit() {
    let mut c = CollisionController::new(&board(10, 10));
    c.on_event(&GameEvent::SnakeInit {
        segments: vec![p(5, 5), p(4, 5), p(3, 5), p(2, 5)],
    });

    let out = c.on_event(&GameEvent::SnakeMove {
        head: p(4, 5),
        tail: Some(p(2, 5)),
    });
    assert_eq!(
        out[0],
        GameEvent::SnakeCollision {
            kind: CollisionKind::SelfHit
        }
    );
    assert_eq!(out.len(), 2);
}

#[test]
fn safe_move_probes_the_new_head() {
    let mut c = CollisionController::new(&board(10, 10));
    c.on_event(&GameEvent::SnakeInit {
        segments: vec![p(5, 5), p(4, 5)],
    });
    let out = c.on_event(&GameEvent::SnakeMove {
        head: p(6, 5),
        tail: Some(p(4, 5)),
    });
    assert_eq!(out, vec![GameEvent::FoodProbe { position: p(6, 5) }]);
    assert_eq!(c.segments().iter().copied().collect::<Vec<_>>(), vec![p(6, 5), p(5, 5)]);
}

#[test]
fn ghost_ignores_collisions_until_it_expires() {
    let mut c = CollisionController::new(&board(10, 10));
    c.on_event(&GameEvent::SnakeInit {
        segments: vec![p(5, 5), p(4, 5), p(3, 5), p(2, 5)],
    });
    c.on_event(&GameEvent::PowerUpActivated {
        kind: PowerUpKind::Ghost,
        duration: PowerUpKind::Ghost.duration(),
    });
    assert!(c.ghost());

    let out = c.on_event(&GameEvent::SnakeMove {
        head: p(4, 5),
        tail: Some(p(2, 5)),
    });
    assert_eq!(out, vec![GameEvent::FoodProbe { position: p(4, 5) }]);

    c.on_event(&GameEvent::PowerUpExpired {
        kind: PowerUpKind::Ghost,
    });
    assert!(!c.ghost());
}

#[test]
fn slow_does_not_toggle_ghost() {
    let mut c = CollisionController::new(&board(10, 10));
    c.on_event(&GameEvent::PowerUpActivated {
        kind: PowerUpKind::Slow,
        duration: PowerUpKind::Slow.duration(),
    });
    assert!(!c.ghost());
}

// ── Snake ─────────────────────────────────────────────────────────────────────

fn playing_snake(config: &GameConfig) -> SnakeController {
    let mut s = SnakeController::new(config);
    s.on_event(&GameEvent::GameStart {
        speed_multiplier: 1.0,
    });
    s.on_event(&GameEvent::StateChanged {
        state: GameStatus::Playing,
    });
    s
}

#[test]
fn game_start_spawns_centred_snake() {
    let mut s = SnakeController::new(&board(10, 10));
    let out = s.on_event(&GameEvent::GameStart {
        speed_multiplier: 1.0,
    });
    assert_eq!(
        out,
        vec![GameEvent::SnakeInit {
            segments: vec![p(5, 5), p(4, 5), p(3, 5)]
        }]
    );
    assert!(!s.is_running());
}

#[test]
fn moves_once_per_tick() {
    let mut s = playing_snake(&board(10, 10));
    s.accumulate(Duration::from_millis(250));
    assert_eq!(
        s.next_step(),
        Some(GameEvent::SnakeMove {
            head: p(6, 5),
            tail: Some(p(3, 5))
        })
    );
    assert!(s.next_step().is_some());
    assert_eq!(s.next_step(), None);
    assert_eq!(s.state().head(), p(7, 5));
}

#[test]
fn paused_snake_does_not_move() {
    let mut s = playing_snake(&board(10, 10));
    s.on_event(&GameEvent::StateChanged {
        state: GameStatus::Paused,
    });
    s.accumulate(Duration::from_millis(500));
    assert_eq!(s.next_step(), None);
}

#[test]
fn food_grows_the_next_move() {
    let mut s = playing_snake(&board(10, 10));
    s.on_event(&GameEvent::FoodEaten { position: p(6, 5) });
    s.accumulate(Duration::from_millis(100));
    assert_eq!(
        s.next_step(),
        Some(GameEvent::SnakeMove {
            head: p(6, 5),
            tail: None
        })
    );
    assert_eq!(s.state().len(), 4);
}

#[test]
fn shrink_reports_removed_tail() {
    let mut s = playing_snake(&board(10, 10));
    let out = s.on_event(&GameEvent::SnakeShrink { count: 2 });
    assert_eq!(
        out,
        vec![GameEvent::SnakeShrunk {
            removed: vec![p(3, 5), p(4, 5)]
        }]
    );
    assert_eq!(s.state().len(), 1);

    assert!(s.on_event(&GameEvent::SnakeShrink { count: 2 }).is_empty());
}

#[test]
fn slow_doubles_the_tick_and_restores_it() {
    let mut s = playing_snake(&board(10, 10));
    assert_eq!(s.tick(), Duration::from_millis(100));

    s.on_event(&GameEvent::PowerUpActivated {
        kind: PowerUpKind::Slow,
        duration: PowerUpKind::Slow.duration(),
    });
    assert_eq!(s.tick(), Duration::from_millis(200));

    s.on_event(&GameEvent::PowerUpExpired {
        kind: PowerUpKind::Slow,
    });
    assert_eq!(s.tick(), Duration::from_millis(100));
}

#[test]
fn speed_change_rescales_the_tick() {
    let mut s = playing_snake(&board(10, 10));
    s.on_event(&GameEvent::SpeedChanged {
        speed_multiplier: 0.5,
    });
    assert_eq!(s.tick(), Duration::from_millis(50));
}

#[test]
fn ghost_wraps_through_walls() {
    let mut s = playing_snake(&board(10, 10));
    s.on_event(&GameEvent::PowerUpActivated {
        kind: PowerUpKind::Ghost,
        duration: PowerUpKind::Ghost.duration(),
    });
    assert!(s.wraps());

    s.accumulate(Duration::from_millis(500));
    let mut last = None;
    while let Some(event) = s.next_step() {
        last = Some(event);
    }
    // (5,5) heading right, five moves: 6, 7, 8, 9, then 0.
    assert_eq!(
        last,
        Some(GameEvent::SnakeMove {
            head: p(0, 5),
            tail: Some(p(7, 5))
        })
    );
}

// ── Food ──────────────────────────────────────────────────────────────────────

#[test]
fn food_spawns_off_the_snake() {
    let mut f = FoodController::new(&board(10, 10), always());
    let out = f.on_event(&GameEvent::SnakeInit {
        segments: vec![p(0, 0), p(1, 0)],
    });
    assert_eq!(out, vec![GameEvent::FoodSpawn { position: p(2, 0) }]);
    assert_eq!(f.position(), Some(p(2, 0)));
}

#[test]
fn probing_food_eats_and_respawns() {
    let mut f = FoodController::new(&board(10, 10), always());
    f.on_event(&GameEvent::SnakeInit {
        segments: vec![p(1, 0)],
    });
    assert_eq!(f.position(), Some(p(0, 0)));

    f.on_event(&GameEvent::SnakeMove {
        head: p(0, 0),
        tail: Some(p(1, 0)),
    });
    let out = f.on_event(&GameEvent::FoodProbe { position: p(0, 0) });
    assert_eq!(
        out,
        vec![
            GameEvent::FoodEaten { position: p(0, 0) },
            GameEvent::FoodSpawn { position: p(1, 0) },
        ]
    );
}

#[test]
fn probing_an_empty_cell_does_nothing() {
    let mut f = FoodController::new(&board(10, 10), always());
    f.on_event(&GameEvent::SnakeInit {
        segments: vec![p(5, 5)],
    });
    assert!(f.on_event(&GameEvent::FoodProbe { position: p(6, 5) }).is_empty());
}

#[test]
fn power_up_takes_the_food_cell_until_collected() {
    let mut f = FoodController::new(&board(10, 10), always());
    f.on_event(&GameEvent::SnakeInit {
        segments: vec![p(5, 5)],
    });
    f.on_event(&GameEvent::PowerUpSpawn {
        position: p(0, 0),
        kind: PowerUpKind::Slow,
    });
    assert_eq!(f.position(), None);

    let out = f.on_event(&GameEvent::PowerUpCollected {
        position: p(0, 0),
        kind: PowerUpKind::Slow,
    });
    assert_eq!(out, vec![GameEvent::FoodSpawn { position: p(0, 0) }]);
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

fn playing_powerups(rng: Box<dyn RngCore>) -> PowerUpController {
    let mut c = PowerUpController::new(rng);
    c.on_event(&GameEvent::StateChanged {
        state: GameStatus::Playing,
    });
    c
}

#[test]
fn food_spawn_may_become_a_power_up() {
    let mut c = playing_powerups(always());
    let out = c.on_event(&GameEvent::FoodSpawn { position: p(3, 3) });
    assert_eq!(
        out,
        vec![GameEvent::PowerUpSpawn {
            position: p(3, 3),
            kind: PowerUpKind::Slow
        }]
    );

    let mut c = playing_powerups(never());
    assert!(c.on_event(&GameEvent::FoodSpawn { position: p(3, 3) }).is_empty());
}

#[test]
fn second_timed_power_up_expires_the_first_exactly_once() {
    let mut c = playing_powerups(always());

    c.on_event(&GameEvent::FoodSpawn { position: p(1, 1) });
    let first = c.on_event(&GameEvent::FoodProbe { position: p(1, 1) });
    assert_eq!(
        first,
        vec![
            GameEvent::PowerUpActivated {
                kind: PowerUpKind::Slow,
                duration: Duration::from_millis(5000)
            },
            GameEvent::PowerUpCollected {
                position: p(1, 1),
                kind: PowerUpKind::Slow
            },
        ]
    );

    c.on_event(&GameEvent::FoodSpawn { position: p(2, 2) });
    let second = c.on_event(&GameEvent::FoodProbe { position: p(2, 2) });
    let expiries = second
        .iter()
        .filter(|e| matches!(e, GameEvent::PowerUpExpired { .. }))
        .count();
    assert_eq!(expiries, 1);
    assert_eq!(
        second[0],
        GameEvent::PowerUpExpired {
            kind: PowerUpKind::Slow
        }
    );
    assert!(matches!(second[1], GameEvent::PowerUpActivated { .. }));
}

#[test]
fn shrink_during_slow_expires_then_shrinks() {
    let rng = ScriptedRng::new(&[ROLL_HIT, PICK_SLOW, ROLL_HIT, PICK_SHRINK], ROLL_HIT);
    let mut c = playing_powerups(rng);

    c.on_event(&GameEvent::FoodSpawn { position: p(1, 1) });
    c.on_event(&GameEvent::FoodProbe { position: p(1, 1) });
    assert_eq!(c.state().active.map(|a| a.kind), Some(PowerUpKind::Slow));

    assert_eq!(
        c.on_event(&GameEvent::FoodSpawn { position: p(2, 2) }),
        vec![GameEvent::PowerUpSpawn {
            position: p(2, 2),
            kind: PowerUpKind::Shrink
        }]
    );
    let out = c.on_event(&GameEvent::FoodProbe { position: p(2, 2) });
    assert_eq!(
        out,
        vec![
            GameEvent::PowerUpExpired {
                kind: PowerUpKind::Slow
            },
            GameEvent::SnakeShrink { count: 2 },
            GameEvent::PowerUpActivated {
                kind: PowerUpKind::Shrink,
                duration: Duration::ZERO
            },
            GameEvent::PowerUpCollected {
                position: p(2, 2),
                kind: PowerUpKind::Shrink
            },
        ]
    );
    assert!(c.state().active.is_none());
    assert!(c.state().spawned.is_none());

    // Nothing left to expire.
    assert!(c.poll(Duration::from_secs(10)).is_empty());
}

#[test]
fn ghost_collection_arms_a_three_second_effect() {
    let mut c = playing_powerups(ScriptedRng::new(&[ROLL_HIT, PICK_GHOST], ROLL_HIT));
    c.on_event(&GameEvent::FoodSpawn { position: p(4, 4) });
    let out = c.on_event(&GameEvent::FoodProbe { position: p(4, 4) });
    assert_eq!(
        out,
        vec![
            GameEvent::PowerUpActivated {
                kind: PowerUpKind::Ghost,
                duration: Duration::from_millis(3000)
            },
            GameEvent::PowerUpCollected {
                position: p(4, 4),
                kind: PowerUpKind::Ghost
            },
        ]
    );
    assert_eq!(
        c.poll(Duration::from_millis(3000)),
        vec![GameEvent::PowerUpExpired {
            kind: PowerUpKind::Ghost
        }]
    );
}

#[test]
fn timer_expires_only_while_playing() {
    let mut c = playing_powerups(always());
    c.on_event(&GameEvent::FoodSpawn { position: p(1, 1) });
    c.on_event(&GameEvent::FoodProbe { position: p(1, 1) });

    c.on_event(&GameEvent::StateChanged {
        state: GameStatus::Paused,
    });
    assert!(c.poll(Duration::from_secs(10)).is_empty());
    assert!(c.state().active.is_some());

    c.on_event(&GameEvent::StateChanged {
        state: GameStatus::Playing,
    });
    assert!(c.poll(Duration::from_millis(4999)).is_empty());
    assert_eq!(
        c.poll(Duration::from_millis(1)),
        vec![GameEvent::PowerUpExpired {
            kind: PowerUpKind::Slow
        }]
    );
    assert!(c.poll(Duration::from_millis(1)).is_empty());
}

#[test]
fn score_lowers_spawn_chance() {
    let mut c = playing_powerups(always());
    c.on_event(&GameEvent::ScoreUpdated {
        score: 300,
        difficulty: 1.15,
    });
    assert_eq!(c.state().spawn_chance, 0.14);

    c.on_event(&GameEvent::GameStart {
        speed_multiplier: 1.0,
    });
    assert_eq!(c.state().spawn_chance, 0.15);
}

// ── Score ─────────────────────────────────────────────────────────────────────

#[test]
fn score_reports_every_change() {
    let mut s = ScoreController::new(1.0);
    assert_eq!(
        s.on_event(&GameEvent::FoodEaten { position: p(0, 0) }),
        vec![GameEvent::ScoreUpdated {
            score: 10,
            difficulty: 1.0
        }]
    );
    assert_eq!(
        s.on_event(&GameEvent::PowerUpCollected {
            position: p(0, 0),
            kind: PowerUpKind::Ghost
        }),
        vec![GameEvent::ScoreUpdated {
            score: 160,
            difficulty: 1.05
        }]
    );

    let reset = s.on_event(&GameEvent::GameStart {
        speed_multiplier: 0.5,
    });
    assert_eq!(
        reset,
        vec![GameEvent::ScoreUpdated {
            score: 0,
            difficulty: 1.0
        }]
    );
    s.on_event(&GameEvent::FoodEaten { position: p(0, 0) });
    assert_eq!(s.state().score, 20);
}

// ── Game state & screens ──────────────────────────────────────────────────────

#[test]
fn start_emits_state_then_speed() {
    let mut g = GameStateController::new();
    let out = g.on_event(&GameEvent::GameStart {
        speed_multiplier: 0.8,
    });
    assert_eq!(
        out,
        vec![
            GameEvent::StateChanged {
                state: GameStatus::Playing
            },
            GameEvent::SpeedChanged {
                speed_multiplier: 0.8
            },
        ]
    );
    assert!(g
        .on_event(&GameEvent::GameStart {
            speed_multiplier: 0.8
        })
        .is_empty());
}

#[test]
fn illegal_requests_are_dropped() {
    let mut g = GameStateController::new();
    assert!(g.on_event(&GameEvent::GamePause).is_empty());
    assert!(g.on_event(&GameEvent::GameResume).is_empty());
    assert!(g.on_event(&GameEvent::GameOver { reason: None }).is_empty());
    assert_eq!(g.status(), GameStatus::Menu);
}

#[test]
fn overlays_follow_status() {
    let mut s = ScreenController::new();
    assert_eq!(s.overlay().map(|o| o.title), Some("S N A K E"));

    s.on_event(&GameEvent::StateChanged {
        state: GameStatus::Playing,
    });
    assert_eq!(s.current(), ScreenName::Game);
    assert!(s.overlay().is_none());

    s.on_event(&GameEvent::ScoreUpdated {
        score: 70,
        difficulty: 1.0,
    });
    s.on_event(&GameEvent::StateChanged {
        state: GameStatus::GameOver,
    });
    let overlay = s.overlay().unwrap();
    assert_eq!(overlay.title, "GAME OVER");
    assert!(overlay.lines.contains(&"Final Score: 70".to_string()));
    assert_eq!(s.final_score(), 70);
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn keys_map_to_actions() {
    use snake_game::entities::Direction::*;

    assert_eq!(map_key(KeyCode::Up), Some(Action::Steer(Up)));
    assert_eq!(map_key(KeyCode::Char('w')), Some(Action::Steer(Up)));
    assert_eq!(map_key(KeyCode::Char('A')), Some(Action::Steer(Left)));
    assert_eq!(map_key(KeyCode::Char('s')), Some(Action::Steer(Down)));
    assert_eq!(map_key(KeyCode::Right), Some(Action::Steer(Right)));
    assert_eq!(map_key(KeyCode::Char(' ')), Some(Action::Toggle));
    assert_eq!(map_key(KeyCode::Esc), Some(Action::Quit));
    assert_eq!(map_key(KeyCode::Char('x')), None);
}

#[test]
fn space_depends_on_status() {
    let mut i = InputController::new(1.0);
    assert_eq!(
        i.handle_key(KeyCode::Char(' ')),
        vec![GameEvent::GameStart {
            speed_multiplier: 1.0
        }]
    );

    i.on_event(&GameEvent::StateChanged {
        state: GameStatus::Playing,
    });
    assert_eq!(i.handle_key(KeyCode::Char(' ')), vec![GameEvent::GamePause]);

    i.on_event(&GameEvent::StateChanged {
        state: GameStatus::Paused,
    });
    assert_eq!(i.handle_key(KeyCode::Char(' ')), vec![GameEvent::GameResume]);
}

#[test]
fn steering_only_while_playing() {
    let mut i = InputController::new(1.0);
    assert!(i.handle_key(KeyCode::Left).is_empty());
    assert_eq!(i.last_direction(), None);

    i.on_event(&GameEvent::StateChanged {
        state: GameStatus::Playing,
    });
    assert_eq!(
        i.handle_key(KeyCode::Left),
        vec![GameEvent::DirectionChange {
            direction: Direction::Left
        }]
    );
    assert_eq!(i.last_direction(), Some(Direction::Left));
    assert!(i.handle_key(KeyCode::Char('q')).is_empty());
}
