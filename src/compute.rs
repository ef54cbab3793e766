/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// snapshot (and, where needed, an RNG handle) and returns a brand-new
/// snapshot plus whatever happened.  Side effects are limited to the
/// injected RNG.  Controllers own the current snapshot and swap it.
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use rand::Rng;

use crate::entities::{
    ActivePowerUp, CollisionKind, Direction, GameStatus, Position, PowerUpKind, PowerUpState,
    ScoreState, ScreenName, SnakeState, SpawnedPowerUp, Step,
};

// ── Tuning tables ─────────────────────────────────────────────────────────────

/// Spawn chance in percent at game start.
const SPAWN_CHANCE_START_PCT: i64 = 15;
/// Lower bound once the score has eroded the chance.
const SPAWN_CHANCE_FLOOR_PCT: i64 = 5;
/// One percent is lost per this many points.
const SPAWN_CHANCE_SCORE_STEP: u32 = 200;

pub const MIN_SPAWN_CHANCE: f64 = 0.05;
pub const MAX_SPAWN_CHANCE: f64 = 1.0;

const BASE_FOOD_POINTS: f64 = 10.0;
/// Difficulty gains 5% per this many points.
const DIFFICULTY_SCORE_STEP: u32 = 100;

/// Tail segments removed by the Shrink power-up.
pub const SHRINK_SEGMENTS: usize = 2;

/// The snake never ticks faster than this.
pub const MIN_TICK: Duration = Duration::from_millis(20);
/// Slow stretches the tick interval by this factor.
const SLOW_FACTOR: u32 = 2;

// ── Snake ─────────────────────────────────────────────────────────────────────

/// Build a straight snake of `length` cells with its tail laid out behind
/// `head`, opposite the heading.
pub fn init_snake(head: Position, length: usize, direction: Direction) -> SnakeState {
    let (dx, dy) = direction.opposite().delta();
    let segments = (0..length.max(1) as i32)
        .map(|i| Position::new(head.x + dx * i, head.y + dy * i))
        .collect();
    SnakeState {
        segments,
        direction,
        next_direction: direction,
        growing: false,
    }
}

/// Buffer a direction.  Only the last one buffered before a tick counts;
/// if it reverses the current heading the move keeps the old direction.
pub fn set_next_direction(state: &SnakeState, direction: Direction) -> SnakeState {
    SnakeState {
        next_direction: direction,
        ..state.clone()
    }
}

pub fn set_growing(state: &SnakeState, growing: bool) -> SnakeState {
    SnakeState {
        growing,
        ..state.clone()
    }
}

/// Advance the snake by one cell.
///
/// With `wrap` the head is folded back onto the board; without it the head
/// may leave the board and the collision detector decides what that means.
pub fn advance(state: &SnakeState, cols: i32, rows: i32, wrap: bool) -> (SnakeState, Step) {
    let direction = if state.next_direction == state.direction.opposite() {
        state.direction
    } else {
        state.next_direction
    };

    let (dx, dy) = direction.delta();
    let head = state.head();
    let mut next = Position::new(head.x + dx, head.y + dy);
    if wrap {
        next = Position::new(next.x.rem_euclid(cols), next.y.rem_euclid(rows));
    }

    let mut segments: VecDeque<Position> = state.segments.clone();
    segments.push_front(next);
    let removed_tail = if state.growing {
        None
    } else {
        segments.pop_back()
    };

    let new_state = SnakeState {
        segments,
        direction,
        next_direction: state.next_direction,
        growing: false,
    };
    (
        new_state,
        Step {
            head: next,
            removed_tail,
        },
    )
}

/// Remove up to `count` tail segments, never dropping below one segment.
/// Returns the removed cells, tail-most first.
pub fn shrink(state: &SnakeState, count: usize) -> (SnakeState, Vec<Position>) {
    let mut segments = state.segments.clone();
    let mut removed = Vec::new();
    while removed.len() < count && segments.len() > 1 {
        if let Some(tail) = segments.pop_back() {
            removed.push(tail);
        }
    }
    (
        SnakeState {
            segments,
            ..state.clone()
        },
        removed,
    )
}

/// Movement interval for a base tick, a speed multiplier and the Slow effect.
pub fn tick_interval(base: Duration, speed_multiplier: f64, slowed: bool) -> Duration {
    let nanos = (base.as_nanos() as f64 * speed_multiplier.max(0.0)).round() as u64;
    let scaled = Duration::from_nanos(nanos).max(MIN_TICK);
    if slowed {
        scaled * SLOW_FACTOR
    } else {
        scaled
    }
}

// ── Collision ─────────────────────────────────────────────────────────────────

/// Classify the head after a move.  `segments[0]` must already be the new
/// head.  Walls are checked first; a wall hit skips the self check.
pub fn check_collision(
    segments: &VecDeque<Position>,
    cols: i32,
    rows: i32,
    ghost: bool,
) -> Option<CollisionKind> {
    if ghost {
        return None;
    }
    let head = *segments.front()?;
    if !head.in_bounds(cols, rows) {
        return Some(CollisionKind::Wall);
    }
    if segments.iter().skip(1).any(|&segment| segment == head) {
        return Some(CollisionKind::SelfHit);
    }
    None
}

// ── Food ──────────────────────────────────────────────────────────────────────

/// Pick a cell for new food, uniformly among cells not in `occupied`.
/// A full board falls back to any cell.
pub fn pick_spawn_cell(
    rng: &mut impl Rng,
    cols: i32,
    rows: i32,
    occupied: &HashSet<Position>,
) -> Position {
    let free: Vec<Position> = (0..rows)
        .flat_map(|y| (0..cols).map(move |x| Position::new(x, y)))
        .filter(|cell| !occupied.contains(cell))
        .collect();

    if free.is_empty() {
        Position::new(rng.gen_range(0..cols), rng.gen_range(0..rows))
    } else {
        free[rng.gen_range(0..free.len())]
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

pub fn init_powerups() -> PowerUpState {
    PowerUpState {
        spawned: None,
        active: None,
        spawn_chance: SPAWN_CHANCE_START_PCT as f64 / 100.0,
    }
}

pub fn clamp_spawn_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        return MIN_SPAWN_CHANCE;
    }
    chance.clamp(MIN_SPAWN_CHANCE, MAX_SPAWN_CHANCE)
}

/// 15%, minus one point per 200 score, never below 5%.
pub fn spawn_chance_for_score(score: u32) -> f64 {
    let pct = (SPAWN_CHANCE_START_PCT - i64::from(score / SPAWN_CHANCE_SCORE_STEP))
        .max(SPAWN_CHANCE_FLOOR_PCT);
    clamp_spawn_chance(pct as f64 / 100.0)
}

pub fn with_spawn_chance(state: &PowerUpState, chance: f64) -> PowerUpState {
    PowerUpState {
        spawn_chance: clamp_spawn_chance(chance),
        ..state.clone()
    }
}

pub fn make_powerup(position: Position, kind: PowerUpKind) -> SpawnedPowerUp {
    SpawnedPowerUp {
        position,
        kind,
        duration: kind.duration(),
        points: kind.points(),
    }
}

/// Roll for a power-up on a fresh food cell.  Nothing spawns while another
/// power-up is still lying on the board.
pub fn maybe_spawn(
    state: &PowerUpState,
    food: Position,
    rng: &mut impl Rng,
) -> (PowerUpState, Option<SpawnedPowerUp>) {
    if state.spawned.is_some() || !rng.gen_bool(clamp_spawn_chance(state.spawn_chance)) {
        return (state.clone(), None);
    }
    let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
    let powerup = make_powerup(food, kind);
    (
        PowerUpState {
            spawned: Some(powerup),
            ..state.clone()
        },
        Some(powerup),
    )
}

/// What happened when the head reached a power-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collection {
    pub powerup: SpawnedPowerUp,
    /// The effect that was running and got cut short, if any.
    pub expired: Option<PowerUpKind>,
}

/// Collect the spawned power-up if the head is on it.  Any running effect
/// ends; timed kinds become the new active effect.
pub fn collect(state: &PowerUpState, head: Position) -> (PowerUpState, Option<Collection>) {
    let Some(powerup) = state.spawned.filter(|p| p.position == head) else {
        return (state.clone(), None);
    };

    let expired = state.active.map(|a| a.kind);
    let active = (!powerup.duration.is_zero()).then_some(ActivePowerUp {
        kind: powerup.kind,
        remaining: powerup.duration,
    });

    (
        PowerUpState {
            spawned: None,
            active,
            spawn_chance: state.spawn_chance,
        },
        Some(Collection { powerup, expired }),
    )
}

/// Run the active effect's clock.  Returns the kind that ran out, if any.
pub fn tick_powerups(state: &PowerUpState, delta: Duration) -> (PowerUpState, Option<PowerUpKind>) {
    let Some(active) = state.active else {
        return (state.clone(), None);
    };
    if delta >= active.remaining {
        return (
            PowerUpState {
                active: None,
                ..state.clone()
            },
            Some(active.kind),
        );
    }
    (
        PowerUpState {
            active: Some(ActivePowerUp {
                remaining: active.remaining - delta,
                ..active
            }),
            ..state.clone()
        },
        None,
    )
}

// ── Score ─────────────────────────────────────────────────────────────────────

pub fn init_score(speed_multiplier: f64) -> ScoreState {
    ScoreState {
        score: 0,
        difficulty: 1.0,
        speed_multiplier,
    }
}

/// 1.0 plus 5% per full 100 points.
pub fn difficulty_for(score: u32) -> f64 {
    let levels = f64::from(score / DIFFICULTY_SCORE_STEP);
    (100.0 + 5.0 * levels) / 100.0
}

/// Extra points per food for games faster than the base tick.
pub fn speed_bonus(speed_multiplier: f64) -> u32 {
    if speed_multiplier <= 0.0 {
        return 0;
    }
    (BASE_FOOD_POINTS * (1.0 / speed_multiplier - 1.0)).floor().max(0.0) as u32
}

pub fn food_points(state: &ScoreState) -> u32 {
    (BASE_FOOD_POINTS * state.difficulty).round() as u32 + speed_bonus(state.speed_multiplier)
}

fn add_points(state: &ScoreState, points: u32) -> ScoreState {
    let score = state.score.saturating_add(points);
    ScoreState {
        score,
        difficulty: difficulty_for(score),
        ..*state
    }
}

pub fn add_food(state: &ScoreState) -> ScoreState {
    add_points(state, food_points(state))
}

pub fn add_powerup(state: &ScoreState, kind: PowerUpKind) -> ScoreState {
    add_points(state, kind.points())
}

// ── Game flow ─────────────────────────────────────────────────────────────────

/// A request to change the game's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameIntent {
    Start,
    Pause,
    Resume,
    End,
}

/// The status an intent leads to, or `None` when the current status does
/// not allow it.
pub fn transition(current: GameStatus, intent: GameIntent) -> Option<GameStatus> {
    match (current, intent) {
        (GameStatus::Menu | GameStatus::GameOver, GameIntent::Start) => Some(GameStatus::Playing),
        (GameStatus::Playing, GameIntent::Pause) => Some(GameStatus::Paused),
        (GameStatus::Paused, GameIntent::Resume) => Some(GameStatus::Playing),
        (GameStatus::Playing, GameIntent::End) => Some(GameStatus::GameOver),
        _ => None,
    }
}

pub fn screen_for(status: GameStatus) -> ScreenName {
    match status {
        GameStatus::Menu => ScreenName::Menu,
        GameStatus::Playing => ScreenName::Game,
        GameStatus::Paused => ScreenName::Pause,
        GameStatus::GameOver => ScreenName::GameOver,
    }
}
