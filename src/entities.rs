/// Game entity types: pure data, no logic beyond tiny helpers.
use std::collections::VecDeque;
use std::time::Duration;

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A grid cell.  Coordinates are signed so a head that left the board can
/// still be represented (wall collisions are detected after the move).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when the cell lies inside `[0, cols) × [0, rows)`.
    pub fn in_bounds(self, cols: i32, rows: i32) -> bool {
        self.x >= 0 && self.x < cols && self.y >= 0 && self.y < rows
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

// ── Game flow ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Which overlay screen is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScreenName {
    Menu,
    Game,
    Pause,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    Wall,
    SelfHit,
}

// ── Snake ─────────────────────────────────────────────────────────────────────

/// Snapshot of the snake.  `segments[0]` is the head.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakeState {
    pub segments: VecDeque<Position>,
    pub direction: Direction,
    /// Buffered input, committed on the next move unless it reverses.
    pub next_direction: Direction,
    /// Pending growth, consumed by exactly one move.
    pub growing: bool,
}

impl SnakeState {
    pub fn head(&self) -> Position {
        self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Result of one movement step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub head: Position,
    pub removed_tail: Option<Position>,
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Halves the snake's speed for a while.
    Slow,
    /// Instantly removes up to two tail segments.
    Shrink,
    /// Walls wrap and self-collisions are ignored for a while.
    Ghost,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Slow, PowerUpKind::Shrink, PowerUpKind::Ghost];

    /// Effect length; zero means the effect is instant.
    pub fn duration(self) -> Duration {
        match self {
            PowerUpKind::Slow => Duration::from_millis(5000),
            PowerUpKind::Shrink => Duration::ZERO,
            PowerUpKind::Ghost => Duration::from_millis(3000),
        }
    }

    /// Flat score bonus on collection.
    pub fn points(self) -> u32 {
        match self {
            PowerUpKind::Slow => 50,
            PowerUpKind::Shrink => 100,
            PowerUpKind::Ghost => 150,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Slow => "SLOW",
            PowerUpKind::Shrink => "SHRINK",
            PowerUpKind::Ghost => "GHOST",
        }
    }
}

/// A power-up lying on the board, waiting to be collected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnedPowerUp {
    pub position: Position,
    pub kind: PowerUpKind,
    pub duration: Duration,
    pub points: u32,
}

/// The one timed effect currently running.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUpState {
    pub spawned: Option<SpawnedPowerUp>,
    pub active: Option<ActivePowerUp>,
    /// Probability that a food spawn is replaced by a power-up.
    pub spawn_chance: f64,
}

// ── Score ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreState {
    pub score: u32,
    /// Grows by 5% per 100 points.
    pub difficulty: f64,
    /// Tick scale chosen at game start; below 1.0 is faster than base.
    pub speed_multiplier: f64,
}
