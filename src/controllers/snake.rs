use std::time::Duration;

use crate::compute::{advance, init_snake, set_growing, set_next_direction, shrink, tick_interval};
use crate::config::GameConfig;
use crate::entities::{Direction, GameStatus, Position, PowerUpKind, SnakeState};
use crate::events::{EventKind, GameEvent, Listener};
use crate::scheduler::FixedStep;

/// Owns the snake and its movement clock.
#[derive(Debug)]
pub struct SnakeController {
    cols: i32,
    rows: i32,
    initial_length: usize,
    base_tick: Duration,
    speed_multiplier: f64,
    state: SnakeState,
    clock: FixedStep,
    /// Ghost: wrap around the board edges.
    wrap: bool,
    slowed: bool,
}

impl SnakeController {
    pub fn new(config: &GameConfig) -> Self {
        let base_tick = config.base_tick();
        let mut controller = Self {
            cols: config.cols,
            rows: config.rows,
            initial_length: config.initial_length,
            base_tick,
            speed_multiplier: config.speed_multiplier,
            state: init_snake(Position::new(0, 0), 1, Direction::Right),
            clock: FixedStep::new(base_tick),
            wrap: false,
            slowed: false,
        };
        controller.state = controller.fresh_snake();
        controller.refresh_tick();
        controller
    }

    pub fn state(&self) -> &SnakeState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn tick(&self) -> Duration {
        self.clock.step()
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    fn fresh_snake(&self) -> SnakeState {
        let head = Position::new(self.cols / 2, self.rows / 2);
        init_snake(head, self.initial_length, Direction::Right)
    }

    fn refresh_tick(&mut self) {
        let tick = tick_interval(self.base_tick, self.speed_multiplier, self.slowed);
        self.clock.set_step(tick);
    }

    fn set_effect(&mut self, kind: PowerUpKind, on: bool) {
        match kind {
            PowerUpKind::Ghost => self.wrap = on,
            PowerUpKind::Slow => {
                self.slowed = on;
                self.refresh_tick();
            }
            PowerUpKind::Shrink => {}
        }
    }

    pub fn accumulate(&mut self, delta: Duration) {
        self.clock.accumulate(delta);
    }

    /// Move once if a tick is due.  Returns `None` when no tick is due or
    /// the loop was stopped, which is re-checked before every step.
    pub fn next_step(&mut self) -> Option<GameEvent> {
        if !self.clock.take_step() {
            return None;
        }
        let (state, step) = advance(&self.state, self.cols, self.rows, self.wrap);
        self.state = state;
        Some(GameEvent::SnakeMove {
            head: step.head,
            tail: step.removed_tail,
        })
    }
}

impl Listener for SnakeController {
    const NAME: &'static str = "snake";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::StateChanged,
        EventKind::SpeedChanged,
        EventKind::DirectionChange,
        EventKind::FoodEaten,
        EventKind::SnakeShrink,
        EventKind::PowerUpActivated,
        EventKind::PowerUpExpired,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match *event {
            GameEvent::GameStart { speed_multiplier } => {
                self.state = self.fresh_snake();
                self.speed_multiplier = speed_multiplier;
                self.wrap = false;
                self.slowed = false;
                self.refresh_tick();
                tracing::debug!(length = self.state.len(), "snake spawned");
                return vec![GameEvent::SnakeInit {
                    segments: self.state.segments.iter().copied().collect(),
                }];
            }
            GameEvent::StateChanged { state } => {
                if state == GameStatus::Playing {
                    self.clock.start();
                } else {
                    self.clock.stop();
                }
            }
            GameEvent::SpeedChanged { speed_multiplier } => {
                self.speed_multiplier = speed_multiplier;
                self.refresh_tick();
            }
            GameEvent::DirectionChange { direction } => {
                self.state = set_next_direction(&self.state, direction);
            }
            GameEvent::FoodEaten { .. } => {
                self.state = set_growing(&self.state, true);
            }
            GameEvent::SnakeShrink { count } => {
                let (state, removed) = shrink(&self.state, count);
                self.state = state;
                if !removed.is_empty() {
                    return vec![GameEvent::SnakeShrunk { removed }];
                }
            }
            GameEvent::PowerUpActivated { kind, .. } => self.set_effect(kind, true),
            GameEvent::PowerUpExpired { kind } => self.set_effect(kind, false),
            _ => {}
        }
        Vec::new()
    }
}
