use std::collections::{HashSet, VecDeque};

use rand::RngCore;

use crate::compute::pick_spawn_cell;
use crate::config::GameConfig;
use crate::entities::Position;
use crate::events::{EventKind, GameEvent, Listener};

/// Keeps exactly one food item on the board.
///
/// New food avoids the snake and any power-up lying on the board.
pub struct FoodController {
    cols: i32,
    rows: i32,
    position: Option<Position>,
    snake: VecDeque<Position>,
    powerup: Option<Position>,
    rng: Box<dyn RngCore>,
}

impl FoodController {
    pub fn new(config: &GameConfig, rng: Box<dyn RngCore>) -> Self {
        Self {
            cols: config.cols,
            rows: config.rows,
            position: None,
            snake: VecDeque::new(),
            powerup: None,
            rng,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    fn spawn(&mut self) -> GameEvent {
        let mut occupied: HashSet<Position> = self.snake.iter().copied().collect();
        occupied.extend(self.powerup);
        let position = pick_spawn_cell(&mut self.rng, self.cols, self.rows, &occupied);
        self.position = Some(position);
        tracing::debug!(?position, "food spawned");
        GameEvent::FoodSpawn { position }
    }
}

impl Listener for FoodController {
    const NAME: &'static str = "food";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::SnakeInit,
        EventKind::SnakeMove,
        EventKind::SnakeShrunk,
        EventKind::FoodProbe,
        EventKind::PowerUpSpawn,
        EventKind::PowerUpCollected,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match event {
            GameEvent::GameStart { .. } => {
                self.position = None;
                self.powerup = None;
                self.snake.clear();
            }
            GameEvent::SnakeInit { segments } => {
                self.snake = segments.iter().copied().collect();
                return vec![self.spawn()];
            }
            GameEvent::SnakeMove { head, tail } => {
                self.snake.push_front(*head);
                if tail.is_some() {
                    self.snake.pop_back();
                }
            }
            GameEvent::SnakeShrunk { removed } => {
                for _ in removed {
                    if self.snake.len() > 1 {
                        self.snake.pop_back();
                    }
                }
            }
            GameEvent::FoodProbe { position } if self.position == Some(*position) => {
                self.position = None;
                let eaten = GameEvent::FoodEaten { position: *position };
                return vec![eaten, self.spawn()];
            }
            GameEvent::PowerUpSpawn { position, .. } => {
                // The power-up takes the food's place.
                self.powerup = Some(*position);
                if self.position == Some(*position) {
                    self.position = None;
                }
            }
            GameEvent::PowerUpCollected { .. } => {
                self.powerup = None;
                if self.position.is_none() {
                    return vec![self.spawn()];
                }
            }
            _ => {}
        }
        Vec::new()
    }
}
