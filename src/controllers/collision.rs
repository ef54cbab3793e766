use std::collections::VecDeque;

use crate::compute::check_collision;
use crate::config::GameConfig;
use crate::entities::{CollisionKind, Position, PowerUpKind};
use crate::events::{EventKind, GameEvent, Listener};

/// Checks every new head against the walls and the body.
///
/// Keeps its own copy of the segment list, fed by the snake's events, so it
/// never reaches into the snake controller.
#[derive(Debug)]
pub struct CollisionController {
    cols: i32,
    rows: i32,
    segments: VecDeque<Position>,
    ghost: bool,
}

impl CollisionController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            cols: config.cols,
            rows: config.rows,
            segments: VecDeque::new(),
            ghost: false,
        }
    }

    pub fn segments(&self) -> &VecDeque<Position> {
        &self.segments
    }

    pub fn ghost(&self) -> bool {
        self.ghost
    }

    fn on_head(&mut self, head: Position, tail: Option<Position>) -> Vec<GameEvent> {
        self.segments.push_front(head);
        if tail.is_some() {
            self.segments.pop_back();
        }

        match check_collision(&self.segments, self.cols, self.rows, self.ghost) {
            Some(kind) => {
                tracing::debug!(?kind, ?head, "collision");
                collision_events(kind)
            }
            None => vec![GameEvent::FoodProbe { position: head }],
        }
    }
}

fn collision_events(kind: CollisionKind) -> Vec<GameEvent> {
    vec![
        GameEvent::SnakeCollision { kind },
        GameEvent::GameOver { reason: Some(kind) },
    ]
}

impl Listener for CollisionController {
    const NAME: &'static str = "collision";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::SnakeInit,
        EventKind::SnakeMove,
        EventKind::SnakeShrunk,
        EventKind::PowerUpActivated,
        EventKind::PowerUpExpired,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match event {
            GameEvent::GameStart { .. } => {
                self.ghost = false;
                self.segments.clear();
            }
            GameEvent::SnakeInit { segments } => {
                self.segments = segments.iter().copied().collect();
            }
            GameEvent::SnakeMove { head, tail } => return self.on_head(*head, *tail),
            GameEvent::SnakeShrunk { removed } => {
                for _ in removed {
                    if self.segments.len() > 1 {
                        self.segments.pop_back();
                    }
                }
            }
            GameEvent::PowerUpActivated { kind: PowerUpKind::Ghost, .. } => self.ghost = true,
            GameEvent::PowerUpExpired { kind: PowerUpKind::Ghost } => self.ghost = false,
            _ => {}
        }
        Vec::new()
    }
}
