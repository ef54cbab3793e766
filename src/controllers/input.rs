use crossterm::event::KeyCode;

use crate::entities::{Direction, GameStatus};
use crate::events::{EventKind, GameEvent, Listener};

/// What a key press means, independent of the game's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Steer(Direction),
    /// Space: start, pause or resume.
    Toggle,
    Quit,
}

pub fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Steer(Direction::Up)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(Action::Steer(Direction::Right))
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(Action::Steer(Direction::Down))
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(Action::Steer(Direction::Left))
        }
        KeyCode::Char(' ') => Some(Action::Toggle),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Turns key presses into game events.
#[derive(Debug)]
pub struct InputController {
    status: GameStatus,
    speed_multiplier: f64,
    last_direction: Option<Direction>,
}

impl InputController {
    pub fn new(speed_multiplier: f64) -> Self {
        Self {
            status: GameStatus::Menu,
            speed_multiplier,
            last_direction: None,
        }
    }

    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    /// Events for one key press.  Quitting is the host's business and
    /// produces nothing here.
    pub fn handle_key(&mut self, code: KeyCode) -> Vec<GameEvent> {
        match map_key(code) {
            Some(Action::Toggle) => match self.status {
                GameStatus::Menu | GameStatus::GameOver => vec![GameEvent::GameStart {
                    speed_multiplier: self.speed_multiplier,
                }],
                GameStatus::Playing => vec![GameEvent::GamePause],
                GameStatus::Paused => vec![GameEvent::GameResume],
            },
            Some(Action::Steer(direction)) if self.status == GameStatus::Playing => {
                self.last_direction = Some(direction);
                vec![GameEvent::DirectionChange { direction }]
            }
            _ => Vec::new(),
        }
    }
}

impl Listener for InputController {
    const NAME: &'static str = "input";
    const INTERESTS: &'static [EventKind] = &[EventKind::StateChanged];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        if let GameEvent::StateChanged { state } = *event {
            self.status = state;
        }
        Vec::new()
    }
}
