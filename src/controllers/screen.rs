use crate::compute::screen_for;
use crate::entities::{GameStatus, ScreenName};
use crate::events::{EventKind, GameEvent, Listener};

/// Text shown on top of the board for non-playing screens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    pub screen: ScreenName,
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// Picks the overlay for the current game status.
#[derive(Debug)]
pub struct ScreenController {
    current: ScreenName,
    final_score: u32,
}

impl Default for ScreenController {
    fn default() -> Self {
        Self {
            current: ScreenName::Menu,
            final_score: 0,
        }
    }
}

impl ScreenController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ScreenName {
        self.current
    }

    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    /// `None` while the game screen is showing.
    pub fn overlay(&self) -> Option<Overlay> {
        let (title, lines) = match self.current {
            ScreenName::Game => return None,
            ScreenName::Menu => (
                "S N A K E",
                vec![
                    "Press Space to Start".to_string(),
                    "Arrow Keys or WASD to Move".to_string(),
                    "Q to Quit".to_string(),
                ],
            ),
            ScreenName::Pause => ("PAUSED", vec!["Press Space to Resume".to_string()]),
            ScreenName::GameOver => (
                "GAME OVER",
                vec![
                    format!("Final Score: {}", self.final_score),
                    "Press Space to Play Again".to_string(),
                ],
            ),
        };
        Some(Overlay {
            screen: self.current,
            title,
            lines,
        })
    }
}

impl Listener for ScreenController {
    const NAME: &'static str = "screen";
    const INTERESTS: &'static [EventKind] = &[EventKind::StateChanged, EventKind::ScoreUpdated];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match *event {
            GameEvent::StateChanged { state } => {
                self.current = screen_for(state);
                if state != GameStatus::Playing {
                    tracing::debug!(screen = ?self.current, "overlay");
                }
            }
            GameEvent::ScoreUpdated { score, .. } => self.final_score = score,
            _ => {}
        }
        Vec::new()
    }
}
