use crate::compute::{transition, GameIntent};
use crate::entities::GameStatus;
use crate::events::{EventKind, GameEvent, Listener};

/// Gatekeeper for Menu / Playing / Paused / GameOver.
///
/// Requests that the current status does not allow are dropped silently.
#[derive(Debug)]
pub struct GameStateController {
    status: GameStatus,
}

impl Default for GameStateController {
    fn default() -> Self {
        Self {
            status: GameStatus::Menu,
        }
    }
}

impl GameStateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    fn apply(&mut self, intent: GameIntent) -> Option<GameEvent> {
        let next = transition(self.status, intent)?;
        tracing::debug!(from = ?self.status, to = ?next, ?intent, "game state");
        self.status = next;
        Some(GameEvent::StateChanged { state: next })
    }
}

impl Listener for GameStateController {
    const NAME: &'static str = "game-state";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::GamePause,
        EventKind::GameResume,
        EventKind::GameOver,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match *event {
            GameEvent::GameStart { speed_multiplier } => match self.apply(GameIntent::Start) {
                Some(changed) => vec![changed, GameEvent::SpeedChanged { speed_multiplier }],
                None => Vec::new(),
            },
            GameEvent::GamePause => self.apply(GameIntent::Pause).into_iter().collect(),
            GameEvent::GameResume => self.apply(GameIntent::Resume).into_iter().collect(),
            GameEvent::GameOver { .. } => self.apply(GameIntent::End).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}
