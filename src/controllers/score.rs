use crate::compute::{add_food, add_powerup, init_score};
use crate::entities::ScoreState;
use crate::events::{EventKind, GameEvent, Listener};

#[derive(Debug)]
pub struct ScoreController {
    state: ScoreState,
}

impl ScoreController {
    pub fn new(speed_multiplier: f64) -> Self {
        Self {
            state: init_score(speed_multiplier),
        }
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    fn updated(&self) -> Vec<GameEvent> {
        vec![GameEvent::ScoreUpdated {
            score: self.state.score,
            difficulty: self.state.difficulty,
        }]
    }
}

impl Listener for ScoreController {
    const NAME: &'static str = "score";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::SpeedChanged,
        EventKind::FoodEaten,
        EventKind::PowerUpCollected,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match *event {
            GameEvent::GameStart { speed_multiplier } => {
                self.state = init_score(speed_multiplier);
                self.updated()
            }
            GameEvent::SpeedChanged { speed_multiplier } => {
                self.state.speed_multiplier = speed_multiplier;
                Vec::new()
            }
            GameEvent::FoodEaten { .. } => {
                self.state = add_food(&self.state);
                self.updated()
            }
            GameEvent::PowerUpCollected { kind, .. } => {
                self.state = add_powerup(&self.state, kind);
                self.updated()
            }
            _ => Vec::new(),
        }
    }
}
