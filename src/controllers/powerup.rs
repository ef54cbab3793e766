use std::time::Duration;

use rand::RngCore;

use crate::compute::{
    collect, init_powerups, maybe_spawn, spawn_chance_for_score, tick_powerups, with_spawn_chance,
    Collection, SHRINK_SEGMENTS,
};
use crate::entities::{GameStatus, Position, PowerUpKind, PowerUpState};
use crate::events::{EventKind, GameEvent, Listener};

/// Spawns power-ups in place of food and runs the active effect's timer.
pub struct PowerUpController {
    state: PowerUpState,
    rng: Box<dyn RngCore>,
    /// The timer only runs while playing.
    playing: bool,
}

impl PowerUpController {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        Self {
            state: init_powerups(),
            rng,
            playing: false,
        }
    }

    pub fn state(&self) -> &PowerUpState {
        &self.state
    }

    /// Advance the active effect by one frame's worth of time.
    pub fn poll(&mut self, delta: Duration) -> Vec<GameEvent> {
        if !self.playing {
            return Vec::new();
        }
        let (state, expired) = tick_powerups(&self.state, delta);
        self.state = state;
        match expired {
            Some(kind) => {
                tracing::debug!(?kind, "power-up expired");
                vec![GameEvent::PowerUpExpired { kind }]
            }
            None => Vec::new(),
        }
    }

    fn on_food_spawn(&mut self, food: Position) -> Vec<GameEvent> {
        let (state, spawned) = maybe_spawn(&self.state, food, &mut self.rng);
        self.state = state;
        match spawned {
            Some(powerup) => {
                tracing::debug!(kind = ?powerup.kind, position = ?powerup.position, "power-up spawned");
                vec![GameEvent::PowerUpSpawn {
                    position: powerup.position,
                    kind: powerup.kind,
                }]
            }
            None => Vec::new(),
        }
    }

    fn on_probe(&mut self, head: Position) -> Vec<GameEvent> {
        let (state, collection) = collect(&self.state, head);
        self.state = state;
        collection.map(collection_events).unwrap_or_default()
    }
}

/// Expiry of the old effect first, then the instant effect, then the
/// activation, then the collection itself.
fn collection_events(collection: Collection) -> Vec<GameEvent> {
    let Collection { powerup, expired } = collection;
    let mut events = Vec::with_capacity(4);
    if let Some(kind) = expired {
        events.push(GameEvent::PowerUpExpired { kind });
    }
    if powerup.kind == PowerUpKind::Shrink {
        events.push(GameEvent::SnakeShrink {
            count: SHRINK_SEGMENTS,
        });
    }
    events.push(GameEvent::PowerUpActivated {
        kind: powerup.kind,
        duration: powerup.duration,
    });
    events.push(GameEvent::PowerUpCollected {
        position: powerup.position,
        kind: powerup.kind,
    });
    tracing::debug!(kind = ?powerup.kind, ?expired, "power-up collected");
    events
}

impl Listener for PowerUpController {
    const NAME: &'static str = "powerup";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::StateChanged,
        EventKind::ScoreUpdated,
        EventKind::FoodSpawn,
        EventKind::FoodProbe,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        match *event {
            GameEvent::GameStart { .. } => self.state = init_powerups(),
            GameEvent::StateChanged { state } => self.playing = state == GameStatus::Playing,
            GameEvent::ScoreUpdated { score, .. } => {
                self.state = with_spawn_chance(&self.state, spawn_chance_for_score(score));
            }
            GameEvent::FoodSpawn { position } => return self.on_food_spawn(position),
            GameEvent::FoodProbe { position } => return self.on_probe(position),
            _ => {}
        }
        Vec::new()
    }
}
