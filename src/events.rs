//! Publish/subscribe event bus.
//!
//! One [`EventBus`] is built per game session and handed by reference to
//! every listener, so nothing leaks between sessions (or tests).  Events
//! are a closed enum; listeners subscribe per [`EventKind`].
//!
//! Dispatch is synchronous and reentrant: a listener may emit further
//! events before returning, and those are fully delivered before the
//! outer dispatch moves on.  Listeners for one kind run in subscription
//! order.  A listener that fails or panics is logged and skipped; the
//! others still run.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use crate::entities::{CollisionKind, Direction, GameStatus, Position, PowerUpKind};
use crate::error::ListenerError;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    // Game lifecycle
    GameStart { speed_multiplier: f64 },
    GamePause,
    GameResume,
    /// `reason` is `None` when the game was ended without a collision.
    GameOver { reason: Option<CollisionKind> },
    StateChanged { state: GameStatus },
    SpeedChanged { speed_multiplier: f64 },

    // Input
    DirectionChange { direction: Direction },

    // Snake
    SnakeInit { segments: Vec<Position> },
    SnakeMove { head: Position, tail: Option<Position> },
    SnakeShrink { count: usize },
    SnakeShrunk { removed: Vec<Position> },
    SnakeCollision { kind: CollisionKind },

    // Food
    /// The head landed on a free cell; food and power-ups check it.
    FoodProbe { position: Position },
    FoodSpawn { position: Position },
    FoodEaten { position: Position },

    // Power-ups
    PowerUpSpawn { position: Position, kind: PowerUpKind },
    PowerUpCollected { position: Position, kind: PowerUpKind },
    PowerUpActivated { kind: PowerUpKind, duration: Duration },
    PowerUpExpired { kind: PowerUpKind },

    // Score
    ScoreUpdated { score: u32, difficulty: f64 },
}

/// Discriminant of [`GameEvent`], used as the subscription key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameStart,
    GamePause,
    GameResume,
    GameOver,
    StateChanged,
    SpeedChanged,
    DirectionChange,
    SnakeInit,
    SnakeMove,
    SnakeShrink,
    SnakeShrunk,
    SnakeCollision,
    FoodProbe,
    FoodSpawn,
    FoodEaten,
    PowerUpSpawn,
    PowerUpCollected,
    PowerUpActivated,
    PowerUpExpired,
    ScoreUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 20] = [
        EventKind::GameStart,
        EventKind::GamePause,
        EventKind::GameResume,
        EventKind::GameOver,
        EventKind::StateChanged,
        EventKind::SpeedChanged,
        EventKind::DirectionChange,
        EventKind::SnakeInit,
        EventKind::SnakeMove,
        EventKind::SnakeShrink,
        EventKind::SnakeShrunk,
        EventKind::SnakeCollision,
        EventKind::FoodProbe,
        EventKind::FoodSpawn,
        EventKind::FoodEaten,
        EventKind::PowerUpSpawn,
        EventKind::PowerUpCollected,
        EventKind::PowerUpActivated,
        EventKind::PowerUpExpired,
        EventKind::ScoreUpdated,
    ];
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameStart { .. } => EventKind::GameStart,
            GameEvent::GamePause => EventKind::GamePause,
            GameEvent::GameResume => EventKind::GameResume,
            GameEvent::GameOver { .. } => EventKind::GameOver,
            GameEvent::StateChanged { .. } => EventKind::StateChanged,
            GameEvent::SpeedChanged { .. } => EventKind::SpeedChanged,
            GameEvent::DirectionChange { .. } => EventKind::DirectionChange,
            GameEvent::SnakeInit { .. } => EventKind::SnakeInit,
            GameEvent::SnakeMove { .. } => EventKind::SnakeMove,
            GameEvent::SnakeShrink { .. } => EventKind::SnakeShrink,
            GameEvent::SnakeShrunk { .. } => EventKind::SnakeShrunk,
            GameEvent::SnakeCollision { .. } => EventKind::SnakeCollision,
            GameEvent::FoodProbe { .. } => EventKind::FoodProbe,
            GameEvent::FoodSpawn { .. } => EventKind::FoodSpawn,
            GameEvent::FoodEaten { .. } => EventKind::FoodEaten,
            GameEvent::PowerUpSpawn { .. } => EventKind::PowerUpSpawn,
            GameEvent::PowerUpCollected { .. } => EventKind::PowerUpCollected,
            GameEvent::PowerUpActivated { .. } => EventKind::PowerUpActivated,
            GameEvent::PowerUpExpired { .. } => EventKind::PowerUpExpired,
            GameEvent::ScoreUpdated { .. } => EventKind::ScoreUpdated,
        }
    }
}

// ── Bus ───────────────────────────────────────────────────────────────────────

pub type ListenerResult = Result<(), ListenerError>;

type Callback = Rc<dyn Fn(&EventBus, &GameEvent) -> ListenerResult>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    name: &'static str,
    callback: Callback,
}

#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<EventKind, Vec<Entry>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one event kind.  `name` only shows up in logs.
    pub fn subscribe<F>(&self, kind: EventKind, name: &'static str, callback: F) -> ListenerId
    where
        F: Fn(&EventBus, &GameEvent) -> ListenerResult + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().entry(kind).or_default().push(Entry {
            id,
            name,
            callback: Rc::new(callback),
        });
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let mut found = false;
        for entries in listeners.values_mut() {
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            found |= entries.len() != before;
        }
        listeners.retain(|_, entries| !entries.is_empty());
        found
    }

    /// Subscribe a stateful listener to every kind it declares interest in.
    ///
    /// The listener is borrowed only while it handles the event; the events
    /// it returns are emitted afterwards, so it may receive them itself.
    pub fn attach<L: Listener + 'static>(&self, target: &Rc<RefCell<L>>) -> Vec<ListenerId> {
        L::INTERESTS
            .iter()
            .map(|&kind| {
                let target = Rc::clone(target);
                self.subscribe(kind, L::NAME, move |bus, event| {
                    let follow_ups = target
                        .try_borrow_mut()
                        .map_err(|_| ListenerError::Busy(L::NAME))?
                        .on_event(event);
                    for next in follow_ups {
                        bus.emit(next);
                    }
                    Ok(())
                })
            })
            .collect()
    }

    pub fn emit(&self, event: GameEvent) {
        // Snapshot so listeners may (un)subscribe while we dispatch.
        let entries: Vec<Entry> = match self.listeners.borrow().get(&event.kind()) {
            Some(entries) => entries.clone(),
            None => return,
        };
        tracing::trace!(kind = ?event.kind(), listeners = entries.len(), "dispatch");

        for entry in entries {
            match catch_unwind(AssertUnwindSafe(|| (entry.callback)(self, &event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(listener = entry.name, kind = ?event.kind(), error = %err, "listener failed");
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(listener = entry.name, kind = ?event.kind(), %message, "listener panicked");
                }
            }
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.borrow().get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

/// Text of a panic payload, as passed to `panic!`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// A stateful subscriber.  `on_event` returns the events to emit next.
pub trait Listener {
    const NAME: &'static str;
    const INTERESTS: &'static [EventKind];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent>;
}

// ── Recorder ──────────────────────────────────────────────────────────────────

const DEFAULT_HISTORY: usize = 100;

/// Counts every event and keeps the most recent ones, for diagnostics.
#[derive(Debug)]
pub struct EventLog {
    counts: HashMap<EventKind, usize>,
    history: VecDeque<GameEvent>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::new(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// The last `n` events, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&GameEvent> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).collect()
    }

    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.history.iter()
    }

    /// Kinds in the order they were seen.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.history.iter().map(GameEvent::kind).collect()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.history.clear();
    }
}

impl Listener for EventLog {
    const NAME: &'static str = "event-log";
    const INTERESTS: &'static [EventKind] = &EventKind::ALL;

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        tracing::debug!(?event, "event");
        *self.counts.entry(event.kind()).or_insert(0) += 1;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(event.clone());
        Vec::new()
    }
}
