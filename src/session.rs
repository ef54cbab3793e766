//! One game session: the bus plus every controller, wired in order.

use std::cell::{Ref, RefCell};
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::GameConfig;
use crate::controllers::{
    CollisionController, FoodController, GameStateController, InputController, PowerUpController,
    ScoreController, ScreenController, SnakeController,
};
use crate::display::{Frame, Hud, Renderer};
use crate::entities::{GameStatus, Position, PowerUpState, ScoreState, ScreenName, SnakeState};
use crate::error::GameError;
use crate::events::{EventBus, EventLog, GameEvent};

pub struct Session {
    bus: EventBus,
    log: Rc<RefCell<EventLog>>,
    renderer: Rc<RefCell<Renderer>>,
    screen: Rc<RefCell<ScreenController>>,
    score: Rc<RefCell<ScoreController>>,
    game_state: Rc<RefCell<GameStateController>>,
    powerups: Rc<RefCell<PowerUpController>>,
    food: Rc<RefCell<FoodController>>,
    collision: Rc<RefCell<CollisionController>>,
    snake: Rc<RefCell<SnakeController>>,
    input: Rc<RefCell<InputController>>,
}

impl Session {
    /// Build a session for a `term_w × term_h` surface.  Randomness comes
    /// from `config.seed` when set.
    pub fn new(config: &GameConfig, term_w: u16, term_h: u16) -> Result<Self, GameError> {
        let (food_rng, powerup_rng): (Box<dyn RngCore>, Box<dyn RngCore>) = match config.seed {
            Some(seed) => (
                Box::new(StdRng::seed_from_u64(seed)),
                Box::new(StdRng::seed_from_u64(seed.wrapping_add(1))),
            ),
            None => (
                Box::new(StdRng::from_entropy()),
                Box::new(StdRng::from_entropy()),
            ),
        };
        Self::with_rngs(config, term_w, term_h, food_rng, powerup_rng)
    }

    /// Like [`Session::new`] with explicit RNGs for food and power-ups.
    /// The config is validated first.
    pub fn with_rngs(
        config: &GameConfig,
        term_w: u16,
        term_h: u16,
        food_rng: Box<dyn RngCore>,
        powerup_rng: Box<dyn RngCore>,
    ) -> Result<Self, GameError> {
        let config = &config.clone().validate()?;
        let renderer = Renderer::new(config.cols, config.rows, term_w, term_h)?;

        let session = Self {
            bus: EventBus::new(),
            log: Rc::new(RefCell::new(EventLog::default())),
            renderer: Rc::new(RefCell::new(renderer)),
            screen: Rc::new(RefCell::new(ScreenController::new())),
            score: Rc::new(RefCell::new(ScoreController::new(config.speed_multiplier))),
            game_state: Rc::new(RefCell::new(GameStateController::new())),
            powerups: Rc::new(RefCell::new(PowerUpController::new(powerup_rng))),
            food: Rc::new(RefCell::new(FoodController::new(config, food_rng))),
            collision: Rc::new(RefCell::new(CollisionController::new(config))),
            snake: Rc::new(RefCell::new(SnakeController::new(config))),
            input: Rc::new(RefCell::new(InputController::new(config.speed_multiplier))),
        };

        // Order matters: the renderer paints a move before food reacts to
        // it, food and power-ups reset before the snake respawns, and food
        // sees the new head before the collision probe reaches it.
        session.bus.attach(&session.log);
        session.bus.attach(&session.renderer);
        session.bus.attach(&session.screen);
        session.bus.attach(&session.score);
        session.bus.attach(&session.game_state);
        session.bus.attach(&session.powerups);
        session.bus.attach(&session.food);
        session.bus.attach(&session.collision);
        session.bus.attach(&session.snake);
        session.bus.attach(&session.input);

        session.bus.emit(GameEvent::StateChanged {
            state: GameStatus::Menu,
        });
        tracing::info!(cols = config.cols, rows = config.rows, "session ready");
        Ok(session)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn emit(&self, event: GameEvent) {
        self.bus.emit(event);
    }

    /// Feed one key press through the input controller.
    pub fn handle_key(&self, code: KeyCode) {
        let events = self.input.borrow_mut().handle_key(code);
        for event in events {
            self.bus.emit(event);
        }
    }

    /// Advance the simulation by one frame of wall-clock time.
    pub fn frame(&self, delta: Duration) {
        self.snake.borrow_mut().accumulate(delta);
        loop {
            let step = self.snake.borrow_mut().next_step();
            let Some(event) = step else { break };
            self.bus.emit(event);
        }

        let expired = self.powerups.borrow_mut().poll(delta);
        for event in expired {
            self.bus.emit(event);
        }
    }

    pub fn resize(&self, term_w: u16, term_h: u16) {
        self.renderer.borrow_mut().resize(term_w, term_h);
    }

    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let frame = self.current_frame();
        self.renderer.borrow_mut().present(out, &frame)
    }

    pub fn current_frame(&self) -> Frame {
        let score = *self.score.borrow().state();
        let effect = self
            .powerups
            .borrow()
            .state()
            .active
            .map(|active| (active.kind, active.remaining));
        Frame {
            hud: Hud {
                score: score.score,
                difficulty: score.difficulty,
                effect,
            },
            overlay: self.screen.borrow().overlay(),
        }
    }

    // ── Snapshots ─────────────────────────────────────────────────────────────

    pub fn status(&self) -> GameStatus {
        self.game_state.borrow().status()
    }

    pub fn screen(&self) -> ScreenName {
        self.screen.borrow().current()
    }

    pub fn snake(&self) -> SnakeState {
        self.snake.borrow().state().clone()
    }

    pub fn tick(&self) -> Duration {
        self.snake.borrow().tick()
    }

    pub fn food(&self) -> Option<Position> {
        self.food.borrow().position()
    }

    pub fn powerups(&self) -> PowerUpState {
        self.powerups.borrow().state().clone()
    }

    pub fn score(&self) -> ScoreState {
        *self.score.borrow().state()
    }

    pub fn ghost(&self) -> bool {
        self.collision.borrow().ghost()
    }

    pub fn log(&self) -> Ref<'_, EventLog> {
        self.log.borrow()
    }

    pub fn renderer(&self) -> Ref<'_, Renderer> {
        self.renderer.borrow()
    }
}
