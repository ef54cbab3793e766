//! Feature controllers.
//!
//! Each controller owns its model snapshot, reacts to bus events through
//! [`Listener`](crate::events::Listener) and answers with follow-up events.
//! None of them touches the terminal.

pub mod collision;
pub mod food;
pub mod game_state;
pub mod input;
pub mod powerup;
pub mod score;
pub mod screen;
pub mod snake;

pub use collision::CollisionController;
pub use food::FoodController;
pub use game_state::GameStateController;
pub use input::{map_key, Action, InputController};
pub use powerup::PowerUpController;
pub use score::ScoreController;
pub use screen::{Overlay, ScreenController};
pub use snake::SnakeController;
