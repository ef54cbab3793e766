//! Terminal Snake.
//!
//! Features talk only through an [`events::EventBus`] built per
//! [`session::Session`].  Models are plain snapshots transformed by the
//! pure functions in [`compute`]; controllers hold the current snapshot;
//! [`display`] paints it with crossterm.

pub mod compute;
pub mod config;
pub mod controllers;
pub mod display;
pub mod entities;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod session;

pub use config::GameConfig;
pub use error::{GameError, Result};
pub use session::Session;
