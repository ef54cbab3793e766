//! Error types for the game.

use std::path::PathBuf;

use thiserror::Error;

/// Problems reading or validating the game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A listener that could not handle an event.  The bus logs these and
/// carries on with the remaining listeners.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener's state was already borrowed further up the stack.
    #[error("listener `{0}` is busy")]
    Busy(&'static str),

    #[error("{0}")]
    Custom(String),
}

/// Fatal errors that end the program.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    /// The drawing surface cannot hold the board.
    #[error("terminal is {have_cols}x{have_rows}, the board needs at least {need_cols}x{need_rows}")]
    SurfaceTooSmall {
        need_cols: u16,
        need_rows: u16,
        have_cols: u16,
        have_rows: u16,
    },
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;
