//! Game configuration
//!
//! Loaded from an optional TOML file, then overridden from the command
//! line, then validated once before a session is built.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const MIN_GRID: i32 = 5;
pub const MAX_GRID: i32 = 200;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board width in cells
    pub cols: i32,
    /// Board height in cells
    pub rows: i32,
    /// Movement interval at speed 1.0, in milliseconds
    pub base_tick_ms: u64,
    /// Snake length at game start
    pub initial_length: usize,
    /// Scales the tick interval; below 1.0 is faster
    pub speed_multiplier: f64,
    /// Frame pacing of the terminal loop, in milliseconds
    pub frame_ms: u64,
    /// Fixed RNG seed for reproducible games
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: 30,
            rows: 20,
            base_tick_ms: 120,
            initial_length: 4,
            speed_multiplier: 1.0,
            frame_ms: 16,
            seed: None,
        }
    }
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub cols: Option<i32>,
    pub rows: Option<i32>,
    pub base_tick_ms: Option<u64>,
    pub speed_multiplier: Option<f64>,
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Read a TOML file.  Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(?path, ?config, "loaded config file");
        Ok(config)
    }

    pub fn apply(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(cols) = overrides.cols {
            self.cols = cols;
        }
        if let Some(rows) = overrides.rows {
            self.rows = rows;
        }
        if let Some(ms) = overrides.base_tick_ms {
            self.base_tick_ms = ms;
        }
        if let Some(speed) = overrides.speed_multiplier {
            self.speed_multiplier = speed;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        for (field, value) in [("cols", self.cols), ("rows", self.rows)] {
            if !(MIN_GRID..=MAX_GRID).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside {MIN_GRID}..={MAX_GRID}"),
                });
            }
        }
        if self.base_tick_ms < 20 {
            return Err(ConfigError::Invalid {
                field: "base_tick_ms",
                reason: format!("{} ms is below the 20 ms floor", self.base_tick_ms),
            });
        }
        let max_length = (self.cols / 2) as usize;
        if self.initial_length == 0 || self.initial_length > max_length {
            return Err(ConfigError::Invalid {
                field: "initial_length",
                reason: format!("{} must be within 1..={max_length}", self.initial_length),
            });
        }
        if !(0.1..=10.0).contains(&self.speed_multiplier) {
            return Err(ConfigError::Invalid {
                field: "speed_multiplier",
                reason: format!("{} is outside 0.1..=10", self.speed_multiplier),
            });
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(self)
    }

    pub fn base_tick(&self) -> Duration {
        Duration::from_millis(self.base_tick_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}
