//! Runtime game configuration.
//!
//! Defaults come from [`constants`](crate::constants). A configuration can be
//! read from a JSON file; any field left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardError;
use crate::constants::{DEFAULT_KOMI, DEFAULT_SIZE, KO_WINDOW};
use crate::territory::Smoothing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board size must be positive (got {0})")]
    InvalidSize(usize),
    #[error("komi must be a finite number (got {0})")]
    InvalidKomi(f32),
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Settings fixed for the lifetime of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board size (NxN).
    pub size: usize,
    /// Compensation added to White's score.
    pub komi: f32,
    /// Earlier positions remembered for the superko check.
    pub ko_window: usize,
    /// Influence diffusion used by the territory estimate.
    pub smoothing: Smoothing,
    /// Number of diffusion passes; `None` uses the mode's conventional count.
    pub smoothing_passes: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            komi: DEFAULT_KOMI,
            ko_window: KO_WINDOW,
            smoothing: Smoothing::Potential,
            smoothing_passes: None,
        }
    }
}

impl GameConfig {
    /// Default configuration on a board of the given size.
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Diffusion passes to run: the explicit setting, or the conventional
    /// count for the smoothing mode.
    pub fn passes(&self) -> usize {
        self.smoothing_passes
            .unwrap_or_else(|| self.smoothing.default_passes())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidSize(self.size));
        }
        if !self.komi.is_finite() {
            return Err(ConfigError::InvalidKomi(self.komi));
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
