//! Match configuration.
//!
//! Every field has a default, so a TOML file only needs the values it wants
//! to change:
//!
//! ```toml
//! map_size = 48
//! opponents = 2
//! seed = 7
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::MIN_MAP_SIZE;

/// Error loading or validating a [`MatchConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Parameters of a single match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Side length of the square map, in tiles.
    pub map_size: u16,
    /// Number of AI opponents (1-3).
    pub opponents: usize,
    /// Money every settlement starts with.
    pub starting_money: f64,
    /// Simulated seconds per tick at speed 1.
    pub tick_seconds: f64,
    /// Speed multiplier. Zero pauses the simulation.
    pub game_speed: f64,
    /// Tick limit for headless matches.
    pub max_ticks: u64,
    /// Drive the human slot with the AI policy in headless runs.
    pub human_autopilot: bool,
    /// Seed for terrain and AI rolls. Matches built from a config without
    /// one use seed 0; the CLI fills it from the clock instead.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            map_size: 64,
            opponents: 3,
            starting_money: 800.0,
            tick_seconds: 0.25,
            game_speed: 1.0,
            max_ticks: 12_000,
            human_autopilot: true,
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Default config with the given map size and opponent count.
    #[must_use]
    pub fn new(map_size: u16, opponents: usize) -> Self {
        Self {
            map_size,
            opponents,
            ..Self::default()
        }
    }

    /// Simulated seconds advanced by one tick.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.tick_seconds * self.game_speed
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_size < MIN_MAP_SIZE {
            return Err(ConfigError::Invalid(format!(
                "map_size must be at least {MIN_MAP_SIZE}, got {}",
                self.map_size
            )));
        }
        if !(1..=3).contains(&self.opponents) {
            return Err(ConfigError::Invalid(format!(
                "opponents must be 1-3, got {}",
                self.opponents
            )));
        }
        if !self.starting_money.is_finite() || self.starting_money < 0.0 {
            return Err(ConfigError::Invalid(
                "starting_money must be a non-negative number".to_string(),
            ));
        }
        if !self.tick_seconds.is_finite() || self.tick_seconds <= 0.0 {
            return Err(ConfigError::Invalid(
                "tick_seconds must be positive".to_string(),
            ));
        }
        if !self.game_speed.is_finite() || self.game_speed < 0.0 {
            return Err(ConfigError::Invalid(
                "game_speed must be non-negative".to_string(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::Invalid("max_ticks must be positive".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
