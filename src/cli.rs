//! CLI command implementations for Skirmish.

pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod tournament;
pub(crate) mod watch;

mod output;

use clap::ValueEnum;
use skirmish::config::{ConfigError, MatchConfig};
use skirmish::replay::ReplayError;
use skirmish::MatchError;
use std::path::PathBuf;
use thiserror::Error;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// Structured per-settlement summary of the final state.
    Summary,
}

/// Output format for the `replay` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReplayFormat {
    /// Interactive TUI.
    Tui,
    /// ASCII map per tick.
    Text,
    /// Structured summary per tick.
    Summary,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Match setup flags shared by every match-creating command.
///
/// Flags override values from `--config`, which override the defaults.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MatchArgs {
    /// TOML match config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map side length in tiles
    #[arg(long)]
    map_size: Option<u16>,

    /// Number of AI opponents (1-3)
    #[arg(short, long)]
    opponents: Option<usize>,

    /// Tick limit
    #[arg(short = 't', long)]
    max_ticks: Option<u64>,

    /// Leave the human slot idle instead of driving it with the AI policy
    #[arg(long)]
    no_autopilot: bool,
}

impl MatchArgs {
    /// Build the match config. A missing seed is drawn from the clock.
    pub(crate) fn resolve(&self) -> Result<MatchConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::load(path)?,
            None => MatchConfig::default(),
        };
        if let Some(size) = self.map_size {
            config.map_size = size;
        }
        if let Some(opponents) = self.opponents {
            config.opponents = opponents;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks;
        }
        if self.no_autopilot {
            config.human_autopilot = false;
        }
        config.seed = Some(self.seed.or(config.seed).unwrap_or_else(clock_seed));
        config.validate()?;
        Ok(config)
    }
}

/// Seed derived from the system clock.
pub(crate) fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos() & u128::from(u64::MAX)).unwrap_or(42))
        .unwrap_or(42)
}

/// CLI error type.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Free-form failure.
    #[error("{0}")]
    Message(String),
    /// Terminal or file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The match config is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The match could not be created.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// A recording could not be loaded, saved or replayed.
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
