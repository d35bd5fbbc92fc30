//! Match recording and replay.
//!
//! Matches are deterministic given their config (seed included) and the
//! commands issued between ticks, so a recording is only:
//! - `config: MatchConfig` - map size, opponents, timing and seed
//! - `commands: Vec<TimedCommand>` - every accepted host command, stamped
//!   with the tick it was applied before
//!
//! AI decisions are re-derived from the seed. To view tick N, re-run the
//! simulation from tick 0 to N.
//!
//! # Time Travel
//!
//! - **Forward**: Continue stepping the simulation
//! - **Backward**: Re-run from tick 0 to (`current_tick` - 1)
//! - **Jump to tick N**: Re-run from tick 0 to N

mod render;
mod text;

pub use render::{building_symbol, render_ascii, unit_symbol};
pub use text::render_text;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::game::{create_match, simulate_tick, Command, MatchState, TickEvents};

/// A command and the tick it was applied before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedCommand {
    /// Value of the tick counter when the command was applied.
    pub tick: u64,
    /// The command.
    pub command: Command,
}

/// Everything needed to reproduce a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Match configuration. The seed is always set.
    pub config: MatchConfig,
    /// Host commands in application order.
    pub commands: Vec<TimedCommand>,
}

impl Recording {
    /// Create an empty recording.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            commands: Vec::new(),
        }
    }

    /// Save the recording as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a recording saved with [`Recording::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a recording.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Error type for replay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading or writing the recording failed.
    #[error("recording I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The recording is not valid JSON for this format.
    #[error("invalid recording: {0}")]
    Format(#[from] serde_json::Error),
    /// The recorded config cannot create a match.
    #[error("cannot set up match: {0}")]
    Setup(#[from] MatchError),
    /// Tick number out of bounds.
    #[error("tick {requested} out of bounds (max: {max_tick})")]
    TickOutOfBounds {
        /// Requested tick.
        requested: u64,
        /// Last reachable tick.
        max_tick: u64,
    },
    /// Match is already over.
    #[error("match is already over")]
    GameOver,
}

/// Replay engine - steps through a recorded match deterministically.
///
/// Since matches are deterministic, this engine can:
/// - Step forward by executing one tick
/// - Step backward by replaying from tick 0
/// - Jump to any tick by replaying from tick 0
#[derive(Debug)]
pub struct ReplayEngine {
    /// The recording being replayed.
    recording: Recording,
    /// Current match state.
    state: MatchState,
    /// Index of the first recorded command not yet applied.
    next_command: usize,
}

impl ReplayEngine {
    /// Create a new replay engine from a recording, starting at tick 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded config cannot create a match.
    pub fn new(recording: Recording) -> Result<Self, ReplayError> {
        Self::new_at_tick(recording, 0)
    }

    /// Create a new replay engine at a specific tick.
    ///
    /// This replays from tick 0 to the target tick, stopping early if the
    /// match ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded config cannot create a match.
    pub fn new_at_tick(recording: Recording, target_tick: u64) -> Result<Self, ReplayError> {
        let state = create_match(&recording.config)?;
        let mut engine = Self {
            recording,
            state,
            next_command: 0,
        };

        while engine.tick() < target_tick && !engine.is_game_over() {
            let before = engine.tick();
            engine.execute_tick_internal();
            // A paused config never advances.
            if engine.tick() == before {
                break;
            }
        }

        Ok(engine)
    }

    /// Get the recording.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Get current tick number.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Get current match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Whether the match has a winner or reached its tick limit.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_over() || self.state.tick >= self.recording.config.max_ticks
    }

    /// Step forward one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is already over.
    pub fn step_forward(&mut self) -> Result<TickEvents, ReplayError> {
        if self.is_game_over() {
            return Err(ReplayError::GameOver);
        }
        Ok(self.execute_tick_internal())
    }

    /// Step backward one tick.
    ///
    /// This replays from tick 0 to (`current_tick` - 1).
    ///
    /// # Errors
    ///
    /// Returns an error if already at tick 0.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        if self.tick() == 0 {
            return Err(ReplayError::TickOutOfBounds {
                requested: 0,
                max_tick: self.recording.config.max_ticks,
            });
        }

        let target = self.tick() - 1;
        self.goto_tick(target)
    }

    /// Jump to a specific tick.
    ///
    /// This replays from tick 0 to the target tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick is beyond the match's tick limit.
    pub fn goto_tick(&mut self, target_tick: u64) -> Result<(), ReplayError> {
        let max_tick = self.recording.config.max_ticks;
        if target_tick > max_tick {
            return Err(ReplayError::TickOutOfBounds {
                requested: target_tick,
                max_tick,
            });
        }

        let recording = self.recording.clone();
        *self = Self::new_at_tick(recording, target_tick)?;
        Ok(())
    }

    /// Render current state to ASCII for terminal viewing.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        render_ascii(&self.state, self.recording.config.max_ticks)
    }

    /// Render current state to structured text.
    #[must_use]
    pub fn render_text(&self) -> String {
        render_text(&self.state, self.recording.config.max_ticks)
    }

    /// Apply this tick's recorded commands, then simulate it.
    fn execute_tick_internal(&mut self) -> TickEvents {
        let tick = self.state.tick;

        while let Some(timed) = self.recording.commands.get(self.next_command)
            && timed.tick <= tick
        {
            if timed.tick == tick
                && let Err(error) = self.state.apply(&timed.command)
            {
                warn!(tick, %error, "recorded command rejected on replay");
            }
            self.next_command += 1;
        }

        simulate_tick(&mut self.state, self.recording.config.dt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{UnitKind, HUMAN_PLAYER};
    use tempfile::NamedTempFile;

    fn create_test_recording() -> Recording {
        let config = MatchConfig {
            seed: Some(21),
            max_ticks: 60,
            human_autopilot: false,
            ..MatchConfig::new(40, 1)
        };
        let mut recording = Recording::new(config);
        recording.commands.push(TimedCommand {
            tick: 3,
            command: Command::TrainUnit {
                player: HUMAN_PLAYER,
                kind: UnitKind::Infantry,
            },
        });
        recording
    }

    #[test]
    fn test_recording_save_load_roundtrip() {
        let recording = create_test_recording();

        let temp_file = NamedTempFile::new().expect("create temp file");
        recording.save(temp_file.path()).expect("save recording");
        let loaded = Recording::load(temp_file.path()).expect("load recording");

        assert_eq!(loaded, recording);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp_file = NamedTempFile::new().expect("create temp file");
        fs::write(temp_file.path(), "not json").expect("write");
        assert!(matches!(
            Recording::load(temp_file.path()),
            Err(ReplayError::Format(_))
        ));
    }

    #[test]
    fn test_recorded_command_applies_at_its_tick() {
        let mut engine = ReplayEngine::new(create_test_recording()).unwrap();
        for _ in 0..3 {
            engine.step_forward().unwrap();
        }
        assert_eq!(engine.state().units_of(HUMAN_PLAYER).count(), 2);

        engine.step_forward().unwrap();
        assert_eq!(engine.state().units_of(HUMAN_PLAYER).count(), 3);
    }

    #[test]
    fn test_step_backward_matches_fresh_replay() {
        let mut engine = ReplayEngine::new(create_test_recording()).unwrap();
        for _ in 0..10 {
            engine.step_forward().unwrap();
        }
        engine.step_backward().unwrap();
        assert_eq!(engine.tick(), 9);

        let fresh = ReplayEngine::new_at_tick(create_test_recording(), 9).unwrap();
        assert_eq!(engine.state(), fresh.state());
    }

    #[test]
    fn test_tick_limit_ends_replay() {
        let mut engine = ReplayEngine::new_at_tick(create_test_recording(), 60).unwrap();
        assert!(engine.is_game_over());
        assert!(matches!(engine.step_forward(), Err(ReplayError::GameOver)));
        assert!(matches!(
            engine.goto_tick(61),
            Err(ReplayError::TickOutOfBounds { requested: 61, .. })
        ));
    }

    #[test]
    fn test_step_backward_at_start_fails() {
        let mut engine = ReplayEngine::new(create_test_recording()).unwrap();
        assert!(engine.step_backward().is_err());
    }

    #[test]
    fn test_replay_error_display() {
        let err = ReplayError::TickOutOfBounds {
            requested: 1500,
            max_tick: 1000,
        };
        assert!(format!("{err}").contains("1500"));
        assert!(format!("{err}").contains("1000"));

        let err = ReplayError::GameOver;
        assert!(format!("{err}").contains("over"));
    }
}
