// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Skirmish: a deterministic tile-grid real-time-strategy simulation core.
//!
//! This crate provides the simulation behind a city-builder RTS mode:
//! - Settlements with money, age tiers and a population cap
//! - Military units with greedy movement and structure attacks
//! - A built-in opponent policy driven by seeded randomness
//! - Headless matches, tournaments and deterministic replays
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Runner / Tournament / Replay      │
//! ├─────────────────────────────────────┤
//! │   Tick: economy, AI, units, combat  │
//! ├─────────────────────────────────────┤
//! │   Match state + tile grid           │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything the simulation does is a function of the config (seed
//! included) and the host commands applied between ticks.

pub mod config;
pub mod error;
pub mod game;
pub mod replay;
pub mod tournament;

pub use config::{ConfigError, MatchConfig};
pub use error::{CommandError, MatchError};

// Re-export key game types at crate root for convenience
pub use game::{
    create_match, simulate_tick, Age, BuildingKind, Command, Coord, Map, MatchState,
    MilitaryUnit, PlayerId, Settlement, TickEvents, UnitId, UnitKind, UnitOrder,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_root_reexports() {
        let config = MatchConfig {
            seed: Some(1),
            ..MatchConfig::new(40, 1)
        };
        let mut state: MatchState = create_match(&config).unwrap();
        let events: TickEvents = simulate_tick(&mut state, config.dt());
        assert_eq!(state.tick, 1);
        assert!(events.winner.is_none());
    }
}
