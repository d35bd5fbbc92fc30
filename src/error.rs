//! Error types for match setup and player commands.
//!
//! Commands are total: a rejected command leaves the state exactly as it was
//! and reports the reason through [`CommandError`].

use thiserror::Error;

use crate::game::{Age, PlayerId, UnitKind};

/// Why a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CommandError {
    /// No settlement with this id takes part in the match.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// The settlement has been eliminated.
    #[error("player {0} has been eliminated")]
    Eliminated(PlayerId),
    /// The unit kind needs a higher tier.
    #[error("{kind} requires age {required}, player is at age {current}")]
    AgeLocked {
        /// Requested unit kind.
        kind: UnitKind,
        /// Tier the kind needs.
        required: u8,
        /// Tier the settlement is at.
        current: u8,
    },
    /// Training would exceed the population cap.
    #[error("population cap reached ({used} + {needed} > {cap})")]
    PopulationCap {
        /// Population already used by units.
        used: u32,
        /// Population the new unit needs.
        needed: u32,
        /// Current cap.
        cap: u32,
    },
    /// Not enough money.
    #[error("insufficient funds: need {needed:.0}, have {available:.0}")]
    InsufficientFunds {
        /// Price of the action.
        needed: f64,
        /// Money available.
        available: f64,
    },
    /// The settlement is already at the last tier.
    #[error("already at maximum age {}", .0.number())]
    MaxAge(Age),
}

/// Why a match could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    /// At least one AI opponent is needed.
    #[error("need at least 1 opponent, got {0}")]
    TooFewOpponents(usize),
    /// At most three AI opponents fit the corner layout.
    #[error("at most 3 opponents are supported, got {0}")]
    TooManyOpponents(usize),
    /// The map cannot hold the corner layout.
    #[error("map size {size} is below the minimum of {min}")]
    MapTooSmall {
        /// Requested size.
        size: u16,
        /// Minimum supported size.
        min: u16,
    },
    /// A host-provided map is not square or does not match the configured size.
    #[error("map is {width}x{height}, expected {expected}x{expected}")]
    MapSizeMismatch {
        /// Provided width.
        width: u16,
        /// Provided height.
        height: u16,
        /// Configured size.
        expected: u16,
    },
}
