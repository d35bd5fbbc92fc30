//! Settlement state.

use serde::{Deserialize, Serialize};

use crate::game::Coord;

/// Unique identifier for a settlement. The human is always 1.
pub type PlayerId = u8;

/// Id of the human-controlled settlement.
pub const HUMAN_PLAYER: PlayerId = 1;

/// Technology tier of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Age {
    /// Starting tier: infantry only.
    First = 1,
    /// Unlocks helicopters.
    Second = 2,
    /// Unlocks tanks.
    Third = 3,
}

impl Age {
    /// The tier after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => Some(Self::Third),
            Self::Third => None,
        }
    }

    /// Cost of advancing *into* this tier.
    #[must_use]
    pub const fn upgrade_cost(self) -> f64 {
        match self {
            Self::First => 0.0,
            Self::Second => 400.0,
            Self::Third => 800.0,
        }
    }

    /// Numeric tier (1-3).
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Age {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(format!("age must be 1-3, got {other}")),
        }
    }
}

impl From<Age> for u8 {
    fn from(age: Age) -> Self {
        age.number()
    }
}

/// One competing settlement, human or AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier for this settlement.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display colour as a hex string.
    pub color: String,
    /// Whether the settlement is driven by the built-in AI.
    pub is_ai: bool,
    /// Set once the command structure is lost. Never reverts.
    pub eliminated: bool,
    /// Treasury. Only spending checks for sufficiency.
    pub money: f64,
    /// Derived score, rewritten on every recompute.
    pub score: u64,
    /// Technology tier.
    pub age: Age,
    /// Derived population capacity.
    pub pop_cap: u32,
    /// Tile of the command structure origin.
    pub base: Coord,
    /// Earliest tick at which the AI re-evaluates. `None` for humans.
    pub ai_next_action_tick: Option<u64>,
}

impl Settlement {
    /// Create a settlement anchored at `base`.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, is_ai: bool, base: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            color: default_color(id).to_string(),
            is_ai,
            eliminated: false,
            money: 0.0,
            score: 0,
            age: Age::First,
            pop_cap: 0,
            base,
            ai_next_action_tick: is_ai.then_some(0),
        }
    }

    /// Whether the settlement is still in the match.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.eliminated
    }

    /// Eliminate this settlement.
    pub fn eliminate(&mut self) {
        self.eliminated = true;
    }
}

/// Palette used for settlement colours, indexed by id.
#[must_use]
pub fn default_color(id: PlayerId) -> &'static str {
    match id {
        1 => "#3b82f6",
        2 => "#ef4444",
        3 => "#22c55e",
        4 => "#eab308",
        _ => "#a855f7",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_creation() {
        let human = Settlement::new(HUMAN_PLAYER, "You", false, Coord::new(5, 5));
        assert!(human.is_alive());
        assert_eq!(human.age, Age::First);
        assert_eq!(human.ai_next_action_tick, None);

        let ai = Settlement::new(2, "Rival", true, Coord::new(9, 9));
        assert_eq!(ai.ai_next_action_tick, Some(0));
        assert_eq!(ai.color, "#ef4444");
    }

    #[test]
    fn test_settlement_eliminate() {
        let mut player = Settlement::new(2, "Rival", true, Coord::new(0, 0));
        player.eliminate();
        assert!(!player.is_alive());
    }

    #[test]
    fn test_age_progression() {
        assert_eq!(Age::First.next(), Some(Age::Second));
        assert_eq!(Age::Third.next(), None);
        assert!(Age::Second < Age::Third);
        assert_eq!(Age::try_from(4).ok(), None);
    }

    #[test]
    fn test_age_serializes_as_number() {
        let json = serde_json::to_string(&Age::Second).unwrap();
        assert_eq!(json, "2");
        let back: Age = serde_json::from_str("3").unwrap();
        assert_eq!(back, Age::Third);
    }
}
