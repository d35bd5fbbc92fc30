//! Match invariants - sanity checks that detect bugs.
//!
//! None of these should ever trigger for a state produced by the public API.
//! Tests and fuzz targets run them after every step.

use std::collections::HashMap;

use crate::game::{BuildingKind, MatchState, PlayerId, BASE_POP_CAP, DESTRUCTION_THRESHOLD};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all match invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &MatchState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for player in &state.players {
        if player.money < 0.0 || !player.money.is_finite() {
            violations.push(violation(format!(
                "Player {} has invalid money {}",
                player.id, player.money
            )));
        }
        if player.pop_cap < BASE_POP_CAP {
            violations.push(violation(format!(
                "Player {} pop_cap {} below base {BASE_POP_CAP}",
                player.id, player.pop_cap
            )));
        }
    }

    if let Some(winner) = state.winner()
        && !state.is_alive(winner)
    {
        violations.push(violation(format!("Winner {winner} is not alive")));
    }

    for unit in &state.units {
        match state.get_player(unit.owner) {
            None => violations.push(violation(format!(
                "Unit {} references unknown player {}",
                unit.id, unit.owner
            ))),
            Some(owner) if owner.eliminated => violations.push(violation(format!(
                "Unit {} belongs to eliminated player {}",
                unit.id, unit.owner
            ))),
            Some(_) => {}
        }
        if !(0.0..1.0).contains(&unit.progress) {
            violations.push(violation(format!(
                "Unit {} progress {} outside [0, 1)",
                unit.id, unit.progress
            )));
        }
        if !unit.path.is_empty() && unit.path_index >= unit.path.len() {
            violations.push(violation(format!(
                "Unit {} path_index {} beyond path of {}",
                unit.id,
                unit.path_index,
                unit.path.len()
            )));
        }
        if unit.hp > unit.max_hp {
            violations.push(violation(format!(
                "Unit {} hp {} exceeds max {}",
                unit.id, unit.hp, unit.max_hp
            )));
        }
        if !state.map.in_bounds(unit.tile) {
            violations.push(violation(format!(
                "Unit {} off the map at {}",
                unit.id, unit.tile
            )));
        }
    }

    let mut city_halls: HashMap<PlayerId, u32> = HashMap::new();
    for (coord, tile) in state.map.iter() {
        let building = &tile.building;
        if !(0.0..DESTRUCTION_THRESHOLD).contains(&building.damage) {
            violations.push(violation(format!(
                "Tile at {coord} has damage {} outside [0, {DESTRUCTION_THRESHOLD})",
                building.damage
            )));
        }
        if building.origin
            && building.kind == BuildingKind::CityHall
            && let Some(owner) = building.owner
        {
            *city_halls.entry(owner).or_default() += 1;
        }
    }
    for (owner, count) in city_halls {
        if count > 1 {
            violations.push(violation(format!(
                "Player {owner} owns {count} city halls"
            )));
        }
    }

    violations
}

/// Assert all match invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &MatchState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Match invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &MatchState) {}
