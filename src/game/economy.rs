//! Economy: passive income, population capacity and score.
//!
//! Everything here is derived from grid ownership with a full recompute. Only
//! origin tiles are counted, so a 2x2 structure contributes once.
//!
//! # Formulas
//!
//! - `pop_cap = 10 + Σ housing capacity`
//! - `income  = 10 + Σ key-building bonus` (per simulated second)
//! - `score   = floor(money + 10·structures + 5·units + 0.2·population)`

use std::collections::HashMap;

use crate::game::{Map, MatchState, PlayerId};

/// Population capacity every settlement has without housing.
pub const BASE_POP_CAP: u32 = 10;

/// Income every live settlement earns per second without buildings.
pub const BASE_INCOME: f64 = 10.0;

/// Score points per owned structure.
const SCORE_PER_STRUCTURE: f64 = 10.0;

/// Score points per owned unit.
const SCORE_PER_UNIT: f64 = 5.0;

/// Score points per resident.
const SCORE_PER_RESIDENT: f64 = 0.2;

/// Per-settlement totals gathered in one pass over the map.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettlementTally {
    /// Owned structures (origin tiles only).
    pub structures: u32,
    /// Residents across owned structures.
    pub population: u32,
    /// Capacity from owned housing.
    pub housing_capacity: u32,
    /// Income bonus from owned key buildings.
    pub income_bonus: f64,
}

/// Tally every settlement's structures in a single pass.
#[must_use]
pub fn tally_structures(map: &Map) -> HashMap<PlayerId, SettlementTally> {
    let mut tallies: HashMap<PlayerId, SettlementTally> = HashMap::new();

    for tile in map.tiles() {
        let building = &tile.building;
        let Some(owner) = building.owner else {
            continue;
        };
        if !building.origin || !building.kind.is_structure() {
            continue;
        }

        let tally = tallies.entry(owner).or_default();
        tally.structures += 1;
        tally.population = tally.population.saturating_add(building.population);
        tally.housing_capacity = tally
            .housing_capacity
            .saturating_add(building.kind.housing_capacity());
        tally.income_bonus += building.kind.income_bonus();
    }

    tallies
}

/// Population capacity for a tally.
#[must_use]
pub fn pop_cap(tally: &SettlementTally) -> u32 {
    BASE_POP_CAP.saturating_add(tally.housing_capacity)
}

/// Income per simulated second for a tally.
#[must_use]
pub fn passive_income(tally: &SettlementTally) -> f64 {
    BASE_INCOME + tally.income_bonus
}

/// Income per simulated second for one settlement on this map.
#[must_use]
pub fn income_of(map: &Map, player: PlayerId) -> f64 {
    passive_income(&tally_structures(map).remove(&player).unwrap_or_default())
}

/// Score for the given totals.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score(money: f64, tally: &SettlementTally, unit_count: usize) -> u64 {
    #[allow(clippy::cast_precision_loss)]
    let units = unit_count as f64;
    let raw = money
        + SCORE_PER_STRUCTURE * f64::from(tally.structures)
        + SCORE_PER_UNIT * units
        + SCORE_PER_RESIDENT * f64::from(tally.population);
    raw.max(0.0).floor() as u64
}

/// Recompute `pop_cap` and `score` for every settlement.
///
/// Idempotent: running it twice without an intervening mutation changes
/// nothing.
pub fn recompute_derived(state: &mut MatchState) {
    let tallies = tally_structures(&state.map);

    let mut unit_counts: HashMap<PlayerId, usize> = HashMap::new();
    for unit in &state.units {
        *unit_counts.entry(unit.owner).or_default() += 1;
    }

    for player in &mut state.players {
        let tally = tallies.get(&player.id).copied().unwrap_or_default();
        let units = unit_counts.get(&player.id).copied().unwrap_or(0);
        player.pop_cap = pop_cap(&tally);
        player.score = score(player.money, &tally, units);
    }
}

/// Credit passive income for `dt` seconds and refresh population caps.
///
/// Eliminated settlements earn nothing.
pub fn apply_income(state: &mut MatchState, dt: f64) {
    let tallies = tally_structures(&state.map);

    for player in &mut state.players {
        let tally = tallies.get(&player.id).copied().unwrap_or_default();
        player.pop_cap = pop_cap(&tally);
        if player.is_alive() {
            player.money += passive_income(&tally) * dt;
        }
    }
}
