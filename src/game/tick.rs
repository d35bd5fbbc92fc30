//! Tick orchestration: elimination, economy, AI, units, win detection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::game::{
    advance_unit, apply_income, recompute_derived, resolve_attack, run_ai_phase, AttackOutcome,
    BuildingKind, MatchState, MatchStatus, PlayerId, StructureDestroyed, UnitId,
};

/// Everything notable that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Settlements eliminated at the start of the tick.
    pub eliminated: Vec<PlayerId>,
    /// Structures cleared by combat.
    pub destroyed: Vec<StructureDestroyed>,
    /// Units trained by AI settlements.
    pub trained: Vec<UnitId>,
    /// Winner decided this tick.
    pub winner: Option<PlayerId>,
}

impl TickEvents {
    /// Whether nothing notable happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eliminated.is_empty()
            && self.destroyed.is_empty()
            && self.trained.is_empty()
            && self.winner.is_none()
    }
}

/// Advance the match by `dt` simulated seconds.
///
/// A non-positive or non-finite `dt` leaves the state untouched, tick
/// counter included. Otherwise the phases run in a fixed order:
/// elimination, unit cleanup, income, AI, movement and combat, win check,
/// derived recompute.
pub fn simulate_tick(state: &mut MatchState, dt: f64) -> TickEvents {
    let mut events = TickEvents::default();
    if !dt.is_finite() || dt <= 0.0 {
        return events;
    }

    events.eliminated = check_eliminations(state);
    state.units.retain(|unit| {
        state
            .players
            .iter()
            .any(|p| p.id == unit.owner && p.is_alive())
    });

    apply_income(state, dt);
    events.trained = run_ai_phase(state);

    let MatchState {
        map,
        players,
        units,
        ..
    } = state;
    for unit in units.iter_mut() {
        unit.attack_cooldown = (unit.attack_cooldown - dt).max(0.0);
        advance_unit(unit, dt);
        if let AttackOutcome::Destroyed(destroyed) = resolve_attack(map, players, unit) {
            info!(
                owner = destroyed.owner,
                kind = ?destroyed.kind,
                origin = %destroyed.origin,
                by = %destroyed.by,
                "structure destroyed"
            );
            events.destroyed.push(destroyed);
        }
    }

    events.winner = check_winner(state);
    recompute_derived(state);
    state.tick += 1;

    trace!(tick = state.tick, units = state.units.len(), "tick complete");
    events
}

/// Eliminate every live settlement without a command structure.
///
/// Returns the settlements eliminated by this call. Elimination never
/// reverts.
pub fn check_eliminations(state: &mut MatchState) -> Vec<PlayerId> {
    let holders: HashSet<PlayerId> = state
        .map
        .tiles()
        .iter()
        .filter(|t| t.building.origin && t.kind() == BuildingKind::CityHall)
        .filter_map(|t| t.owner())
        .collect();

    let mut eliminated = Vec::new();
    for player in &mut state.players {
        if player.is_alive() && !holders.contains(&player.id) {
            player.eliminate();
            info!(player = player.id, name = %player.name, "settlement eliminated");
            eliminated.push(player.id);
        }
    }
    eliminated
}

/// Declare a winner once exactly one settlement remains.
///
/// Returns the winner only on the tick it is decided.
fn check_winner(state: &mut MatchState) -> Option<PlayerId> {
    if state.is_over() {
        return None;
    }

    let winner = {
        let mut alive = state.alive_players();
        let (Some(last), None) = (alive.next(), alive.next()) else {
            return None;
        };
        last.id
    };
    state.status = MatchStatus::Won(winner);
    info!(winner, tick = state.tick, "match won");
    Some(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::game::{create_match_on_map, Coord, Map, UnitOrder};

    fn create_test_state() -> MatchState {
        create_match_on_map(Map::new(40, 40).unwrap(), &MatchConfig::new(40, 1)).unwrap()
    }

    #[test]
    fn test_non_positive_dt_is_noop() {
        let mut state = create_test_state();
        let before = state.clone();

        assert!(simulate_tick(&mut state, 0.0).is_empty());
        assert!(simulate_tick(&mut state, -1.0).is_empty());
        assert!(simulate_tick(&mut state, f64::NAN).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_tick_advances_counter_and_income() {
        let mut state = create_test_state();
        // Keep the AI asleep so its spending does not interfere.
        state.get_player_mut(2).unwrap().ai_next_action_tick = Some(100);
        let before = state.get_player(1).unwrap().money;

        simulate_tick(&mut state, 1.0);
        assert_eq!(state.tick, 1);
        // Base 10 + city hall 8 + factory 6.
        assert!((state.get_player(1).unwrap().money - (before + 24.0)).abs() < 1e-9);
    }

    #[test]
    fn test_elimination_drops_units_and_decides_winner() {
        let mut state = create_test_state();
        let base = state.get_player(2).unwrap().base;
        state.map.clear_structure(base);

        let events = simulate_tick(&mut state, 0.25);
        assert_eq!(events.eliminated, vec![2]);
        assert_eq!(events.winner, Some(1));
        assert_eq!(state.units_of(2).count(), 0);
        assert_eq!(state.winner(), Some(1));

        // Neither reverts, and the winner is reported once.
        let events = simulate_tick(&mut state, 0.25);
        assert!(events.eliminated.is_empty());
        assert_eq!(events.winner, None);
        assert!(state.get_player(2).unwrap().eliminated);
        assert_eq!(state.winner(), Some(1));
    }

    #[test]
    fn test_ai_trains_on_first_tick() {
        let mut state = create_test_state();
        let events = simulate_tick(&mut state, 0.25);
        assert_eq!(events.trained.len(), 1);
        assert_eq!(state.units_of(2).count(), 3);
    }

    #[test]
    fn test_units_move_and_strike_in_one_pass() {
        let mut state = create_test_state();
        state.get_player_mut(2).unwrap().ai_next_action_tick = Some(1000);
        let enemy = state.get_player(2).unwrap().base;

        // Park a tank next to the enemy city hall.
        let id = state.spawn_unit(1, crate::game::UnitKind::Tank, Coord::new(enemy.x, enemy.y + 3));
        state.issue_order(&[id], UnitOrder::Attack { target: enemy, target_owner: None });

        simulate_tick(&mut state, 0.25);
        let gauge = state.map.get(enemy).unwrap().building.damage;
        assert!((gauge - 12.0).abs() < 1e-9);

        // Cooldown 0.7s blocks the next two ticks.
        simulate_tick(&mut state, 0.25);
        simulate_tick(&mut state, 0.25);
        assert!((state.map.get(enemy).unwrap().building.damage - 12.0).abs() < 1e-9);
        simulate_tick(&mut state, 0.25);
        assert!((state.map.get(enemy).unwrap().building.damage - 24.0).abs() < 1e-9);
    }
}
