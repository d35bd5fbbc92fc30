//! Match state: the aggregate root every operation reads and writes.

use serde::{Deserialize, Serialize};

use crate::game::{Coord, Map, MilitaryUnit, PlayerId, Settlement, UnitId, UnitKind};

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "winner", rename_all = "snake_case")]
pub enum MatchStatus {
    /// More than one settlement is still standing.
    #[default]
    Running,
    /// Terminal: only this settlement remains.
    Won(PlayerId),
}

/// Complete state of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// The shared tile grid. Its width is the map size.
    pub map: Map,
    /// All settlements, human first.
    pub players: Vec<Settlement>,
    /// All living units.
    pub units: Vec<MilitaryUnit>,
    /// Settlement controlled by the local user.
    pub local_player: PlayerId,
    /// Units selected in the UI. Not interpreted by the simulation.
    pub selected_units: Vec<UnitId>,
    /// Running or won.
    pub status: MatchStatus,
    /// Number of completed ticks.
    pub tick: u64,
    /// Seed for AI rolls.
    pub seed: u64,
    /// Serial handed to the next trained unit.
    pub(crate) next_unit_serial: u32,
}

impl MatchState {
    /// Assemble a state from its parts. Derived stats are not computed.
    #[must_use]
    pub fn new(map: Map, players: Vec<Settlement>, local_player: PlayerId, seed: u64) -> Self {
        Self {
            map,
            players,
            units: Vec::new(),
            local_player,
            selected_units: Vec::new(),
            status: MatchStatus::Running,
            tick: 0,
            seed,
            next_unit_serial: 0,
        }
    }

    /// Side length of the map.
    #[must_use]
    pub const fn map_size(&self) -> u16 {
        self.map.width()
    }

    /// Winner, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        match self.status {
            MatchStatus::Running => None,
            MatchStatus::Won(id) => Some(id),
        }
    }

    /// Whether a winner has been decided.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.status, MatchStatus::Won(_))
    }

    /// Get a settlement by id.
    #[must_use]
    pub fn get_player(&self, id: PlayerId) -> Option<&Settlement> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Get a mutable settlement by id.
    #[must_use]
    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Settlement> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Settlements still in the match.
    pub fn alive_players(&self) -> impl Iterator<Item = &Settlement> {
        self.players.iter().filter(|p| p.is_alive())
    }

    /// Whether `id` names a live settlement.
    #[must_use]
    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.get_player(id).is_some_and(Settlement::is_alive)
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get_unit(&self, id: UnitId) -> Option<&MilitaryUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Units owned by a settlement.
    pub fn units_of(&self, owner: PlayerId) -> impl Iterator<Item = &MilitaryUnit> {
        self.units.iter().filter(move |u| u.owner == owner)
    }

    /// Population used by a settlement's units.
    #[must_use]
    pub fn population_used(&self, owner: PlayerId) -> u32 {
        self.units_of(owner).map(|u| u.kind.pop_cost()).sum()
    }

    /// Append a fresh unit and return its id.
    pub(crate) fn spawn_unit(&mut self, owner: PlayerId, kind: UnitKind, tile: Coord) -> UnitId {
        let id = UnitId {
            owner,
            serial: self.next_unit_serial,
        };
        self.next_unit_serial += 1;
        self.units.push(MilitaryUnit::new(id, kind, tile));
        id
    }

    /// Replace the UI selection. Pass-through state.
    pub fn set_selected_units(&mut self, ids: Vec<UnitId>) {
        self.selected_units = ids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_state() -> MatchState {
        let map = Map::new(40, 40).unwrap();
        let players = vec![
            Settlement::new(1, "You", false, Coord::new(5, 5)),
            Settlement::new(2, "Rival", true, Coord::new(30, 30)),
        ];
        MatchState::new(map, players, 1, 42)
    }

    #[test]
    fn test_state_creation() {
        let state = create_test_state();
        assert_eq!(state.map_size(), 40);
        assert_eq!(state.tick, 0);
        assert_eq!(state.winner(), None);
        assert!(!state.is_over());
        assert_eq!(state.alive_players().count(), 2);
    }

    #[test]
    fn test_spawn_unit_ids_are_unique() {
        let mut state = create_test_state();
        let a = state.spawn_unit(1, UnitKind::Infantry, Coord::new(6, 6));
        let b = state.spawn_unit(2, UnitKind::Infantry, Coord::new(31, 31));
        let c = state.spawn_unit(1, UnitKind::Tank, Coord::new(6, 6));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(state.population_used(1), 4);
        assert_eq!(state.units_of(2).count(), 1);
    }

    #[test]
    fn test_set_selected_units() {
        let mut state = create_test_state();
        let id = state.spawn_unit(1, UnitKind::Infantry, Coord::new(6, 6));
        state.set_selected_units(vec![id]);
        assert_eq!(state.selected_units, vec![id]);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&MatchStatus::Won(2)).unwrap();
        assert_eq!(json, r#"{"state":"won","winner":2}"#);
    }
}
