//! Player commands: training, orders, tech upgrades and selection.
//!
//! Every command either succeeds or returns a [`CommandError`] with the state
//! left exactly as it was, so hosts can call them speculatively.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CommandError;
use crate::game::{spawn_tile, Age, Coord, MatchState, PlayerId, UnitId, UnitKind, UnitOrder};

/// Upper bound on waypoints produced by [`compute_direct_path`].
pub const MAX_PATH_STEPS: usize = 300;

/// A command as issued by a host or recorded in a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Train one unit at the player's base.
    TrainUnit {
        /// Training settlement.
        player: PlayerId,
        /// Unit kind.
        kind: UnitKind,
    },
    /// Give every listed unit the same order.
    IssueOrder {
        /// Units to command.
        units: Vec<UnitId>,
        /// The order.
        order: UnitOrder,
    },
    /// Advance a settlement to its next age.
    UpgradeAge {
        /// Upgrading settlement.
        player: PlayerId,
    },
    /// Replace the UI selection.
    SelectUnits {
        /// Selected units.
        units: Vec<UnitId>,
    },
}

/// Greedy per-axis route from `from` to `to`, including `from`.
///
/// Each step moves at most one tile on each axis, so diagonals are taken
/// while both axes differ. Obstacles are ignored. At most
/// [`MAX_PATH_STEPS`] steps are taken.
#[must_use]
pub fn compute_direct_path(from: Coord, to: Coord) -> Vec<Coord> {
    let mut path = vec![from];
    let mut cursor = from;

    while cursor != to && path.len() <= MAX_PATH_STEPS {
        cursor = Coord::new(step_toward(cursor.x, to.x), step_toward(cursor.y, to.y));
        path.push(cursor);
    }

    path
}

fn step_toward(from: u16, to: u16) -> u16 {
    match from.cmp(&to) {
        std::cmp::Ordering::Less => from + 1,
        std::cmp::Ordering::Greater => from - 1,
        std::cmp::Ordering::Equal => from,
    }
}

impl MatchState {
    /// Apply a recorded or host-issued command.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; the state is unchanged in that case.
    pub fn apply(&mut self, command: &Command) -> Result<(), CommandError> {
        match command {
            Command::TrainUnit { player, kind } => self.train_unit(*player, *kind).map(|_| ()),
            Command::IssueOrder { units, order } => {
                self.issue_order(units, *order);
                Ok(())
            }
            Command::UpgradeAge { player } => self.upgrade_age(*player).map(|_| ()),
            Command::SelectUnits { units } => {
                self.set_selected_units(units.clone());
                Ok(())
            }
        }
    }

    /// Train a unit for `owner` at its base.
    ///
    /// # Errors
    ///
    /// Rejects unknown or eliminated settlements, kinds above the
    /// settlement's age, training past the population cap, and unaffordable
    /// units.
    pub fn train_unit(&mut self, owner: PlayerId, kind: UnitKind) -> Result<UnitId, CommandError> {
        let used = self.population_used(owner);
        let player = self
            .get_player(owner)
            .ok_or(CommandError::UnknownPlayer(owner))?;

        if player.eliminated {
            return Err(CommandError::Eliminated(owner));
        }
        if player.age < kind.required_age() {
            return Err(CommandError::AgeLocked {
                kind,
                required: kind.required_age().number(),
                current: player.age.number(),
            });
        }
        if used + kind.pop_cost() > player.pop_cap {
            return Err(CommandError::PopulationCap {
                used,
                needed: kind.pop_cost(),
                cap: player.pop_cap,
            });
        }
        if player.money < kind.cost() {
            return Err(CommandError::InsufficientFunds {
                needed: kind.cost(),
                available: player.money,
            });
        }

        let spawn = spawn_tile(&self.map, player.base);
        if let Some(player) = self.get_player_mut(owner) {
            player.money -= kind.cost();
        }
        let id = self.spawn_unit(owner, kind, spawn);
        debug!(player = owner, %kind, unit = %id, "unit trained");
        Ok(id)
    }

    /// Give each listed unit `order`, recomputing its route.
    ///
    /// Targets are clamped into the map. Attack orders record the owner of
    /// the structure at the target. Unknown ids are skipped. Returns how many
    /// units received the order.
    pub fn issue_order(&mut self, unit_ids: &[UnitId], order: UnitOrder) -> usize {
        let order = match order {
            UnitOrder::Idle => UnitOrder::Idle,
            UnitOrder::Move { target } => UnitOrder::Move {
                target: self.map.clamp(target),
            },
            UnitOrder::Attack { target, .. } => {
                let target = self.map.clamp(target);
                let target_owner = self
                    .map
                    .find_origin(target)
                    .and_then(|origin| self.map.get(origin))
                    .and_then(|tile| tile.owner());
                UnitOrder::Attack {
                    target,
                    target_owner,
                }
            }
        };

        let mut updated = 0;
        for unit in &mut self.units {
            if !unit_ids.contains(&unit.id) {
                continue;
            }
            unit.order = order;
            match order.target() {
                Some(target) => {
                    unit.path = compute_direct_path(unit.tile, target);
                    unit.path_index = 0;
                    unit.progress = 0.0;
                }
                None => unit.clear_path(),
            }
            updated += 1;
        }
        updated
    }

    /// Advance `player` to its next age.
    ///
    /// # Errors
    ///
    /// Rejects unknown or eliminated settlements, settlements already at the
    /// last age, and unaffordable upgrades.
    pub fn upgrade_age(&mut self, player_id: PlayerId) -> Result<Age, CommandError> {
        let player = self
            .get_player_mut(player_id)
            .ok_or(CommandError::UnknownPlayer(player_id))?;

        if player.eliminated {
            return Err(CommandError::Eliminated(player_id));
        }
        let next = player.age.next().ok_or(CommandError::MaxAge(player.age))?;
        if player.money < next.upgrade_cost() {
            return Err(CommandError::InsufficientFunds {
                needed: next.upgrade_cost(),
                available: player.money,
            });
        }

        player.money -= next.upgrade_cost();
        player.age = next;
        debug!(player = player_id, age = next.number(), "age advanced");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::game::{create_match_on_map, BuildingKind, Map};

    fn create_test_state() -> MatchState {
        create_match_on_map(Map::new(40, 40).unwrap(), &MatchConfig::new(40, 1)).unwrap()
    }

    #[test]
    fn test_direct_path_diagonal_then_straight() {
        let path = compute_direct_path(Coord::new(0, 0), Coord::new(3, 1));
        assert_eq!(
            path,
            vec![
                Coord::new(0, 0),
                Coord::new(1, 1),
                Coord::new(2, 1),
                Coord::new(3, 1)
            ]
        );
    }

    #[test]
    fn test_direct_path_to_self() {
        let path = compute_direct_path(Coord::new(4, 4), Coord::new(4, 4));
        assert_eq!(path, vec![Coord::new(4, 4)]);
    }

    #[test]
    fn test_direct_path_is_capped() {
        let path = compute_direct_path(Coord::new(0, 0), Coord::new(1000, 0));
        assert_eq!(path.len(), MAX_PATH_STEPS + 1);
        assert_eq!(path.last(), Some(&Coord::new(300, 0)));
    }

    #[test]
    fn test_train_unit_debits_and_spawns() {
        let mut state = create_test_state();
        let before = state.get_player(1).unwrap().money;
        let id = state.train_unit(1, UnitKind::Infantry).unwrap();

        let unit = state.get_unit(id).unwrap();
        let base = state.get_player(1).unwrap().base;
        assert_eq!(unit.tile, Coord::new(base.x + 1, base.y + 1));
        assert_eq!(unit.hp, 40);
        assert!((state.get_player(1).unwrap().money - (before - 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_train_unit_age_gate() {
        let mut state = create_test_state();
        let snapshot = state.clone();
        assert!(matches!(
            state.train_unit(1, UnitKind::Helicopter),
            Err(CommandError::AgeLocked { required: 2, .. })
        ));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_train_unit_insufficient_funds_is_noop() {
        let mut state = create_test_state();
        state.get_player_mut(1).unwrap().money = 10.0;
        let snapshot = state.clone();

        let result = state.train_unit(1, UnitKind::Infantry);
        assert!(matches!(result, Err(CommandError::InsufficientFunds { .. })));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_train_unit_population_cap() {
        let mut state = create_test_state();
        state.get_player_mut(1).unwrap().money = 100_000.0;
        // Cap 20, two starter infantry already use 2.
        for _ in 0..18 {
            state.train_unit(1, UnitKind::Infantry).unwrap();
        }
        assert!(matches!(
            state.train_unit(1, UnitKind::Infantry),
            Err(CommandError::PopulationCap { used: 20, needed: 1, cap: 20 })
        ));
    }

    #[test]
    fn test_training_ignores_barracks() {
        let mut state = create_test_state();
        let base = state.get_player(1).unwrap().base;
        let barracks = Coord::new(base.x + 2, base.y + 3);
        assert_eq!(state.map.get(barracks).unwrap().kind(), BuildingKind::Barracks);
        assert!(state.map.clear_structure(barracks).is_some());

        state.get_player_mut(1).unwrap().money = 2_000.0;
        state.train_unit(1, UnitKind::Infantry).unwrap();
        state.upgrade_age(1).unwrap();
        state.train_unit(1, UnitKind::Helicopter).unwrap();
    }

    #[test]
    fn test_train_unit_rejects_unknown_and_eliminated() {
        let mut state = create_test_state();
        assert_eq!(
            state.train_unit(9, UnitKind::Infantry).err(),
            Some(CommandError::UnknownPlayer(9))
        );
        state.get_player_mut(2).unwrap().eliminate();
        assert_eq!(
            state.train_unit(2, UnitKind::Infantry).err(),
            Some(CommandError::Eliminated(2))
        );
    }

    #[test]
    fn test_issue_move_order_clamps_and_routes() {
        let mut state = create_test_state();
        let ids: Vec<UnitId> = state.units_of(1).map(|u| u.id).collect();
        let updated = state.issue_order(
            &ids,
            UnitOrder::Move {
                target: Coord::new(500, 14),
            },
        );
        assert_eq!(updated, 2);

        let unit = state.get_unit(ids[0]).unwrap();
        assert_eq!(unit.order, UnitOrder::Move { target: Coord::new(39, 14) });
        assert_eq!(unit.path.first(), Some(&unit.tile));
        assert_eq!(unit.path.last(), Some(&Coord::new(39, 14)));
        assert_eq!(unit.path_index, 0);
    }

    #[test]
    fn test_issue_attack_order_records_owner() {
        let mut state = create_test_state();
        let enemy_base = state.get_player(2).unwrap().base;
        let ids: Vec<UnitId> = state.units_of(1).map(|u| u.id).collect();
        // Aim at the far corner of the 2x2 city hall.
        let target = Coord::new(enemy_base.x + 1, enemy_base.y + 1);
        state.issue_order(
            &ids,
            UnitOrder::Attack {
                target,
                target_owner: None,
            },
        );

        let unit = state.get_unit(ids[1]).unwrap();
        assert_eq!(
            unit.order,
            UnitOrder::Attack {
                target,
                target_owner: Some(2)
            }
        );
    }

    #[test]
    fn test_issue_idle_clears_route() {
        let mut state = create_test_state();
        let ids: Vec<UnitId> = state.units_of(1).map(|u| u.id).collect();
        state.issue_order(&ids, UnitOrder::Move { target: Coord::new(20, 20) });
        state.issue_order(&ids[..1], UnitOrder::Idle);

        let stopped = state.get_unit(ids[0]).unwrap();
        assert_eq!(stopped.order, UnitOrder::Idle);
        assert!(stopped.path.is_empty());
        assert!(state.get_unit(ids[1]).unwrap().has_route());
    }

    #[test]
    fn test_upgrade_age() {
        let mut state = create_test_state();
        state.get_player_mut(1).unwrap().money = 1200.0;

        assert_eq!(state.upgrade_age(1), Ok(Age::Second));
        assert_eq!(state.upgrade_age(1), Ok(Age::Third));
        assert_eq!(state.upgrade_age(1), Err(CommandError::MaxAge(Age::Third)));
        assert!(state.get_player(1).unwrap().money.abs() < 1e-9);
    }

    #[test]
    fn test_upgrade_age_insufficient_funds() {
        let mut state = create_test_state();
        state.get_player_mut(1).unwrap().money = 100.0;
        let snapshot = state.clone();
        assert!(state.upgrade_age(1).is_err());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_apply_command() {
        let mut state = create_test_state();
        state
            .apply(&Command::TrainUnit {
                player: 1,
                kind: UnitKind::Infantry,
            })
            .unwrap();
        assert_eq!(state.units_of(1).count(), 3);

        let ids: Vec<UnitId> = state.units_of(1).map(|u| u.id).collect();
        state
            .apply(&Command::SelectUnits { units: ids.clone() })
            .unwrap();
        assert_eq!(state.selected_units, ids);

        // Terrain targets record no owner.
        state.map.place_building(Coord::new(30, 5), BuildingKind::Road, None);
        state
            .apply(&Command::IssueOrder {
                units: ids.clone(),
                order: UnitOrder::Attack {
                    target: Coord::new(30, 5),
                    target_owner: Some(2),
                },
            })
            .unwrap();
        assert!(matches!(
            state.get_unit(ids[0]).unwrap().order,
            UnitOrder::Attack { target_owner: None, .. }
        ));
    }
}
