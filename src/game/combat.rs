//! Combat resolution against structures.
//!
//! Units never fight each other. An attacking unit in range and off cooldown
//! adds its kind's damage to the destruction gauge of the targeted
//! structure's origin tile; a full gauge turns the footprint into grass.

use serde::{Deserialize, Serialize};

use crate::game::{
    BuildingKind, Coord, Map, MilitaryUnit, PlayerId, Settlement, UnitId, UnitOrder,
    ATTACK_COOLDOWN, DESTRUCTION_THRESHOLD,
};

/// A structure cleared by combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDestroyed {
    /// Origin tile of the cleared footprint.
    pub origin: Coord,
    /// Kind of the cleared structure.
    pub kind: BuildingKind,
    /// Settlement that owned it.
    pub owner: PlayerId,
    /// Unit that landed the final strike.
    pub by: UnitId,
}

/// What a unit's attack check did this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// The unit has no attack order.
    NotAttacking,
    /// Target is beyond the unit's range.
    OutOfRange,
    /// Target in range but the unit is still cooling down.
    CoolingDown,
    /// Damage applied; the gauge now reads `gauge`.
    Struck {
        /// Origin tile that took the damage.
        origin: Coord,
        /// Gauge after the strike.
        gauge: f64,
    },
    /// The strike filled the gauge and the structure was cleared.
    Destroyed(StructureDestroyed),
    /// No valid enemy structure at the target; the unit went idle.
    Abandoned,
}

/// Run the attack check for one unit, after it has moved this tick.
///
/// The target is valid when the structure covering it belongs to a live
/// settlement other than the attacker, and to the same settlement that
/// owned it when the order was issued (if one did).
pub fn resolve_attack(
    map: &mut Map,
    players: &[Settlement],
    unit: &mut MilitaryUnit,
) -> AttackOutcome {
    let UnitOrder::Attack {
        target,
        target_owner,
    } = unit.order
    else {
        return AttackOutcome::NotAttacking;
    };

    if unit.tile.distance(target) > unit.kind.attack_range() {
        return AttackOutcome::OutOfRange;
    }
    if unit.attack_cooldown > 0.0 {
        return AttackOutcome::CoolingDown;
    }

    let Some((origin, owner)) = hostile_structure(map, players, unit.owner, target, target_owner)
    else {
        unit.go_idle();
        return AttackOutcome::Abandoned;
    };

    unit.attack_cooldown = ATTACK_COOLDOWN;
    let Some(tile) = map.get_mut(origin) else {
        return AttackOutcome::Abandoned;
    };
    tile.building.damage += unit.kind.damage();
    let gauge = tile.building.damage;

    if gauge < DESTRUCTION_THRESHOLD {
        return AttackOutcome::Struck { origin, gauge };
    }

    match map.clear_structure(origin) {
        Some((kind, _)) => AttackOutcome::Destroyed(StructureDestroyed {
            origin,
            kind,
            owner,
            by: unit.id,
        }),
        None => AttackOutcome::Struck { origin, gauge },
    }
}

/// Origin and owner of the enemy structure at `target`, if it may be hit.
fn hostile_structure(
    map: &Map,
    players: &[Settlement],
    attacker: PlayerId,
    target: Coord,
    target_owner: Option<PlayerId>,
) -> Option<(Coord, PlayerId)> {
    let origin = map.find_origin(target)?;
    let owner = map.get(origin)?.owner()?;

    if owner == attacker {
        return None;
    }
    if target_owner.is_some_and(|recorded| recorded != owner) {
        return None;
    }
    let alive = players.iter().any(|p| p.id == owner && p.is_alive());
    alive.then_some((origin, owner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::UnitKind;

    fn create_test_world() -> (Map, Vec<Settlement>) {
        let mut map = Map::new(20, 20).unwrap();
        map.place_building(Coord::new(2, 2), BuildingKind::CityHall, Some(1));
        map.place_building(Coord::new(10, 10), BuildingKind::CityHall, Some(2));
        map.place_building(Coord::new(14, 10), BuildingKind::HouseSmall, Some(2));
        let players = vec![
            Settlement::new(1, "You", false, Coord::new(2, 2)),
            Settlement::new(2, "Rival", true, Coord::new(10, 10)),
        ];
        (map, players)
    }

    fn attacker(kind: UnitKind, tile: Coord, target: Coord) -> MilitaryUnit {
        let mut unit = MilitaryUnit::new(UnitId { owner: 1, serial: 0 }, kind, tile);
        unit.order = UnitOrder::Attack {
            target,
            target_owner: Some(2),
        };
        unit
    }

    #[test]
    fn test_strike_damages_origin() {
        let (mut map, players) = create_test_world();
        // Aim at a non-origin footprint tile.
        let mut unit = attacker(UnitKind::Tank, Coord::new(11, 13), Coord::new(11, 11));

        let outcome = resolve_attack(&mut map, &players, &mut unit);
        assert_eq!(
            outcome,
            AttackOutcome::Struck {
                origin: Coord::new(10, 10),
                gauge: 12.0
            }
        );
        assert!((map.get(Coord::new(10, 10)).unwrap().building.damage - 12.0).abs() < 1e-9);
        assert!((unit.attack_cooldown - ATTACK_COOLDOWN).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_never_damages() {
        let (mut map, players) = create_test_world();
        // Distance 3.0 exceeds infantry range 2.2.
        let mut unit = attacker(UnitKind::Infantry, Coord::new(10, 13), Coord::new(10, 10));

        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::OutOfRange);
        assert!(map.get(Coord::new(10, 10)).unwrap().building.damage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_range_boundary_is_inclusive() {
        let (mut map, players) = create_test_world();
        // Distance exactly 3.0 equals tank range.
        let mut unit = attacker(UnitKind::Tank, Coord::new(10, 13), Coord::new(10, 10));
        assert!(matches!(
            resolve_attack(&mut map, &players, &mut unit),
            AttackOutcome::Struck { .. }
        ));
    }

    #[test]
    fn test_cooldown_blocks_strike() {
        let (mut map, players) = create_test_world();
        let mut unit = attacker(UnitKind::Infantry, Coord::new(10, 11), Coord::new(10, 10));
        unit.attack_cooldown = 0.2;

        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::CoolingDown);
    }

    #[test]
    fn test_full_gauge_clears_footprint() {
        let (mut map, players) = create_test_world();
        if let Some(tile) = map.get_mut(Coord::new(10, 10)) {
            tile.building.damage = 96.0;
        }
        let mut unit = attacker(UnitKind::Infantry, Coord::new(10, 12), Coord::new(10, 10));

        let outcome = resolve_attack(&mut map, &players, &mut unit);
        assert_eq!(
            outcome,
            AttackOutcome::Destroyed(StructureDestroyed {
                origin: Coord::new(10, 10),
                kind: BuildingKind::CityHall,
                owner: 2,
                by: unit.id,
            })
        );
        assert!(!map.has_command_structure(2));
        assert_eq!(map.get(Coord::new(11, 11)).unwrap().kind(), BuildingKind::Grass);
        assert_eq!(map.get(Coord::new(11, 11)).unwrap().owner(), None);
    }

    #[test]
    fn test_neutral_target_abandons_order() {
        let (mut map, players) = create_test_world();
        let mut unit = attacker(UnitKind::Infantry, Coord::new(5, 15), Coord::new(5, 16));
        unit.path = vec![Coord::new(5, 15), Coord::new(5, 16)];

        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::Abandoned);
        assert_eq!(unit.order, UnitOrder::Idle);
        assert!(unit.path.is_empty());
    }

    #[test]
    fn test_friendly_target_abandons_order() {
        let (mut map, players) = create_test_world();
        let mut unit = attacker(UnitKind::Infantry, Coord::new(3, 3), Coord::new(2, 2));
        unit.order = UnitOrder::Attack {
            target: Coord::new(2, 2),
            target_owner: None,
        };

        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::Abandoned);
        assert!(map.get(Coord::new(2, 2)).unwrap().building.damage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_eliminated_owner_abandons_order() {
        let (mut map, mut players) = create_test_world();
        players[1].eliminate();
        let mut unit = attacker(UnitKind::Infantry, Coord::new(14, 11), Coord::new(14, 10));

        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::Abandoned);
    }

    #[test]
    fn test_reassigned_target_abandons_order() {
        let (mut map, players) = create_test_world();
        map.place_building(Coord::new(14, 10), BuildingKind::HouseSmall, Some(3));
        let mut unit = attacker(UnitKind::Infantry, Coord::new(14, 11), Coord::new(14, 10));

        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::Abandoned);
    }

    #[test]
    fn test_idle_unit_is_not_attacking() {
        let (mut map, players) = create_test_world();
        let mut unit = MilitaryUnit::new(UnitId { owner: 1, serial: 0 }, UnitKind::Tank, Coord::new(10, 12));
        assert_eq!(resolve_attack(&mut map, &players, &mut unit), AttackOutcome::NotAttacking);
    }
}
