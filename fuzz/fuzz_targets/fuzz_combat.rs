#![no_main]

use arbitrary::Arbitrary;
use skirmish::game::{check_invariants, create_match_on_map, resolve_attack, AttackOutcome};
use skirmish::{Coord, Map, MatchConfig, MilitaryUnit, UnitId, UnitKind, UnitOrder};
use libfuzzer_sys::fuzz_target;

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    /// Attacker position.
    x: u8,
    y: u8,
    /// Target tile, anywhere on the map.
    target_x: u8,
    target_y: u8,
    /// Attacking settlement.
    owner: u8,
    /// Recorded target owner, if any.
    target_owner: Option<u8>,
    kind: u8,
    /// Starting gauge of the struck tile.
    preset_damage: u8,
    strikes: u8,
}

fuzz_target!(|input: CombatInput| {
    let config = MatchConfig::new(32, 3);
    let Some(map) = Map::new(32, 32) else {
        return;
    };
    let Ok(mut state) = create_match_on_map(map, &config) else {
        return;
    };

    let target = Coord::new(u16::from(input.target_x % 32), u16::from(input.target_y % 32));
    if let Some(tile) = state.map.get_mut(target)
        && tile.kind().is_structure()
    {
        tile.building.damage = f64::from(input.preset_damage % 100);
    }

    let kind = UnitKind::ALL[usize::from(input.kind) % UnitKind::ALL.len()];
    let owner = input.owner % 5;
    let tile = Coord::new(u16::from(input.x % 32), u16::from(input.y % 32));
    let mut unit = MilitaryUnit::new(UnitId { owner, serial: 0 }, kind, tile);
    unit.order = UnitOrder::Attack {
        target,
        target_owner: input.target_owner.map(|o| o % 5),
    };

    for _ in 0..input.strikes % 32 {
        unit.attack_cooldown = 0.0;
        let outcome = resolve_attack(&mut state.map, &state.players, &mut unit);
        match outcome {
            AttackOutcome::Struck { gauge, .. } => {
                assert!(gauge < 100.0, "gauge {gauge} should have destroyed the structure");
            }
            AttackOutcome::Destroyed(destroyed) => {
                assert_ne!(destroyed.owner, owner, "friendly structure destroyed");
            }
            _ => continue,
        }
        assert!(unit.tile.distance(target) <= kind.attack_range(), "strike beyond range");
    }

    // The stray unit is not in the roster, so only map-level invariants apply.
    let violations = check_invariants(&state);
    assert!(violations.is_empty(), "Invariants violated: {violations:?}");
});
