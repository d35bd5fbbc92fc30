//! Per-tick unit movement along precomputed routes.

use crate::game::{compute_direct_path, MilitaryUnit, UnitOrder};

/// Advance `unit` along its route by `dt` seconds.
///
/// Progress accumulates at the kind's speed; each whole tile of progress
/// consumes one waypoint and snaps the unit onto it. Reaching the last
/// waypoint resets progress, and a unit under a move order goes idle.
/// An attacking unit whose capped route ended short of its target plans
/// the next leg from where it stands.
///
/// Returns the number of tiles stepped.
pub fn advance_unit(unit: &mut MilitaryUnit, dt: f64) -> usize {
    let mut steps = 0;

    if let UnitOrder::Attack { target, .. } = unit.order
        && unit.tile != target
        && !unit.has_route()
    {
        unit.path = compute_direct_path(unit.tile, target);
        unit.path_index = 0;
        unit.progress = 0.0;
    }

    if unit.has_route() {
        unit.progress += dt * unit.kind.speed();
        while unit.progress >= 1.0 && unit.has_route() {
            unit.progress -= 1.0;
            unit.path_index += 1;
            unit.tile = unit.path[unit.path_index];
            steps += 1;
        }
        if !unit.has_route() {
            unit.progress = 0.0;
        }
    }

    if matches!(unit.order, UnitOrder::Move { .. }) && !unit.has_route() {
        unit.go_idle();
    }

    steps
}
