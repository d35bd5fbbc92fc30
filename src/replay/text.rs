//! Structured plain-text summary of a match.
//!
//! Machine-readable first, human-parseable second: one block per settlement
//! with fixed `- Key: value` lines.

#![allow(clippy::format_push_string)]

use crate::game::{BuildingKind, MatchState, Settlement, UnitKind, UnitOrder};

/// Render match state to structured text.
///
/// Output format:
/// ```text
/// === TICK 42 OF 12000 ===
///
/// MAP (64x64):
/// Terrain: 212 water, 230 trees
/// Bases:
/// - P1 (You) at (12, 12)
///
/// PLAYER 1 (You, human):
/// - Status: active
/// - Money: 1034
/// ...
/// ```
#[must_use]
pub fn render_text(state: &MatchState, max_ticks: u64) -> String {
    let mut output = String::new();

    output.push_str(&format!("=== TICK {} OF {max_ticks} ===\n\n", state.tick));
    render_map_overview(&mut output, state);
    for player in &state.players {
        render_player_status(&mut output, state, player);
    }
    render_match_status(&mut output, state);

    output
}

fn render_map_overview(output: &mut String, state: &MatchState) {
    let (width, height) = (state.map.width(), state.map.height());
    output.push_str(&format!("MAP ({width}x{height}):\n"));

    let tiles = state.map.tiles();
    let water = tiles.iter().filter(|t| t.kind() == BuildingKind::Water).count();
    let trees = tiles.iter().filter(|t| t.kind() == BuildingKind::Tree).count();
    output.push_str(&format!("Terrain: {water} water, {trees} trees\n"));

    output.push_str("Bases:\n");
    for player in state.alive_players() {
        output.push_str(&format!(
            "- P{} ({}) at {}\n",
            player.id, player.name, player.base
        ));
    }
    output.push('\n');
}

fn render_player_status(output: &mut String, state: &MatchState, player: &Settlement) {
    let role = if player.is_ai { "ai" } else { "human" };
    output.push_str(&format!(
        "PLAYER {} ({}, {role}):\n",
        player.id, player.name
    ));

    if player.eliminated {
        output.push_str("- Status: eliminated\n\n");
        return;
    }

    output.push_str("- Status: active\n");
    output.push_str(&format!("- Money: {:.0}\n", player.money));
    output.push_str(&format!("- Age: {}\n", player.age.number()));
    output.push_str(&format!("- Score: {}\n", player.score));
    output.push_str(&format!(
        "- Population: {}/{}\n",
        state.population_used(player.id),
        player.pop_cap
    ));

    let structures = state.map.structures_owned_by(player.id).count();
    let hall_damage = state
        .map
        .get(player.base)
        .filter(|t| t.kind() == BuildingKind::CityHall && t.owner() == Some(player.id))
        .map_or(0.0, |t| t.building.damage);
    output.push_str(&format!(
        "- Structures: {structures} (city hall damage {hall_damage:.0}%)\n"
    ));

    let counts: Vec<String> = UnitKind::ALL
        .iter()
        .map(|kind| {
            let n = state.units_of(player.id).filter(|u| u.kind == *kind).count();
            format!("{n} {kind}")
        })
        .collect();
    output.push_str(&format!("- Units: {}\n", counts.join(", ")));

    let (mut idle, mut moving, mut attacking) = (0, 0, 0);
    for unit in state.units_of(player.id) {
        match unit.order {
            UnitOrder::Idle => idle += 1,
            UnitOrder::Move { .. } => moving += 1,
            UnitOrder::Attack { .. } => attacking += 1,
        }
    }
    output.push_str(&format!(
        "- Orders: {idle} idle, {moving} moving, {attacking} attacking\n\n"
    ));
}

fn render_match_status(output: &mut String, state: &MatchState) {
    output.push_str("MATCH STATUS:\n");
    match state.winner() {
        Some(winner) => output.push_str(&format!("- Winner: Player {winner}\n")),
        None => output.push_str(&format!(
            "- Running: {} settlements remain\n",
            state.alive_players().count()
        )),
    }
}
