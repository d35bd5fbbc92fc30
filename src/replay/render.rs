//! ASCII renderer for terminal viewing with ANSI colors.

// format! into push_str keeps the layout code readable
#![allow(clippy::format_push_string)]

use std::collections::HashMap;

use crate::game::{BuildingKind, Coord, MatchState, MilitaryUnit, PlayerId, UnitKind};

/// ANSI color codes for settlements, indexed by id - 1.
const PLAYER_COLORS: [&str; 4] = [
    "\x1b[34m", // Player 1: Blue
    "\x1b[31m", // Player 2: Red
    "\x1b[32m", // Player 3: Green
    "\x1b[33m", // Player 4: Yellow
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const WHITE: &str = "\x1b[37m";
const GRAY: &str = "\x1b[90m";
const CYAN: &str = "\x1b[36m";

/// Render match state to ASCII with ANSI colors.
///
/// Output format:
/// ```text
/// Tick 42/12000                           [P1: 1034] [P2: 987]
/// ┌──────────────────────────────────────────────────┐
/// │ . . ~ ~ . . ^ . . . . . . . . . . . . . . . . . │
/// │ . . C C h . . i . . . . . . . . . . . . . . . . │
/// └──────────────────────────────────────────────────┘
/// ```
#[must_use]
pub fn render_ascii(state: &MatchState, max_ticks: u64) -> String {
    let mut output = String::new();

    render_header(&mut output, state, max_ticks);
    render_map(&mut output, state);

    output.push_str(
        "\nLegend: C=City hall  h/H/A/T=Housing  F=Factory  B=Barracks  ~=Water  ^=Tree  =:Road\n",
    );
    output.push_str("        i=Infantry  t=Tank  x=Helicopter  (colour = owner)\n\n");

    render_player_stats(&mut output, state);

    output.push_str("\n[<] Back  [>] Forward  [g] Goto tick  [q] Quit\n");

    output
}

/// Render the header line with tick number and scores.
fn render_header(output: &mut String, state: &MatchState, max_ticks: u64) {
    let tick_info = format!("Tick {}/{max_ticks}", state.tick);
    output.push_str(&tick_info);
    output.push_str(&" ".repeat(40usize.saturating_sub(tick_info.len())));

    for player in &state.players {
        let color = player_color(player.id);
        output.push_str(&format!("{color}[P{}: {}]{RESET} ", player.id, player.score));
    }
    output.push('\n');
}

/// Render the map grid with units drawn over their tiles.
fn render_map(output: &mut String, state: &MatchState) {
    let width = usize::from(state.map.width());
    let units: HashMap<Coord, &MilitaryUnit> = state.units.iter().map(|u| (u.tile, u)).collect();

    output.push('┌');
    output.push_str(&"─".repeat(width * 2 + 1));
    output.push_str("┐\n");

    for y in 0..state.map.height() {
        output.push_str("│ ");
        for x in 0..state.map.width() {
            let coord = Coord::new(x, y);
            match units.get(&coord) {
                Some(unit) => render_unit(output, unit),
                None => render_tile(output, state, coord),
            }
            output.push(' ');
        }
        output.push_str("│\n");
    }

    output.push('└');
    output.push_str(&"─".repeat(width * 2 + 1));
    output.push_str("┘\n");
}

fn render_unit(output: &mut String, unit: &MilitaryUnit) {
    let color = player_color(unit.owner);
    output.push_str(&format!("{BOLD}{color}{}{RESET}", unit_symbol(unit.kind)));
}

/// Render a single tile.
fn render_tile(output: &mut String, state: &MatchState, coord: Coord) {
    let Some(tile) = state.map.get(coord) else {
        output.push('?');
        return;
    };

    let symbol = building_symbol(tile.kind());
    match (tile.kind(), tile.owner()) {
        (_, Some(owner)) => {
            let color = player_color(owner);
            output.push_str(&format!("{color}{symbol}{RESET}"));
        }
        (BuildingKind::Water, None) => output.push_str(&format!("{CYAN}{symbol}{RESET}")),
        (_, None) => output.push_str(&format!("{GRAY}{symbol}{RESET}")),
    }
}

/// Single-character symbol for a building kind.
#[must_use]
pub fn building_symbol(kind: BuildingKind) -> char {
    match kind {
        BuildingKind::Grass => '.',
        BuildingKind::Water => '~',
        BuildingKind::Road => '=',
        BuildingKind::Rail => '#',
        BuildingKind::Tree => '^',
        BuildingKind::HouseSmall => 'h',
        BuildingKind::HouseMedium => 'H',
        BuildingKind::Apartment => 'A',
        BuildingKind::Tower => 'T',
        BuildingKind::Factory => 'F',
        BuildingKind::Shop => 'S',
        BuildingKind::Office => 'O',
        BuildingKind::TrainStation => 'R',
        BuildingKind::CityHall => 'C',
        BuildingKind::Barracks => 'B',
    }
}

/// Single-character symbol for a unit kind.
#[must_use]
pub fn unit_symbol(kind: UnitKind) -> char {
    match kind {
        UnitKind::Infantry => 'i',
        UnitKind::Tank => 't',
        UnitKind::Helicopter => 'x',
    }
}

/// Get ANSI color for a settlement.
fn player_color(player_id: PlayerId) -> &'static str {
    let idx = usize::from(player_id).saturating_sub(1);
    PLAYER_COLORS.get(idx).copied().unwrap_or(WHITE)
}

/// Render settlement statistics.
fn render_player_stats(output: &mut String, state: &MatchState) {
    for player in &state.players {
        let color = player_color(player.id);
        if player.eliminated {
            output.push_str(&format!(
                "{GRAY}Player {} ({}): ELIMINATED{RESET}\n",
                player.id, player.name
            ));
            continue;
        }

        output.push_str(&format!(
            "{color}Player {} ({}):{RESET}  Money: {:.0}  Age: {}  Pop: {}/{}  Units: {}  Score: {}\n",
            player.id,
            player.name,
            player.money,
            player.age.number(),
            state.population_used(player.id),
            player.pop_cap,
            state.units_of(player.id).count(),
            player.score,
        ));
    }

    if let Some(winner) = state.winner() {
        let color = player_color(winner);
        output.push_str(&format!("\n{BOLD}{color}Winner: Player {winner}{RESET}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::game::{create_match_on_map, Map};

    fn create_test_state() -> MatchState {
        create_match_on_map(Map::new(32, 32).unwrap(), &MatchConfig::new(32, 1)).unwrap()
    }

    #[test]
    fn test_render_contains_header_and_players() {
        let state = create_test_state();
        let output = render_ascii(&state, 100);
        assert!(output.contains("Tick 0/100"));
        assert!(output.contains("Player 1 (You)"));
        assert!(output.contains("Player 2 (Crimson Pact)"));
    }

    #[test]
    fn test_render_has_one_row_per_map_row() {
        let state = create_test_state();
        let output = render_ascii(&state, 100);
        let rows = output.lines().filter(|l| l.starts_with("│ ")).count();
        assert_eq!(rows, 32);
    }

    #[test]
    fn test_render_marks_eliminated() {
        let mut state = create_test_state();
        state.get_player_mut(2).unwrap().eliminate();
        assert!(render_ascii(&state, 100).contains("ELIMINATED"));
    }

    #[test]
    fn test_symbols_are_distinct_for_units() {
        let symbols: Vec<char> = UnitKind::ALL.iter().map(|k| unit_symbol(*k)).collect();
        assert_eq!(symbols, vec!['i', 't', 'x']);
    }
}
