//! Output formatting utilities for CLI.

#![allow(clippy::format_push_string)]

use serde::Serialize;
use skirmish::tournament::{MatchResult, TournamentStats};

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &MatchResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Match Result (seed: {})\n", result.seed));
    match result.winner.and_then(|w| result.settlements.iter().find(|s| s.id == w)) {
        Some(winner) => output.push_str(&format!(
            "  Winner: Player {} ({})\n",
            winner.id, winner.name
        )),
        None => output.push_str("  Winner: none (tick limit)\n"),
    }
    output.push_str(&format!("  Ticks: {}\n\n", result.ticks));

    for settlement in &result.settlements {
        output.push_str(&format!(
            "  Player {}: {} points ({}, age {}, {} units, {:.0} money)",
            settlement.id,
            settlement.score,
            settlement.name,
            settlement.age.number(),
            settlement.units,
            settlement.money
        ));
        if let Some(tick) = settlement.eliminated_tick {
            output.push_str(&format!(" [eliminated tick {tick}]"));
        }
        output.push('\n');
    }

    output
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult {
    /// Total matches played.
    games_played: u64,
    /// Per-slot statistics.
    players: Vec<JsonTournamentPlayer>,
    /// Matches that hit the tick limit.
    timeouts: u64,
    /// Average match length in ticks.
    avg_ticks: f64,
}

/// JSON-serializable per-slot tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentPlayer {
    /// Settlement id.
    player: usize,
    /// Slot label.
    role: String,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average score.
    avg_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
}

impl JsonTournamentResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &TournamentStats) -> Self {
        let players = (0..stats.slots())
            .map(|i| JsonTournamentPlayer {
                player: i + 1,
                role: slot_label(i),
                wins: stats.wins.get(i).copied().unwrap_or(0),
                win_rate: stats.win_rate(i),
                avg_score: stats.avg_score(i),
                score_std_dev: stats.score_std_dev(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            players,
            timeouts: stats.timeouts,
            avg_ticks: stats.avg_ticks(),
        }
    }
}

/// Label of a settlement slot: the human seat first, AI seats after.
fn slot_label(slot: usize) -> String {
    if slot == 0 {
        "human".to_string()
    } else {
        format!("ai-{slot}")
    }
}

/// Format tournament stats as human-readable text.
#[allow(clippy::cast_precision_loss)]
pub(super) fn format_tournament_text(stats: &TournamentStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Tournament Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for i in 0..stats.slots() {
        let wins = stats.wins.get(i).copied().unwrap_or(0);
        let rate = stats.win_rate(i) * 100.0;
        output.push_str(&format!(
            "  Player {} ({}): {rate:.1}% ({wins} wins)\n",
            i + 1,
            slot_label(i)
        ));
    }
    let timeout_rate = if stats.games_played == 0 {
        0.0
    } else {
        stats.timeouts as f64 / stats.games_played as f64 * 100.0
    };
    output.push_str(&format!(
        "  Timeouts: {} ({timeout_rate:.1}%)\n\n",
        stats.timeouts
    ));

    output.push_str("Average Scores:\n");
    for i in 0..stats.slots() {
        output.push_str(&format!(
            "  Player {} ({}): {:.1} (+/- {:.1})\n",
            i + 1,
            slot_label(i),
            stats.avg_score(i),
            stats.score_std_dev(i)
        ));
    }

    output.push_str(&format!(
        "\nAverage Match Length: {:.0} ticks\n",
        stats.avg_ticks()
    ));

    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &TournamentStats) -> String {
    let mut output = String::new();

    output.push_str("player,role,wins,win_rate,avg_score,score_std_dev\n");
    for i in 0..stats.slots() {
        output.push_str(&format!(
            "{},{},{},{:.4},{:.2},{:.2}\n",
            i + 1,
            slot_label(i),
            stats.wins.get(i).copied().unwrap_or(0),
            stats.win_rate(i),
            stats.avg_score(i),
            stats.score_std_dev(i)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_has_row_per_slot() {
        let csv = format_tournament_csv(&TournamentStats::new(3));
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.lines().nth(1).is_some_and(|l| l.starts_with("1,human,0,")));
    }

    #[test]
    fn test_text_handles_empty_stats() {
        let text = format_tournament_text(&TournamentStats::new(2));
        assert!(text.contains("Tournament Results (0 games)"));
        assert!(text.contains("Timeouts: 0 (0.0%)"));
    }
}
