//! Headless match runner and batch tournaments.
//!
//! Provides a pure function interface: `config -> MatchResult`.
//!
//! The runner handles:
//! - Match creation from a [`MatchConfig`]
//! - Driving the human slot with the built-in policy ("autopilot")
//! - Recording every host command for deterministic replay
//! - Elimination bookkeeping and the tick limit
//!
//! Tournaments run many independent matches in parallel with rayon; nothing
//! is shared between matches.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::error::{CommandError, MatchError};
use crate::game::{
    activation_rng, create_match, decide, simulate_tick, Age, Command, MatchState, PlayerId,
    TickEvents,
};
use crate::replay::{Recording, TimedCommand};

/// Ticks between autopilot activations for the human slot.
pub const AUTOPILOT_INTERVAL: u64 = 8;

/// Final standing of one settlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementResult {
    /// Settlement id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Whether the settlement was AI-controlled.
    pub is_ai: bool,
    /// Final score.
    pub score: u64,
    /// Final age tier.
    pub age: Age,
    /// Units alive at the end.
    pub units: usize,
    /// Money at the end.
    pub money: f64,
    /// Tick the settlement was eliminated (None if it survived).
    pub eliminated_tick: Option<u64>,
}

/// Final result of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// The seed used for this match.
    pub seed: u64,
    /// The winning settlement (None if the tick limit was hit first).
    pub winner: Option<PlayerId>,
    /// Ticks simulated.
    pub ticks: u64,
    /// Per-settlement standings, in id order.
    pub settlements: Vec<SettlementResult>,
    /// Elimination order (first eliminated is index 0).
    pub elimination_order: Vec<PlayerId>,
}

/// Steps one match and keeps the bookkeeping a result and recording need.
#[derive(Debug)]
pub struct MatchRunner {
    state: MatchState,
    config: MatchConfig,
    commands: Vec<TimedCommand>,
    elimination_order: Vec<PlayerId>,
    eliminated_at: Vec<(PlayerId, u64)>,
    steps: u64,
}

impl MatchRunner {
    /// Create a match from `config`. A missing seed means seed 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot create a match.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        let state = create_match(&config)?;
        let config = MatchConfig {
            seed: Some(state.seed),
            ..config
        };
        Ok(Self {
            state,
            config,
            commands: Vec::new(),
            elimination_order: Vec::new(),
            eliminated_at: Vec::new(),
            steps: 0,
        })
    }

    /// Current match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Config the match runs with. The seed is always set.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Apply a host command before the next tick and record it.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; nothing is recorded in that case.
    pub fn issue(&mut self, command: Command) -> Result<(), CommandError> {
        self.state.apply(&command)?;
        self.commands.push(TimedCommand {
            tick: self.state.tick,
            command,
        });
        Ok(())
    }

    /// Run the autopilot if due, then simulate one tick.
    pub fn step(&mut self) -> TickEvents {
        if self.autopilot_due() {
            let local = self.state.local_player;
            let mut rng = activation_rng(self.state.seed, self.state.tick, local);
            let turn = decide(&mut self.state, local, &mut rng);
            let tick = self.state.tick;
            self.commands.extend(
                turn.commands
                    .into_iter()
                    .map(|command| TimedCommand { tick, command }),
            );
        }

        let tick = self.state.tick;
        let events = simulate_tick(&mut self.state, self.config.dt());
        self.steps += 1;

        for &player in &events.eliminated {
            self.elimination_order.push(player);
            self.eliminated_at.push((player, tick));
        }
        events
    }

    fn autopilot_due(&self) -> bool {
        self.config.human_autopilot
            && self.config.dt() > 0.0
            && !self.state.is_over()
            && self.state.tick % AUTOPILOT_INTERVAL == 0
            && self.state.is_alive(self.state.local_player)
    }

    /// Whether the match has a winner or used up its tick budget.
    ///
    /// Counts steps rather than the tick counter, so a paused config still
    /// terminates.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_over() || self.steps >= self.config.max_ticks
    }

    /// Step until finished and return the result.
    pub fn run(&mut self) -> MatchResult {
        while !self.is_finished() {
            self.step();
        }
        let result = self.result();
        info!(
            seed = result.seed,
            winner = ?result.winner,
            ticks = result.ticks,
            "match finished"
        );
        result
    }

    /// Snapshot of the standings so far.
    #[must_use]
    pub fn result(&self) -> MatchResult {
        let settlements = self
            .state
            .players
            .iter()
            .map(|p| SettlementResult {
                id: p.id,
                name: p.name.clone(),
                is_ai: p.is_ai,
                score: p.score,
                age: p.age,
                units: self.state.units_of(p.id).count(),
                money: p.money,
                eliminated_tick: self
                    .eliminated_at
                    .iter()
                    .find(|(id, _)| *id == p.id)
                    .map(|&(_, tick)| tick),
            })
            .collect();

        MatchResult {
            seed: self.state.seed,
            winner: self.state.winner(),
            ticks: self.state.tick,
            settlements,
            elimination_order: self.elimination_order.clone(),
        }
    }

    /// Everything needed to replay the match so far.
    #[must_use]
    pub fn recording(&self) -> Recording {
        Recording {
            config: self.config,
            commands: self.commands.clone(),
        }
    }
}

/// Run a complete match with the given config.
///
/// This is the main entry point - a pure function from inputs to result.
///
/// # Errors
///
/// Returns an error if the config cannot create a match.
pub fn run_match(config: MatchConfig) -> Result<MatchResult, MatchError> {
    Ok(MatchRunner::new(config)?.run())
}

/// Aggregated statistics over many matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentStats {
    /// Total matches played.
    pub games_played: u64,
    /// Win count per settlement slot (index = id - 1).
    pub wins: Vec<u64>,
    /// Matches that hit the tick limit without a winner.
    pub timeouts: u64,
    /// Total score per slot.
    total_scores: Vec<f64>,
    /// Score sum of squares for std dev calculation.
    score_sq_sums: Vec<f64>,
    /// Total ticks across all matches.
    total_ticks: u64,
}

impl TournamentStats {
    /// Create empty stats for `slots` settlements.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            games_played: 0,
            wins: vec![0; slots],
            timeouts: 0,
            total_scores: vec![0.0; slots],
            score_sq_sums: vec![0.0; slots],
            total_ticks: 0,
        }
    }

    /// Number of settlement slots tracked.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.wins.len()
    }

    /// Add a match result to the stats.
    #[allow(clippy::cast_precision_loss)]
    pub fn add_result(&mut self, result: &MatchResult) {
        self.games_played += 1;
        self.total_ticks += result.ticks;

        match result.winner {
            Some(winner) => {
                let idx = usize::from(winner).saturating_sub(1);
                if let Some(wins) = self.wins.get_mut(idx) {
                    *wins += 1;
                }
            }
            None => self.timeouts += 1,
        }

        for (i, settlement) in result.settlements.iter().enumerate() {
            if i < self.total_scores.len() {
                let score = settlement.score as f64;
                self.total_scores[i] += score;
                self.score_sq_sums[i] += score * score;
            }
        }
    }

    /// Merge another partial aggregate into this one.
    pub fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.timeouts += other.timeouts;
        self.total_ticks += other.total_ticks;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.total_scores.iter_mut().zip(&other.total_scores) {
            *a += b;
        }
        for (a, b) in self.score_sq_sums.iter_mut().zip(&other.score_sq_sums) {
            *a += b;
        }
    }

    /// Win rate for a slot (0.0-1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self, slot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(slot).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Average score for a slot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_score(&self, slot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_scores.get(slot).copied().unwrap_or(0.0) / self.games_played as f64
    }

    /// Score standard deviation for a slot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score_std_dev(&self, slot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_score(slot);
        let sq_sum = self.score_sq_sums.get(slot).copied().unwrap_or(0.0);
        ((sq_sum / n) - (mean * mean)).max(0.0).sqrt()
    }

    /// Average match length in ticks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_ticks(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.games_played as f64
    }
}

/// Run `games` matches in parallel, seeded `base_seed + i`.
///
/// Each rayon worker folds into its own [`TournamentStats`]; the partials are
/// merged at the end. Matches whose config is rejected are skipped.
#[must_use]
pub fn run_tournament(config: &MatchConfig, games: u64, base_seed: u64) -> TournamentStats {
    let slots = config.opponents + 1;
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || TournamentStats::new(slots),
            |mut local, i| {
                let match_config = MatchConfig {
                    seed: Some(base_seed.wrapping_add(i)),
                    ..*config
                };
                if let Ok(result) = run_match(match_config) {
                    local.add_result(&result);
                }
                local
            },
        )
        .reduce(
            || TournamentStats::new(slots),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );
    debug!(games = stats.games_played, timeouts = stats.timeouts, "tournament finished");
    stats
}
