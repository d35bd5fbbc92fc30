#![no_main]

//! Command sequence fuzzer.
//!
//! Interleaves arbitrary host commands with ticks and checks that rejected
//! commands leave the state untouched and that invariants always hold.

use arbitrary::Arbitrary;
use skirmish::game::check_invariants;
use skirmish::{create_match, simulate_tick, Command, Coord, MatchConfig, UnitId, UnitKind, UnitOrder};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated host action.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzAction {
    /// Train a unit for any (possibly unknown) player.
    Train { player: u8, kind: u8 },
    /// Upgrade any (possibly unknown) player.
    Upgrade { player: u8 },
    /// Order a slice of the roster somewhere.
    Order {
        first: u8,
        count: u8,
        attack: bool,
        x: u16,
        y: u16,
        stale_serial: u32,
    },
    /// Grant money to exercise the expensive branches.
    Fund { player: u8, amount: u16 },
    /// Advance time.
    Tick { quarter_seconds: u8 },
}

/// Structured input for command fuzzing.
#[derive(Arbitrary, Debug)]
struct CommandInput {
    seed: u64,
    opponents: u8,
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: CommandInput| {
    let config = MatchConfig {
        seed: Some(input.seed),
        ..MatchConfig::new(32, usize::from(input.opponents % 3) + 1)
    };
    let Ok(mut state) = create_match(&config) else {
        return;
    };

    for action in input.actions.into_iter().take(200) {
        match action {
            FuzzAction::Train { player, kind } => {
                let kind = UnitKind::ALL[usize::from(kind) % UnitKind::ALL.len()];
                let before = state.clone();
                let command = Command::TrainUnit { player: player % 6, kind };
                if state.apply(&command).is_err() {
                    assert_eq!(state, before, "rejected training mutated state");
                }
            }
            FuzzAction::Upgrade { player } => {
                let before = state.clone();
                if state.apply(&Command::UpgradeAge { player: player % 6 }).is_err() {
                    assert_eq!(state, before, "rejected upgrade mutated state");
                }
            }
            FuzzAction::Order { first, count, attack, x, y, stale_serial } => {
                let mut units: Vec<UnitId> = state
                    .units
                    .iter()
                    .skip(usize::from(first))
                    .take(usize::from(count))
                    .map(|u| u.id)
                    .collect();
                // Unknown ids must be skipped silently.
                units.push(UnitId { owner: 1, serial: stale_serial | 0x8000_0000 });
                let target = Coord::new(x, y);
                let order = if attack {
                    UnitOrder::Attack { target, target_owner: None }
                } else {
                    UnitOrder::Move { target }
                };
                let _ = state.apply(&Command::IssueOrder { units, order });
            }
            FuzzAction::Fund { player, amount } => {
                if let Some(p) = state.get_player_mut(player % 6) {
                    p.money += f64::from(amount);
                }
            }
            FuzzAction::Tick { quarter_seconds } => {
                simulate_tick(&mut state, f64::from(quarter_seconds % 16) * 0.25);
            }
        }

        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }
});
