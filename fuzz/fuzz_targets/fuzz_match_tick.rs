#![no_main]

//! Full match tick fuzzer.
//!
//! Runs seeded matches with arbitrary tick lengths (including zero, negative
//! and non-finite ones) and checks invariants after every tick.

use arbitrary::Arbitrary;
use skirmish::game::check_invariants;
use skirmish::{create_match, simulate_tick, MatchConfig};
use libfuzzer_sys::fuzz_target;

/// Structured input for tick fuzzing.
#[derive(Arbitrary, Debug)]
struct TickInput {
    seed: u64,
    opponents: u8,
    map_size: u8,
    dts: Vec<f32>,
}

fuzz_target!(|input: TickInput| {
    let config = MatchConfig {
        seed: Some(input.seed),
        ..MatchConfig::new(u16::from(input.map_size % 48) + 32, usize::from(input.opponents % 3) + 1)
    };
    let Ok(mut state) = create_match(&config) else {
        return;
    };

    let mut winner = None;
    for dt in input.dts.into_iter().take(500) {
        let dt = f64::from(dt).clamp(-10.0, 10.0);
        let tick = state.tick;
        simulate_tick(&mut state, dt);

        if !(dt > 0.0) {
            assert_eq!(state.tick, tick, "non-positive dt advanced the clock");
        }
        if winner.is_some() {
            assert_eq!(state.winner(), winner, "winner changed");
        }
        winner = state.winner();

        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "Invariants violated at tick {}: {violations:?}", state.tick);
    }
});
