//! Benchmarks for the tick loop and complete matches.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use skirmish::game::{create_match, generate_terrain, recompute_derived, simulate_tick};
use skirmish::tournament::{run_match, run_tournament};
use skirmish::MatchConfig;

fn config(map_size: u16, opponents: usize, max_ticks: u64) -> MatchConfig {
    MatchConfig {
        seed: Some(42),
        max_ticks,
        ..MatchConfig::new(map_size, opponents)
    }
}

fn bench_single_tick(c: &mut Criterion) {
    let config = config(64, 3, 1);
    let mut state = create_match(&config).unwrap_or_else(|e| panic!("setup failed: {e}"));
    // Warm up so armies exist and orders are in flight.
    for _ in 0..200 {
        simulate_tick(&mut state, config.dt());
    }

    c.bench_function("single_tick_4p_64", |b| {
        b.iter_batched(
            || state.clone(),
            |mut s| black_box(simulate_tick(&mut s, black_box(0.25))),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_recompute_derived(c: &mut Criterion) {
    let mut state = create_match(&config(128, 3, 1)).unwrap_or_else(|e| panic!("setup failed: {e}"));

    c.bench_function("recompute_derived_128", |b| {
        b.iter(|| recompute_derived(black_box(&mut state)));
    });
}

fn bench_terrain(c: &mut Criterion) {
    c.bench_function("generate_terrain_64", |b| {
        b.iter(|| black_box(generate_terrain(black_box(64), black_box(7))));
    });
}

fn bench_short_match(c: &mut Criterion) {
    let config = config(48, 1, 1_000);

    c.bench_function("short_match_2p", |b| {
        b.iter(|| black_box(run_match(black_box(config))));
    });
}

fn bench_tournament(c: &mut Criterion) {
    let config = config(40, 1, 500);

    let mut group = c.benchmark_group("tournament");
    group.sample_size(10);
    group.bench_function("8_matches_parallel", |b| {
        b.iter(|| black_box(run_tournament(black_box(&config), 8, 0)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_single_tick,
    bench_recompute_derived,
    bench_terrain,
    bench_short_match,
    bench_tournament
);
criterion_main!(benches);
