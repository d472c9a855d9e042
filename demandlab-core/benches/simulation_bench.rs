//! Criterion benchmarks for DemandLab hot paths.
//!
//! Benchmarks:
//! 1. Monte Carlo simulation of one item across run counts
//! 2. Backtest of the standard model bank over series lengths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use demandlab_core::backtest::backtest_item;
use demandlab_core::config::{ForecastConfig, InventoryConfig};
use demandlab_core::models::ModelBank;
use demandlab_core::policy::compute_policy;
use demandlab_core::simulation::InventorySimulator;
use demandlab_core::DemandSeries;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> DemandSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let values = (0..n)
        .map(|i| 20.0 + (i as f64 * 0.9).sin() * 6.0 + (i % 7) as f64)
        .collect();
    DemandSeries::new("bench", start, values).unwrap()
}

// ── 1. Simulation ────────────────────────────────────────────────────

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    let series = make_series(120);
    for runs in [100usize, 300, 1000] {
        let params = InventoryConfig {
            simulation_runs: runs,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let policy = compute_policy(series.tail(30), &series, &params).unwrap();
        let sim = InventorySimulator::new(30, &params);
        group.bench_with_input(BenchmarkId::from_parameter(runs), &policy, |b, p| {
            b.iter(|| sim.simulate(black_box(p)).unwrap())
        });
    }
    group.finish();
}

// ── 2. Backtest ──────────────────────────────────────────────────────

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let bank = ModelBank::default();
    let cfg = ForecastConfig::default();
    for n in [60usize, 365, 1460] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, s| {
            b.iter(|| backtest_item(black_box(s), &bank, &cfg))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_simulation, bench_backtest);
criterion_main!(benches);
