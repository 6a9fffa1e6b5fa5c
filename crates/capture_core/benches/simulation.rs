//! Simulation benchmarks for capture_core.
//!
//! Run with: `cargo bench -p capture_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use capture_core::config::SimulationConfig;
use capture_core::simulation::Simulation;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Full matches at a few difficulty levels.
pub fn simulation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_match");
    for level in [1_u32, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| {
                let config = SimulationConfig::new(level).with_seed(42);
                let Ok(mut sim) = Simulation::new(config) else {
                    return;
                };
                black_box(sim.run());
            });
        });
    }
    group.finish();
}

/// A single turn on a large board.
pub fn turn_benchmark(c: &mut Criterion) {
    let config = SimulationConfig::new(100).with_grid(64, 48).with_seed(7);
    c.bench_function("single_turn_64x48", |b| {
        b.iter_batched(
            || Simulation::new(config).ok(),
            |sim| {
                if let Some(mut sim) = sim {
                    black_box(sim.step());
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, simulation_benchmark, turn_benchmark);
criterion_main!(benches);
