//! Benchmarks for compiling rows into beat patterns.

use std::hint::black_box;

use beatgrid::sequencing::{BeatPattern, CycleConfig, Grid, InstrumentId, Subdivision};
use criterion::{BenchmarkId, Criterion};

use crate::MEASURES;

pub fn bench_pattern(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/pattern");
    let bd = InstrumentId::new("bd").unwrap();

    for &measure in MEASURES {
        let cycle = CycleConfig::new(measure).unwrap();
        let steps = cycle.steps_per_cycle();

        // Empty row compiles to a rest
        let grid = Grid::with_instruments(cycle, [bd.clone()]);
        let row = &grid.rows()[0];
        group.bench_with_input(BenchmarkId::new("rest", steps), &steps, |b, _| {
            b.iter(|| BeatPattern::from_row(black_box(row)))
        });

        // Every step on, every step split four ways (worst case)
        let mut grid = Grid::with_instruments(cycle, [bd.clone()]);
        for index in 0..steps {
            grid.set_active(&bd, index, true).unwrap();
            grid.set_subdivision(&bd, index, Subdivision::new(4).unwrap())
                .unwrap();
        }
        let row = &grid.rows()[0];
        group.bench_with_input(BenchmarkId::new("dense", steps), &steps, |b, _| {
            b.iter(|| BeatPattern::from_row(black_box(row)))
        });

        // Formatting for the engine
        let pattern = BeatPattern::from_row(row);
        group.bench_with_input(BenchmarkId::new("format", steps), &steps, |b, _| {
            b.iter(|| black_box(&pattern).to_string())
        });
    }

    group.finish();
}
