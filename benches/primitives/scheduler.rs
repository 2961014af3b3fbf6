//! Benchmarks for transport scheduler polling.

use std::hint::black_box;

use beatgrid::sequencing::CycleConfig;
use beatgrid::transport::{step_duration_ms, ManualClock, TransportScheduler};
use criterion::{BenchmarkId, Criterion};

use crate::MEASURES;

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/scheduler");

    for &measure in MEASURES {
        let cycle = CycleConfig::new(measure).unwrap();
        let steps = cycle.steps_per_cycle();
        let step_ms = step_duration_ms(120.0, cycle);

        let clock = ManualClock::new();
        let mut scheduler = TransportScheduler::new(clock.clone());
        let (token, _) = scheduler.start(step_ms, steps);

        // Each poll lands a third of a step later, so about one in three advances
        group.bench_with_input(BenchmarkId::new("poll", steps), &steps, |b, _| {
            b.iter(|| {
                clock.advance(step_ms / 3.0);
                scheduler.poll(black_box(token))
            })
        });

        group.bench_with_input(BenchmarkId::new("restart", steps), &steps, |b, _| {
            b.iter(|| {
                scheduler.stop();
                scheduler.start(black_box(step_ms), steps)
            })
        });
    }

    group.finish();
}
