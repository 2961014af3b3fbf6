//! Benchmarks for edits made while playing.
//!
//! Each toggle stops the engine, recompiles every row, replays and restarts
//! the highlight.

use std::hint::black_box;

use beatgrid::io::{StaticCatalog, StrudelEngine};
use beatgrid::runtime::{SequencerConfig, SequencerController};
use beatgrid::sequencing::instrument::DRUM_KIT;
use beatgrid::sequencing::InstrumentId;
use beatgrid::transport::ManualClock;
use criterion::{BenchmarkId, Criterion};

use crate::MEASURES;

pub fn bench_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/editing");

    for &measure in MEASURES {
        // Full ten-piece kit with a busy pattern
        let config = SequencerConfig::new()
            .measure(measure)
            .instruments(DRUM_KIT.iter().map(|(code, _)| *code));
        let mut controller = SequencerController::new(
            config,
            StrudelEngine::new(),
            StaticCatalog::builtin(),
            ManualClock::new(),
        )
        .unwrap();

        let ids: Vec<InstrumentId> = controller.grid().instruments().cloned().collect();
        let steps = controller.grid().steps_per_cycle();
        for (row, id) in ids.iter().enumerate() {
            for index in (row % 3..steps).step_by(3) {
                controller.toggle_step(id, index).unwrap();
            }
        }
        controller.play().unwrap();

        let hh = InstrumentId::new("hh").unwrap();
        group.bench_with_input(BenchmarkId::new("toggle", steps), &steps, |b, _| {
            b.iter(|| controller.toggle_step(black_box(&hh), black_box(1)))
        });
    }

    group.finish();
}
