//! Benchmarks for the sequencer core.

mod pattern;
mod scheduler;

pub use pattern::bench_pattern;
pub use scheduler::bench_scheduler;
