//! Real-world scenario benchmarks.
//!
//! These model a user editing a busy grid while it plays, which replays the
//! whole pattern on every change.

mod editing;

pub use editing::bench_editing;
