pub mod cycle;
pub mod grid;
pub mod instrument;
pub mod pattern;

pub use cycle::{CycleConfig, STEPS_PER_BEAT};
pub use grid::{Grid, Row, Step, Subdivision};
pub use instrument::{Instrument, InstrumentId};
pub use pattern::{BeatPattern, BeatPosition};
