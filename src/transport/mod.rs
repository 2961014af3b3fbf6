// Purpose: wall-clock step tracking, independent of the audio engine

pub mod clock;
pub mod scheduler;
pub mod timing;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use scheduler::{Highlight, PollToken, Tick, TransportScheduler};
pub use timing::{poll_interval_ms, step_duration_ms, validate_bpm};
