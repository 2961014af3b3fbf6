//! Step timing for the visual highlight.
//!
//! The engine's notion of a cycle is longer than `measure` plain beats, so the
//! naive per-step duration is divided down to keep the highlight on the sound.

use crate::error::{Result, SequencerError};
use crate::sequencing::cycle::{MAX_MEASURE, MIN_MEASURE};
use crate::sequencing::CycleConfig;

/// Divisor for 3-beat cycles. Matched by ear against the engine; keep exact.
pub const THREE_BEAT_DIVISOR: f64 = 1.5;

/// Divisor for every other cycle length. Matched by ear; keep exact.
pub const DEFAULT_DIVISOR: f64 = 2.0;

/// Upper bound on the highlight polling period
pub const MAX_POLL_INTERVAL_MS: f64 = 50.0;

/// Accept a tempo only if it is a finite, positive number of beats per minute
/// that yields a finite, positive step duration at every supported measure.
pub fn validate_bpm(bpm: f64) -> Result<f64> {
    let usable = bpm.is_finite()
        && bpm > 0.0
        && (MIN_MEASURE..=MAX_MEASURE)
            .filter_map(|measure| CycleConfig::new(measure).ok())
            .all(|cycle| {
                let step = step_duration_ms(bpm, cycle);
                step.is_finite() && step > 0.0
            });

    if usable {
        Ok(bpm)
    } else {
        Err(SequencerError::InvalidTempo(bpm))
    }
}

/// Duration of one full cycle of `measure` beats at `bpm`
pub fn cycle_duration_ms(bpm: f64, cycle: CycleConfig) -> f64 {
    cycle.measure() as f64 * (60.0 / bpm) * 1000.0
}

/// Engine-alignment divisor for a cycle length
pub fn sync_divisor(cycle: CycleConfig) -> f64 {
    if cycle.measure() == 3 {
        THREE_BEAT_DIVISOR
    } else {
        DEFAULT_DIVISOR
    }
}

/// How long the highlight stays on each grid step
pub fn step_duration_ms(bpm: f64, cycle: CycleConfig) -> f64 {
    (cycle_duration_ms(bpm, cycle) / cycle.steps_per_cycle() as f64) / sync_divisor(cycle)
}

/// Polling cadence for a step duration: twice per step, at most every 50ms
pub fn poll_interval_ms(step_duration_ms: f64) -> f64 {
    (step_duration_ms / 2.0).min(MAX_POLL_INTERVAL_MS)
}
