#[cfg(feature = "serde")]
use serde::Serialize;
use thiserror::Error;

use crate::sequencing::{BeatPattern, InstrumentId};

/// One instrument's part of a stacked play request
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPattern {
    pub instrument: InstrumentId,
    pub pattern: BeatPattern,
    /// Positions are relative to this many steps per cycle
    pub steps_per_cycle: usize,
    pub bank: String,
    pub bpm: f64,
}

/// The audio engine refused or failed to play
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// External player for compiled patterns.
///
/// The engine owns sound scheduling. It receives every track by value on each
/// `play` and keeps no link back to the grid; any previous playback is
/// replaced.
pub trait AudioEngine {
    /// Start playing all tracks together, looping each cycle
    fn play(&mut self, tracks: &[TrackPattern]) -> Result<(), EngineError>;

    /// Silence every voice
    fn stop(&mut self);
}

impl<E: AudioEngine + ?Sized> AudioEngine for Box<E> {
    fn play(&mut self, tracks: &[TrackPattern]) -> Result<(), EngineError> {
        (**self).play(tracks)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Engine that accepts everything and plays nothing (headless use)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentEngine;

impl AudioEngine for SilentEngine {
    fn play(&mut self, _tracks: &[TrackPattern]) -> Result<(), EngineError> {
        Ok(())
    }

    fn stop(&mut self) {}
}
