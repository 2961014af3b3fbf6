//! Error types shared across the sequencer core.
//!
//! Every failing mutation leaves the grid untouched, so callers can surface
//! the error and carry on with the previous state.

use thiserror::Error;

use crate::io::EngineError;

/// Broad classification of a [`SequencerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A step index at or beyond the current steps per cycle
    OutOfRange,
    /// A value rejected at the controller boundary
    InvalidArgument,
    /// The audio engine refused to play
    ExternalEngineFailure,
}

/// Errors returned by grid mutations and transport control
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("step {index} is out of range (cycle has {steps_per_cycle} steps)")]
    OutOfRange { index: usize, steps_per_cycle: usize },

    #[error("subdivision must be between 1 and 4, got {0}")]
    InvalidSubdivision(u8),

    #[error("tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),

    #[error("unsupported measure {0} (expected 3 to 16 beats per cycle)")]
    UnsupportedMeasure(u32),

    #[error("instrument '{0}' is not on the grid")]
    UnknownInstrument(String),

    #[error("invalid instrument id '{0}' (expected a short alphanumeric code)")]
    InvalidInstrumentId(String),

    #[error("bank '{0}' is not in the active bank list")]
    UnknownBank(String),

    #[error("audio engine failed to play: {0}")]
    Engine(#[from] EngineError),
}

impl SequencerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SequencerError::OutOfRange { .. } => ErrorKind::OutOfRange,
            SequencerError::Engine(_) => ErrorKind::ExternalEngineFailure,
            SequencerError::InvalidSubdivision(_)
            | SequencerError::InvalidTempo(_)
            | SequencerError::UnsupportedMeasure(_)
            | SequencerError::UnknownInstrument(_)
            | SequencerError::InvalidInstrumentId(_)
            | SequencerError::UnknownBank(_) => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T> = std::result::Result<T, SequencerError>;
