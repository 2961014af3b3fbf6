#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SequencerError};

/// Grid steps per beat (sixteenth-note resolution)
pub const STEPS_PER_BEAT: usize = 4;

/// Smallest supported number of beats per cycle
pub const MIN_MEASURE: u32 = 3;

/// Largest supported number of beats per cycle
pub const MAX_MEASURE: u32 = 16;

/// Cycle length: how many beats one repetition of the grid lasts
///
/// Steps per cycle are always derived from the measure, never stored, so the
/// two cannot disagree.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleConfig {
    measure: u32,
}

impl CycleConfig {
    /// 3 beats per cycle (12 steps)
    pub const THREE_FOUR: CycleConfig = CycleConfig { measure: 3 };

    /// 4 beats per cycle (16 steps)
    pub const FOUR_FOUR: CycleConfig = CycleConfig { measure: 4 };

    /// Create a cycle of `measure` beats
    pub fn new(measure: u32) -> Result<Self> {
        if (MIN_MEASURE..=MAX_MEASURE).contains(&measure) {
            Ok(Self { measure })
        } else {
            Err(SequencerError::UnsupportedMeasure(measure))
        }
    }

    /// Beats per cycle
    pub fn measure(&self) -> u32 {
        self.measure
    }

    pub fn steps_per_beat(&self) -> usize {
        STEPS_PER_BEAT
    }

    /// Total grid steps in one cycle: `measure * 4`
    pub fn steps_per_cycle(&self) -> usize {
        self.measure as usize * STEPS_PER_BEAT
    }

    /// True for steps that start a beat (used for visual grouping)
    pub fn is_beat_start(&self, index: usize) -> bool {
        index % STEPS_PER_BEAT == 0
    }

    /// The measure that follows this one when cycling through the supported
    /// range, wrapping back to the minimum
    pub fn next(&self) -> Self {
        if self.measure >= MAX_MEASURE {
            Self { measure: MIN_MEASURE }
        } else {
            Self {
                measure: self.measure + 1,
            }
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl TryFrom<u32> for CycleConfig {
    type Error = SequencerError;

    fn try_from(measure: u32) -> Result<Self> {
        Self::new(measure)
    }
}

impl From<CycleConfig> for u32 {
    fn from(cycle: CycleConfig) -> Self {
        cycle.measure
    }
}
