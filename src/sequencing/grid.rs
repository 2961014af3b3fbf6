/*
Grid Model
==========

The grid is the single source of truth for what the sequencer plays: an
ordered list of instrument rows, each holding exactly `steps_per_cycle` steps.

    hh  [x . x . | x . x . | x . x . | x . x .]
    sd  [. . . . | x . . . | . . . . | x . . .]
    bd  [x . . . | . . . . | x . x3. | . . . .]
                                 ^ step 10 subdivided into 3 hits

Row order is insertion order and is the display order. Changing the measure
truncates or extends every row in place, so a step keeps its data for as long
as its index fits in the cycle.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::cycle::CycleConfig;
use super::instrument::{Instrument, InstrumentId};
use crate::error::{Result, SequencerError};

/// Largest number of hits a single step can be split into
pub const MAX_SUBDIVISION: u8 = 4;

/// How many equally spaced hits a step plays (1 = plain step)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subdivision(u8);

impl Subdivision {
    pub const NONE: Subdivision = Subdivision(1);

    pub fn new(hits: u8) -> Result<Self> {
        if (1..=MAX_SUBDIVISION).contains(&hits) {
            Ok(Self(hits))
        } else {
            Err(SequencerError::InvalidSubdivision(hits))
        }
    }

    /// Number of hits in the step
    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_subdivided(self) -> bool {
        self.0 > 1
    }
}

impl Default for Subdivision {
    fn default() -> Self {
        Self::NONE
    }
}

impl TryFrom<u8> for Subdivision {
    type Error = SequencerError;

    fn try_from(hits: u8) -> Result<Self> {
        Self::new(hits)
    }
}

impl From<Subdivision> for u8 {
    fn from(subdivision: Subdivision) -> Self {
        subdivision.0
    }
}

/// One editable cell of the grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Step {
    pub active: bool,
    pub subdivision: Subdivision,
}

/// An instrument and its steps for one cycle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub instrument: Instrument,
    pub steps: Vec<Step>,
}

impl Row {
    fn new(id: InstrumentId, steps_per_cycle: usize) -> Self {
        Self {
            instrument: Instrument::new(id),
            steps: vec![Step::default(); steps_per_cycle],
        }
    }

    pub fn id(&self) -> &InstrumentId {
        &self.instrument.id
    }

    /// Number of active steps in the row
    pub fn active_count(&self) -> usize {
        self.steps.iter().filter(|s| s.active).count()
    }
}

/// Instruments × steps × subdivisions
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cycle: CycleConfig,
    rows: Vec<Row>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(cycle: CycleConfig) -> Self {
        Self {
            cycle,
            rows: Vec::new(),
        }
    }

    /// Create a grid with the given instruments, skipping duplicates
    pub fn with_instruments(
        cycle: CycleConfig,
        instruments: impl IntoIterator<Item = InstrumentId>,
    ) -> Self {
        let mut grid = Self::new(cycle);
        for id in instruments {
            grid.add_instrument(id);
        }
        grid
    }

    pub fn cycle(&self) -> CycleConfig {
        self.cycle
    }

    pub fn measure(&self) -> u32 {
        self.cycle.measure()
    }

    pub fn steps_per_cycle(&self) -> usize {
        self.cycle.steps_per_cycle()
    }

    /// Rows in display order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Instrument ids in display order
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.rows.iter().map(Row::id)
    }

    pub fn contains(&self, id: &InstrumentId) -> bool {
        self.rows.iter().any(|row| row.id() == id)
    }

    pub fn row(&self, id: &InstrumentId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Look up one step
    pub fn step(&self, id: &InstrumentId, index: usize) -> Result<Step> {
        let steps_per_cycle = self.steps_per_cycle();
        let row = self
            .row(id)
            .ok_or_else(|| SequencerError::UnknownInstrument(id.to_string()))?;
        row.steps
            .get(index)
            .copied()
            .ok_or(SequencerError::OutOfRange {
                index,
                steps_per_cycle,
            })
    }

    /// Append an instrument with default steps.
    ///
    /// Returns `false` (and leaves the grid alone) if it is already present.
    pub fn add_instrument(&mut self, id: InstrumentId) -> bool {
        if self.contains(&id) {
            return false;
        }
        let steps_per_cycle = self.steps_per_cycle();
        self.rows.push(Row::new(id, steps_per_cycle));
        true
    }

    /// Remove an instrument and all of its step data.
    ///
    /// Returns `false` if it was not present.
    pub fn remove_instrument(&mut self, id: &InstrumentId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id() != id);
        self.rows.len() != before
    }

    /// Flip a step's active flag, returning the new value
    pub fn toggle_step(&mut self, id: &InstrumentId, index: usize) -> Result<bool> {
        let step = self.step_mut(id, index)?;
        step.active = !step.active;
        Ok(step.active)
    }

    /// Set a step's active flag explicitly
    pub fn set_active(&mut self, id: &InstrumentId, index: usize, active: bool) -> Result<()> {
        self.step_mut(id, index)?.active = active;
        Ok(())
    }

    pub fn set_subdivision(
        &mut self,
        id: &InstrumentId,
        index: usize,
        subdivision: Subdivision,
    ) -> Result<()> {
        self.step_mut(id, index)?.subdivision = subdivision;
        Ok(())
    }

    /// Change the cycle length.
    ///
    /// Steps past the new length are discarded; new slots start as defaults.
    pub fn set_measure(&mut self, cycle: CycleConfig) {
        self.cycle = cycle;
        let steps_per_cycle = cycle.steps_per_cycle();
        for row in &mut self.rows {
            row.steps.resize(steps_per_cycle, Step::default());
        }
    }

    /// Return every step of every instrument to its default
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.steps.fill(Step::default());
        }
    }

    /// True for steps that begin a beat
    pub fn is_beat_marker(&self, index: usize) -> bool {
        self.cycle.is_beat_start(index)
    }

    fn step_mut(&mut self, id: &InstrumentId, index: usize) -> Result<&mut Step> {
        let steps_per_cycle = self.steps_per_cycle();
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| SequencerError::UnknownInstrument(id.to_string()))?;
        row.steps.get_mut(index).ok_or(SequencerError::OutOfRange {
            index,
            steps_per_cycle,
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(CycleConfig::default())
    }
}
