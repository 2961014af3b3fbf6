//! Types exchanged with the renderer
//!
//! Intents flow in from the front end; snapshots flow out after every
//! mutation and every scheduler tick. The renderer never reads state back from
//! what it drew, only from the latest snapshot.

#[cfg(feature = "rtrb")]
use rtrb::Producer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sequencing::{InstrumentId, Row};

/// User actions forwarded by the renderer
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Flip one step on or off
    ToggleStep { instrument: InstrumentId, index: usize },
    /// Split one step into 1 to 4 hits
    SetSubdivision {
        instrument: InstrumentId,
        index: usize,
        subdivision: u8,
    },
    AddInstrument(InstrumentId),
    RemoveInstrument(InstrumentId),
    /// New tempo in beats per minute
    UpdateTempo(f64),
    /// New number of beats per cycle
    UpdateMeasure(u32),
    UpdateBank(String),
    /// Reset every step to its default
    Clear,
    Play,
    Stop,
}

/// Everything the renderer needs to draw one frame
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Instrument rows in display order, with per-step state
    pub rows: Vec<Row>,
    pub steps_per_cycle: usize,
    pub measure: u32,
    /// Step to highlight; None means no step is highlighted anywhere
    pub current_step: Option<usize>,
    pub is_playing: bool,
    pub bpm: f64,
    pub bank: String,
    /// Banks the user can pick from
    pub banks: Vec<String>,
}

impl Snapshot {
    /// Instrument ids in display order
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.rows.iter().map(|row| row.id())
    }

    /// Whether a step index should be drawn highlighted
    pub fn is_current(&self, index: usize) -> bool {
        self.current_step == Some(index)
    }

    /// Whether a step index starts a beat
    pub fn is_beat_marker(&self, index: usize) -> bool {
        index % crate::sequencing::STEPS_PER_BEAT == 0
    }
}

/// Receiver for snapshots
pub trait SnapshotSink {
    fn publish(&mut self, snapshot: &Snapshot);

    /// Retry delivery of anything held back by an earlier `publish`
    fn flush(&mut self) {}
}

impl<F> SnapshotSink for F
where
    F: FnMut(&Snapshot),
{
    fn publish(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Forward snapshots over a ring buffer.
///
/// When the reader lags, the newest snapshot waits in a single pending slot
/// and replaces whatever was waiting before. It is pushed on the next
/// `publish` or `flush` once the reader frees space, so the last state sent
/// is always the one the reader ends up with.
#[cfg(feature = "rtrb")]
pub struct SnapshotProducer {
    producer: Producer<Snapshot>,
    pending: Option<Snapshot>,
}

#[cfg(feature = "rtrb")]
impl SnapshotProducer {
    pub fn new(producer: Producer<Snapshot>) -> Self {
        Self {
            producer,
            pending: None,
        }
    }

    /// Whether a snapshot is waiting for buffer space
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn push_pending(&mut self) {
        if let Some(snapshot) = self.pending.take() {
            if let Err(rtrb::PushError::Full(snapshot)) = self.producer.push(snapshot) {
                self.pending = Some(snapshot);
            }
        }
    }
}

#[cfg(feature = "rtrb")]
impl SnapshotSink for SnapshotProducer {
    fn publish(&mut self, snapshot: &Snapshot) {
        self.push_pending();
        if self.pending.is_some() {
            log::trace!(
                target: "beatgrid::runtime",
                "snapshot buffer full, replacing pending frame"
            );
            self.pending = Some(snapshot.clone());
            return;
        }
        if let Err(rtrb::PushError::Full(snapshot)) = self.producer.push(snapshot.clone()) {
            log::trace!(target: "beatgrid::runtime", "snapshot buffer full, holding frame");
            self.pending = Some(snapshot);
        }
    }

    fn flush(&mut self) {
        self.push_pending();
    }
}
