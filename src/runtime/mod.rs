//! Runtime for driving a sequencer from a front end.
//!
//! The `SequencerController` owns the grid, an audio engine and the transport
//! scheduler. Front ends send it [`Intent`]s and draw the [`Snapshot`]s it
//! publishes.
//!
//! # Example
//!
//! ```
//! use beatgrid::io::{SilentEngine, StaticCatalog};
//! use beatgrid::runtime::{Intent, SequencerConfig, SequencerController};
//! use beatgrid::sequencing::InstrumentId;
//!
//! let config = SequencerConfig::new().bpm(120.0);
//! let mut controller =
//!     SequencerController::with_defaults(config, SilentEngine, StaticCatalog::builtin()).unwrap();
//! controller.init();
//!
//! let bd = InstrumentId::new("bd").unwrap();
//! controller
//!     .dispatch(Intent::ToggleStep { instrument: bd, index: 0 })
//!     .unwrap();
//! controller.play().unwrap();
//! assert!(controller.is_playing());
//! ```

pub mod config;
mod controller;
mod state;

pub use config::{ConfigError, SequencerConfig};
pub use controller::SequencerController;
pub use state::{Intent, Snapshot, SnapshotSink};
#[cfg(feature = "rtrb")]
pub use state::SnapshotProducer;
