pub mod error;
pub mod io; // Engine, bank catalog and code export
pub mod runtime; // Controller, config and renderer types
pub mod sequencing; // Grid model and pattern compilation
pub mod transport; // Step highlight timing

pub use error::{ErrorKind, Result, SequencerError};
pub use runtime::{Intent, SequencerConfig, SequencerController, Snapshot};
