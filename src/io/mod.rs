// Purpose - external collaborators: audio engine, bank catalog, code export

pub mod catalog;
pub mod engine;
pub mod strudel;

pub use catalog::{BankCatalog, CatalogError, JsonBankCatalog, StaticCatalog, FALLBACK_BANKS};
pub use engine::{AudioEngine, EngineError, SilentEngine, TrackPattern};
pub use strudel::StrudelEngine;
