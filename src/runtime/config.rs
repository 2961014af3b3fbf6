//! Startup configuration for a sequencer instance

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SequencerError;
use crate::io::catalog::fallback_banks;
use crate::sequencing::instrument::DEFAULT_INSTRUMENTS;
use crate::sequencing::{CycleConfig, InstrumentId};
use crate::transport::timing::validate_bpm;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SequencerError),

    #[error("configuration must list at least one fallback bank")]
    NoFallbackBanks,

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tempo, cycle length, bank and starting instruments
///
/// ```
/// use beatgrid::runtime::SequencerConfig;
///
/// let config = SequencerConfig::new()
///     .bpm(96.0)
///     .measure(3)
///     .bank("LinnDrum")
///     .instrument("cp");
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// Tempo passed to the engine and used for the highlight
    pub bpm: f64,
    /// Beats per cycle
    pub measure: u32,
    /// Preferred sample bank
    pub bank: String,
    /// Instrument codes, top row first
    pub instruments: Vec<String>,
    /// Banks offered when the catalog has nothing
    pub fallback_banks: Vec<String>,
}

impl SequencerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn measure(mut self, measure: u32) -> Self {
        self.measure = measure;
        self
    }

    pub fn bank(mut self, bank: impl Into<String>) -> Self {
        self.bank = bank.into();
        self
    }

    /// Append an instrument row
    pub fn instrument(mut self, code: impl Into<String>) -> Self {
        self.instruments.push(code.into());
        self
    }

    /// Replace the instrument rows
    pub fn instruments(mut self, codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.instruments = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn fallback_banks(mut self, banks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fallback_banks = banks.into_iter().map(Into::into).collect();
        self
    }

    /// Check every field against the same rules the controller enforces
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bpm(self.bpm)?;
        self.cycle()?;
        self.instrument_ids()?;
        if self.fallback_banks.is_empty() {
            return Err(ConfigError::NoFallbackBanks);
        }
        Ok(())
    }

    pub fn cycle(&self) -> Result<CycleConfig, SequencerError> {
        CycleConfig::new(self.measure)
    }

    pub fn instrument_ids(&self) -> Result<Vec<InstrumentId>, SequencerError> {
        self.instruments
            .iter()
            .map(|code| InstrumentId::new(code.as_str()))
            .collect()
    }

    /// Parse a JSON configuration; missing fields take their defaults
    #[cfg(feature = "serde")]
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    #[cfg(feature = "serde")]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            bpm: 60.0,
            measure: 4,
            bank: "RolandTR909".to_string(),
            instruments: DEFAULT_INSTRUMENTS.iter().map(|c| c.to_string()).collect(),
            fallback_banks: fallback_banks(),
        }
    }
}
