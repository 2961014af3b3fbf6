//! Instrument identifiers and the built-in drum kit

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SequencerError};

/// Longest accepted instrument code
const MAX_ID_LEN: usize = 16;

/// Short code naming a sample within a bank (e.g. `bd`, `hh`)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Parse an instrument code.
    ///
    /// Codes are non-empty ASCII alphanumerics (underscore allowed), at most
    /// 16 characters, since the engine addresses samples as `bank_code`.
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let valid = !code.is_empty()
            && code.len() <= MAX_ID_LEN
            && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid {
            Ok(Self(code))
        } else {
            Err(SequencerError::InvalidInstrumentId(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = SequencerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for InstrumentId {
    type Error = SequencerError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<InstrumentId> for String {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for InstrumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An instrument row: code plus the label shown to the user
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
}

impl Instrument {
    /// Create an instrument, naming it from the drum kit when the code is known
    pub fn new(id: InstrumentId) -> Self {
        let name = kit_name(id.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| id.as_str().to_owned());
        Self { id, name }
    }
}

/// The built-in drum kit: (code, display name), in menu order
pub const DRUM_KIT: &[(&str, &str)] = &[
    ("bd", "Bass Drum"),
    ("sd", "Snare Drum"),
    ("hh", "Hi-Hat"),
    ("oh", "Open Hi-Hat"),
    ("rd", "Ride"),
    ("lt", "Low Tom"),
    ("mt", "Mid Tom"),
    ("ht", "High Tom"),
    ("cr", "Crash"),
    ("cp", "Clap"),
];

/// Instruments placed on a fresh grid, top row first
pub const DEFAULT_INSTRUMENTS: &[&str] = &["hh", "oh", "sd", "bd"];

/// Look up the display name for a kit code
pub fn kit_name(code: &str) -> Option<&'static str> {
    DRUM_KIT
        .iter()
        .find(|(kit_code, _)| *kit_code == code)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert_eq!(InstrumentId::new("bd").unwrap().as_str(), "bd");
        assert!(InstrumentId::new("tom_2").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(InstrumentId::new("").is_err());
        assert!(InstrumentId::new("b d").is_err());
        assert!(InstrumentId::new("bd,sd").is_err());
        assert!(InstrumentId::new("x".repeat(17)).is_err());
    }

    #[test]
    fn test_kit_names() {
        let kick = Instrument::new(InstrumentId::new("bd").unwrap());
        assert_eq!(kick.name, "Bass Drum");

        // Unknown codes are labelled with the code itself
        let custom = Instrument::new(InstrumentId::new("perc").unwrap());
        assert_eq!(custom.name, "perc");
    }

    #[test]
    fn test_default_instruments_are_in_kit() {
        for code in DEFAULT_INSTRUMENTS {
            assert!(kit_name(code).is_some(), "{code} missing from kit");
        }
    }
}
