/*
Bank Catalog
============

Sample banks are published as a JSON sample map whose keys name samples as
`Bank_sample`:

    { "RolandTR909_bd": [...], "RolandTR909_sd": [...], "LinnDrum_hh": [...] }

The bank list is every distinct prefix before the first underscore, sorted.
Some maps nest the sample keys one level down, or ship as an array of objects
or plain strings; all three shapes are accepted.

When nothing usable comes back, the controller falls back to
`FALLBACK_BANKS`.
*/

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Built-in bank list used when the catalog is empty or unavailable
pub const FALLBACK_BANKS: &[&str] = &[
    "RolandTR909",
    "RolandTR808",
    "RolandTR606",
    "RolandCR78",
    "LinnDrum",
    "OberheimDMX",
    "YamahaRX5",
];

/// The built-in list as owned strings
pub fn fallback_banks() -> Vec<String> {
    FALLBACK_BANKS.iter().map(|bank| bank.to_string()).collect()
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read bank catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bank catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("bank catalog unavailable: {0}")]
    Unavailable(String),
}

/// Source of valid sample-bank names
pub trait BankCatalog {
    fn load(&mut self) -> Result<Vec<String>, CatalogError>;
}

impl<F> BankCatalog for F
where
    F: FnMut() -> Result<Vec<String>, CatalogError>,
{
    fn load(&mut self) -> Result<Vec<String>, CatalogError> {
        self()
    }
}

/// A fixed list of banks
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    banks: Vec<String>,
}

impl StaticCatalog {
    pub fn new(banks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            banks: banks.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in fallback list
    pub fn builtin() -> Self {
        Self::new(FALLBACK_BANKS.iter().copied())
    }
}

impl BankCatalog for StaticCatalog {
    fn load(&mut self) -> Result<Vec<String>, CatalogError> {
        Ok(self.banks.clone())
    }
}

/// Where a JSON sample map comes from
#[derive(Debug, Clone)]
enum JsonSource {
    File(PathBuf),
    Text(String),
}

/// Derives bank names from a JSON sample map
#[derive(Debug, Clone)]
pub struct JsonBankCatalog {
    source: JsonSource,
}

impl JsonBankCatalog {
    /// Read the sample map from a file on each load
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: JsonSource::File(path.into()),
        }
    }

    /// Parse an in-memory sample map
    pub fn from_json_str(text: impl Into<String>) -> Self {
        Self {
            source: JsonSource::Text(text.into()),
        }
    }
}

impl BankCatalog for JsonBankCatalog {
    fn load(&mut self) -> Result<Vec<String>, CatalogError> {
        let value: Value = match &self.source {
            JsonSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&text)?
            }
            JsonSource::Text(text) => serde_json::from_str(text)?,
        };
        Ok(bank_names(&value))
    }
}

/// Distinct, sorted bank prefixes found in a sample map
pub fn bank_names(value: &Value) -> Vec<String> {
    let mut banks = BTreeSet::new();

    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => {
                        for key in map.keys() {
                            insert_prefix(&mut banks, key);
                        }
                        for entry in map.values() {
                            if let Value::String(name) = entry {
                                insert_prefix(&mut banks, name);
                            }
                        }
                    }
                    Value::String(name) => insert_prefix(&mut banks, name),
                    _ => {}
                }
            }
        }
        Value::Object(map) => {
            for (key, entry) in map {
                if key.contains('_') {
                    insert_prefix(&mut banks, key);
                } else if let Value::Object(nested) = entry {
                    for sub_key in nested.keys() {
                        insert_prefix(&mut banks, sub_key);
                    }
                }
            }
        }
        _ => {}
    }

    banks.into_iter().collect()
}

fn insert_prefix(banks: &mut BTreeSet<String>, sample: &str) {
    match sample.split_once('_') {
        Some((bank, _)) if !bank.is_empty() => {
            banks.insert(bank.to_string());
        }
        _ => {}
    }
}
