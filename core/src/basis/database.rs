//! Read-only access to a basis set database.
//!
//! The database is a hierarchical JSON document addressed by
//! `"<symbol>/<basis name>"`. Each such group maps shell indices (`"1"`, `"2"`, ...)
//! to one shell record:
//!
//! ```json
//! { "C": { "sto-3g": {
//!     "1": { "Shell Type": "S",  "Exponents": [71.6168, 13.0451, 3.5305],
//!            "Coefficients": [0.1543, 0.5353, 0.4446] },
//!     "2": { "Shell Type": "SP", "Exponents": [2.9412, 0.6835, 0.2223],
//!            "Coefficients": [[-0.0999, 0.1559], [0.3995, 0.6077], [0.7001, 0.3920]] }
//! } } }
//! ```
//!
//! Combined shells store one `[s, p]` row per primitive. Records are only
//! decoded when their group is read, so a broken record of an unrelated
//! element doesn't make the whole database unusable.
use std::{collections::HashMap, fs::File, io::BufReader, path::Path, str::FromStr};

use serde::Deserialize;

use crate::error::AssemblyError;

type ShellGroup = HashMap<String, serde_json::Value>;

/// An opened basis set database. The backing file is only held open while
/// [`BasisDatabase::open`] runs.
#[derive(Debug, Default)]
pub struct BasisDatabase {
    /// element symbol -> lowercase basis name -> shell index -> record
    elements: HashMap<String, HashMap<String, ShellGroup>>,
}

/// One shell exactly as it is stored in the database.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawShellRecord {
    /// Position of this record within its group, starting at 1
    #[serde(skip)]
    pub index: usize,
    #[serde(rename = "Shell Type")]
    pub shell_type: String,
    #[serde(rename = "Exponents")]
    pub exponents: Vec<f64>,
    #[serde(rename = "Coefficients")]
    pub coefficients: Coefficients,
    /// Whether the coefficients already include primitive normalization
    #[serde(rename = "Normalized", default)]
    pub normalized: bool,
}

/// Contraction coefficients of a raw shell record
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coefficients {
    /// One coefficient per primitive
    Single(Vec<f64>),
    /// One `[s, p]` row per primitive, only valid for combined shells
    Combined(Vec<[f64; 2]>),
}

impl Coefficients {
    pub fn n_rows(&self) -> usize {
        match self {
            Self::Single(column) => column.len(),
            Self::Combined(rows) => rows.len(),
        }
    }

    pub fn n_columns(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Combined(_) => 2,
        }
    }

    /// Copies out one coefficient column, `None` if it doesn't exist
    pub fn column(&self, column: usize) -> Option<Vec<f64>> {
        match (self, column) {
            (Self::Single(values), 0) => Some(values.clone()),
            (Self::Combined(rows), 0 | 1) => Some(rows.iter().map(|row| row[column]).collect()),
            _ => None,
        }
    }
}

impl BasisDatabase {
    /// Opens and parses the database at `path`. The file is closed again before
    /// this returns, whether parsing succeeded or not.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AssemblyError> {
        let path = path.as_ref();
        let unavailable = |source: Box<dyn std::error::Error + Send + Sync>| {
            AssemblyError::DatabaseUnavailable {
                path: path.to_path_buf(),
                source,
            }
        };

        let file = File::open(path).map_err(|err| unavailable(err.into()))?;
        let elements = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| unavailable(err.into()))?;

        log::debug!("opened basis database {}", path.display());
        Ok(Self::from_elements(elements))
    }

    fn from_elements(elements: HashMap<String, HashMap<String, ShellGroup>>) -> Self {
        let elements = elements
            .into_iter()
            .map(|(symbol, groups)| {
                let groups = groups
                    .into_iter()
                    .map(|(name, group)| (name.to_lowercase(), group))
                    .collect();
                (symbol, groups)
            })
            .collect();

        Self { elements }
    }

    /// Returns all basis names available for an element, sorted
    pub fn basis_names(&self, symbol: &str) -> Vec<&str> {
        let mut names = self
            .elements
            .get(symbol)
            .map(|groups| groups.keys().map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Reads the shell records stored under `"<symbol>/<basis_name>"`, ordered by
    /// their numeric shell index. Basis names are matched case-insensitively.
    pub fn read_shells(
        &self,
        symbol: &str,
        basis_name: &str,
    ) -> Result<Vec<RawShellRecord>, AssemblyError> {
        let key = format!("{symbol}/{basis_name}");
        let group = self
            .elements
            .get(symbol)
            .and_then(|groups| groups.get(&basis_name.to_lowercase()))
            .filter(|_| !basis_name.is_empty())
            .ok_or_else(|| {
                log::debug!("{key} not found, {symbol} has {:?}", self.basis_names(symbol));
                AssemblyError::BasisNotFound {
                    symbol: symbol.to_owned(),
                    basis_name: basis_name.to_owned(),
                }
            })?;

        let mut records = group
            .iter()
            .map(|(index, record)| {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| AssemblyError::MalformedRecord {
                        key: format!("{key}/{index}"),
                        reason: "shell index is not a positive integer".to_owned(),
                    })?;

                let record = RawShellRecord::deserialize(record).map_err(|err| {
                    AssemblyError::MalformedRecord {
                        key: format!("{key}/{index}"),
                        reason: err.to_string(),
                    }
                })?;

                Ok(RawShellRecord { index, ..record })
            })
            .collect::<Result<Vec<_>, AssemblyError>>()?;

        records.sort_by_key(|record| record.index);
        log::trace!("{key}: {} shell records", records.len());

        Ok(records)
    }
}

impl FromStr for BasisDatabase {
    type Err = serde_json::Error;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(json).map(Self::from_elements)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const DATABASE: &str = r#"{
        "C": { "STO-3G": {
            "2":  { "Shell Type": "SP", "Exponents": [2.0, 1.0],
                    "Coefficients": [[0.1, 0.3], [0.2, 0.4]] },
            "10": { "Shell Type": "D", "Exponents": [0.8], "Coefficients": [1.0] },
            "1":  { "Shell Type": "S", "Exponents": [70.0, 13.0], "Coefficients": [0.5, 0.6],
                    "Normalized": true }
        } }
    }"#;

    #[test]
    fn records_are_in_numeric_order() {
        let database: BasisDatabase = DATABASE.parse().unwrap();
        let records = database.read_shells("C", "sto-3g").unwrap();

        let indices = records.iter().map(|r| r.index).collect::<Vec<_>>();
        assert_eq!(indices, [1, 2, 10]);
        assert_eq!(records[0].shell_type, "S");
        assert!(records[0].normalized);
        assert!(!records[1].normalized);
    }

    #[test]
    fn combined_columns() {
        let database: BasisDatabase = DATABASE.parse().unwrap();
        let records = database.read_shells("C", "STO-3G").unwrap();
        let coefficients = &records[1].coefficients;

        assert_eq!(coefficients.n_columns(), 2);
        assert_eq!(coefficients.n_rows(), 2);
        assert_eq!(coefficients.column(0).unwrap(), [0.1, 0.2]);
        assert_eq!(coefficients.column(1).unwrap(), [0.3, 0.4]);
        assert_eq!(coefficients.column(2), None);
    }

    #[test]
    fn missing_groups() {
        let database: BasisDatabase = DATABASE.parse().unwrap();

        for (symbol, name) in [("C", "6-31g"), ("H", "sto-3g"), ("C", "")] {
            assert!(matches!(
                database.read_shells(symbol, name),
                Err(AssemblyError::BasisNotFound { .. })
            ));
        }
    }

    #[test]
    fn broken_records_only_fail_their_group() {
        let database: BasisDatabase = r#"{
            "H":  { "sto-3g": { "1": { "Shell Type": "S", "Exponents": [3.4, 0.6],
                                       "Coefficients": [0.15, 0.53] } } },
            "Fe": { "sto-3g": { "1": { "Shell Type": "S", "Exponents": [1.0],
                                       "Coefficients": [[1, 1, 1]] } } }
        }"#
        .parse()
        .unwrap();

        assert_eq!(database.read_shells("H", "sto-3g").unwrap().len(), 1);
        match database.read_shells("Fe", "sto-3g") {
            Err(AssemblyError::MalformedRecord { key, .. }) => assert_eq!(key, "Fe/sto-3g/1"),
            other => panic!("expected a malformed record, got {other:?}"),
        }
    }

    #[test]
    fn unavailable_database() {
        let directory = tempfile::tempdir().unwrap();
        let missing = directory.path().join("missing.json");
        assert!(matches!(
            BasisDatabase::open(&missing),
            Err(AssemblyError::DatabaseUnavailable { .. })
        ));

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        write!(garbage, "{{ not json").unwrap();
        assert!(matches!(
            BasisDatabase::open(garbage.path()),
            Err(AssemblyError::DatabaseUnavailable { .. })
        ));
    }

    #[test]
    fn open_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{DATABASE}").unwrap();

        let database = BasisDatabase::open(file.path()).unwrap();
        assert_eq!(database.basis_names("C"), ["sto-3g"]);
        assert_eq!(database.read_shells("C", "sto-3g").unwrap().len(), 3);
    }
}
