//! A small persistent key value store used to stage integrals between the
//! ranks of a process group. Entries are kept in one JSON document.
use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("could not (de)serialize entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no entry `{key}` in {}", path.display())]
    MissingKey { key: String, path: PathBuf },
}

/// A JSON backed store at a fixed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeiStore {
    path: PathBuf,
}

type Entries = BTreeMap<String, serde_json::Value>;

impl TeiStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `value` under `key`, keeping all other entries. The document is
    /// written to a sibling file and synced before it replaces the old one, so
    /// readers never observe a partial write.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        entries.insert(key.to_owned(), serde_json::to_value(value)?);

        let staging = self.path.with_extension("partial");
        {
            let file = File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&staging)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &entries)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&staging, &self.path)?;

        log::debug!("stored `{key}` in {}", self.path.display());
        Ok(())
    }

    /// Reads the entry stored under `key`
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        let value = self
            .entries()?
            .remove(key)
            .ok_or_else(|| StoreError::MissingKey {
                key: key.to_owned(),
                path: self.path.clone(),
            })?;

        Ok(serde_json::from_value(value)?)
    }

    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries()?.contains_key(key))
    }

    /// All entries of the store, empty if it doesn't exist yet
    fn entries(&self) -> Result<Entries, StoreError> {
        match File::open(&self.path) {
            Ok(file) => Ok(serde_json::from_reader(BufReader::new(file))?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(err.into()),
        }
    }
}
