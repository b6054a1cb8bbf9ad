//! Read-only sources of raw alert and shelter records.
//!
//! `JsonRecordStore` keeps each batch as a JSON array file in a data directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

pub const ALERTS_FILE: &str = "alerts.json";
pub const SHELTERS_FILE: &str = "shelters.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Expected a JSON array in {0}")]
    NotAnArray(PathBuf),
}

/// Supplies the current alert batch.
pub trait AlertSource: Send + Sync {
    fn current_alerts(&self) -> Result<Vec<Value>, StoreError>;
}

/// Supplies every known shelter.
pub trait ShelterStore: Send + Sync {
    fn shelters(&self) -> Result<Vec<Value>, StoreError>;
}

pub struct JsonRecordStore {
    data_dir: PathBuf,
}

impl JsonRecordStore {
    /// # Arguments
    /// * `data_dir` - Directory holding `alerts.json` and `shelters.json`
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Read one array file. A file that does not exist is an empty batch.
    fn read_array(&self, filename: &str) -> Result<Vec<Value>, StoreError> {
        let path = self.data_dir.join(filename);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} not found, treating as empty", path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let document: Value =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;

        match document {
            Value::Array(records) => Ok(records),
            _ => Err(StoreError::NotAnArray(path)),
        }
    }
}

impl AlertSource for JsonRecordStore {
    fn current_alerts(&self) -> Result<Vec<Value>, StoreError> {
        self.read_array(ALERTS_FILE)
    }
}

impl ShelterStore for JsonRecordStore {
    fn shelters(&self) -> Result<Vec<Value>, StoreError> {
        self.read_array(SHELTERS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path().join("nothing-here"));
        assert!(store.current_alerts().unwrap().is_empty());
        assert!(store.shelters().unwrap().is_empty());
    }

    #[test]
    fn test_reads_arrays() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SHELTERS_FILE),
            r#"[{"name": "A", "capacity": 10, "latitude": 40.71, "longitude": -74.0}, {"name": "B"}]"#,
        )
        .unwrap();

        let store = JsonRecordStore::new(dir.path().to_path_buf());
        let shelters = store.shelters().unwrap();
        assert_eq!(shelters.len(), 2);
        assert_eq!(shelters[0]["name"], "A");
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory where the file should be cannot be read as text
        fs::create_dir(dir.path().join(ALERTS_FILE)).unwrap();

        let store = JsonRecordStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.current_alerts(),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_rejects_non_array_and_bad_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(ALERTS_FILE), r#"{"type": "Flood"}"#).unwrap();
        fs::write(dir.path().join(SHELTERS_FILE), "[{").unwrap();

        let store = JsonRecordStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.current_alerts(),
            Err(StoreError::NotAnArray(_))
        ));
        assert!(matches!(store.shelters(), Err(StoreError::Parse { .. })));
    }
}
