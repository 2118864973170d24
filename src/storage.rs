//! String key-value persistence for per-vault local state.

use crate::error::StoreError;
use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const TAG_COUNT_KEY: &str = "tag-count";
pub const LOCAL_STORAGE_FILE: &str = "local-storage.json";

pub trait KeyValueStore {
    /// Absent, unreadable and corrupt entries all read as `None`.
    fn load_value(&self, key: &str) -> Option<String>;
    fn save_value(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// JSON object of string values kept in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_state_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(LOCAL_STORAGE_FILE))
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::Read { path: self.path.clone(), source });
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(
                    "event=store_corrupt path={} error={err}; treating as empty",
                    self.path.display()
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(map)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded)
            .map_err(|source| StoreError::Write { path: tmp.clone(), source })?;
        fs::rename(&tmp, &self.path)
            .map_err(|source| StoreError::Write { path: self.path.clone(), source })
    }
}

impl KeyValueStore for FileStore {
    fn load_value(&self, key: &str) -> Option<String> {
        match self.read_map() {
            Ok(mut map) => map.remove(key),
            Err(err) => {
                warn!("event=store_unreadable key={key} error={err}");
                None
            }
        }
    }

    fn save_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // An unreadable file is replaced rather than blocking the write.
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent `save_value` fail with `StoreError::Unavailable`.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryStore {
    fn load_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_missing_file_is_absent() {
        let tmp = tempdir().unwrap();
        let store = FileStore::in_state_dir(tmp.path());
        assert_eq!(store.load_value(TAG_COUNT_KEY), None);
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let tmp = tempdir().unwrap();
        let mut store = FileStore::in_state_dir(&tmp.path().join("state"));
        store.save_value("other", "x").unwrap();
        store.save_value(TAG_COUNT_KEY, "42").unwrap();
        assert_eq!(store.load_value(TAG_COUNT_KEY).as_deref(), Some("42"));
        assert_eq!(store.load_value("other").as_deref(), Some("x"));
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty_and_is_repaired() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(LOCAL_STORAGE_FILE);
        fs::write(&path, "{not json").unwrap();
        let mut store = FileStore::new(&path);
        assert_eq!(store.load_value(TAG_COUNT_KEY), None);

        store.save_value(TAG_COUNT_KEY, "7").unwrap();
        assert_eq!(store.load_value(TAG_COUNT_KEY).as_deref(), Some("7"));
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let mut store = MemoryStore::with_value(TAG_COUNT_KEY, "3");
        store.fail_writes(true);
        assert!(matches!(
            store.save_value(TAG_COUNT_KEY, "4"),
            Err(StoreError::Unavailable)
        ));
        assert_eq!(store.load_value(TAG_COUNT_KEY).as_deref(), Some("3"));
    }
}
