//! JSON file persistence.
//!
//! Every store is a single JSON document rewritten after each mutation. Writes
//! go to a sibling temp file which is then renamed over the target, so a crash
//! mid-write leaves the previous document intact.

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const FAILED_ATTEMPTS_FILE: &str = "failed_attempts.json";
pub const VERIFICATION_LOG_FILE: &str = "verification_log.json";
pub const WELCOME_MESSAGES_FILE: &str = "welcome_messages.json";
pub const USERNAME_UPDATES_FILE: &str = "username_updates.json";
pub const WARNINGS_FILE: &str = "warnings.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store encode error on {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A JSON document holding one value of type `T`.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. Missing, empty or unreadable files yield `T::default()`.
    pub fn load(&self) -> T {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read store, starting empty");
                return T::default();
            }
        };
        if content.trim().is_empty() {
            return T::default();
        }
        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt store, starting empty");
                T::default()
            }
        }
    }

    /// Replace the document with `value`.
    pub fn save(&self, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), "Store written");
        Ok(())
    }
}

/// Append-only record log, persisted as a JSON array.
#[derive(Debug)]
pub struct AppendLog<T> {
    store: JsonStore<Vec<T>>,
    records: Mutex<Vec<T>>,
}

impl<T> AppendLog<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = JsonStore::new(path);
        let records = Mutex::new(store.load());
        Self { store, records }
    }

    pub fn append(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        records.push(record);
        self.store.save(&records)
    }

    pub fn records(&self) -> Vec<T> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.store.save(&self.records.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_and_empty_files_load_default() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<BTreeMap<String, u32>> = JsonStore::new(dir.path().join("a.json"));
        assert!(store.load().is_empty());

        std::fs::write(store.path(), "   ").unwrap();
        assert!(store.load().is_empty());

        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested/b.json"));
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), 3u32);
        store.save(&map).unwrap();
        assert_eq!(store.load(), map);
        assert!(!dir.path().join("nested/b.json.tmp").exists());
    }

    #[test]
    fn append_log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        let log = AppendLog::open(&path);
        log.append("first".to_string()).unwrap();
        log.append("second".to_string()).unwrap();

        let reopened: AppendLog<String> = AppendLog::open(&path);
        assert_eq!(reopened.records(), vec!["first", "second"]);
    }
}
