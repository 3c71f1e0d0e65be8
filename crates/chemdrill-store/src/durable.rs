//! Durable key-value backends.
//!
//! The durable tier mimics browser local storage: a flat string-keyed map
//! of JSON strings. [`JsonFileStore`] persists the whole map to one file,
//! rewritten on every write; [`MemoryStore`] backs tests and can be told to
//! reject writes to exercise quota-failure handling.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::StoreError;

/// A flat, synchronous key-value store for small JSON payloads.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str);
}

/// In-memory backend for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail, simulating a full quota.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                reason: "storage quota exceeded".into(),
            });
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// File-backed store: one JSON object per file, loaded on open and
/// rewritten on every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store file, creating parent directories as needed. A
    /// missing file starts empty; a corrupt file is discarded with a
    /// warning rather than failing the open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "store file is corrupt, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Unavailable(e.to_string())),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries).map_err(|e| StoreError::WriteFailed {
            key: String::new(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::WriteFailed {
            key: String::new(),
            reason: e.to_string(),
        })
    }
}

impl DurableStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).map_err(|e| match e {
            StoreError::WriteFailed { reason, .. } => StoreError::WriteFailed {
                key: key.to_string(),
                reason,
            },
            other => other,
        })
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_some() {
            if let Err(e) = self.flush(&entries) {
                tracing::warn!(key, error = %e, "failed to persist removal");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a");
        assert!(store.get("a").is_none());
    }

    #[test]
    fn memory_store_rejects_writes_when_told() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = store.set("a", "1").unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("chemdrill_general_compounds", r#"{"v":1}"#).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("chemdrill_general_compounds").as_deref(),
            Some(r#"{"v":1}"#)
        );
    }

    #[test]
    fn file_store_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("fresh.json")).unwrap();
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json {").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("anything").is_none());
        // And it recovers: the next write produces a valid file.
        store.set("k", "v").unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("k", "v").unwrap();
        store.remove("k");
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get("k").is_none());
    }
}
