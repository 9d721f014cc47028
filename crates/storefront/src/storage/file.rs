//! JSON file store.
//!
//! The whole store is one JSON object of string values, read on every access
//! and rewritten on every change. It holds two small keys, so this stays cheap.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Store persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        // Write to a sibling file first so a crash never leaves a truncated store
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = entries.len(), "Storage file written");
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut entries = self.read_all()?;
        if f(&mut entries) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shopfront-test-{}-{name}", std::process::id()))
            .join("storage.json")
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let store = FileStore::new(temp_path("missing"));
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let store = FileStore::new(&path);
        store.set("userId", "user_a1b2c3d4e").unwrap();
        store.set("cart", r#"{"items":[]}"#).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("userId").unwrap().as_deref(),
            Some("user_a1b2c3d4e")
        );
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some(r#"{"items":[]}"#));

        reopened.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        assert!(store.get("userId").unwrap().is_some());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("cart"), Err(StorageError::Corrupt(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
