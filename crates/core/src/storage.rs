//! Key/value local storage for client session state
//!
//! Mirrors the browser `localStorage` model: string keys mapped to string
//! values. Two backends are provided:
//! - [`FileStorage`]: a single JSON object persisted on disk
//! - [`MemoryStorage`]: process-local, used by tests and ephemeral sessions
//!
//! # Example
//!
//! ```rust,ignore
//! use medrec_core::storage::{MemoryStorage, Storage};
//!
//! let storage = MemoryStorage::new();
//! storage.set("token", "abc123")?;
//! assert_eq!(storage.get("token")?, Some("abc123".to_string()));
//! ```

use crate::error::{Error, ErrorCode, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

/// String key/value store with `localStorage` semantics
pub trait Storage: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored, in sorted order
    fn keys(&self) -> Result<Vec<String>>;
}

fn lock_error() -> Error {
    Error::new(ErrorCode::StorageLocked, "Failed to acquire storage lock")
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| lock_error())?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| lock_error())?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| lock_error())?;
        guard.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let guard = self.entries.read().map_err(|_| lock_error())?;
        Ok(guard.keys().cloned().collect())
    }
}

/// File-backed storage
///
/// The whole map is held in memory and rewritten on every mutation. Writes go
/// to a uniquely named, owner-only temp file in the same directory which is
/// then renamed over the target. The in-memory map only changes once the
/// file has been replaced.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| Error::storage_corrupted(&path).with_source(e))?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened local storage");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&serde_json::to_vec_pretty(entries)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::from(e.error))?;
        Ok(())
    }

    /// Apply `change` to a copy of the map and commit it once it is on disk
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| lock_error())?;
        let mut next = guard.clone();
        if change(&mut next) {
            self.persist(&next)?;
            *guard = next;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| lock_error())?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let guard = self.entries.read().map_err(|_| lock_error())?;
        Ok(guard.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_set_and_get() {
        let storage = MemoryStorage::new();
        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap(), Some("abc".to_string()));
        assert!(storage.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_memory_remove_absent_key() {
        let storage = MemoryStorage::new();
        storage.remove("nothing").unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn test_file_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("session", r#"{"access_token":"t"}"#).unwrap();
        storage.set("expireDate", "2030-01-01T00:00:00Z").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("expireDate").unwrap().as_deref(),
            Some("2030-01-01T00:00:00Z")
        );
        assert_eq!(reopened.keys().unwrap(), vec!["expireDate", "session"]);
    }

    #[test]
    fn test_file_remove() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("token", "legacy").unwrap();
        storage.remove("token").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert!(reopened.get("token").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("token", "secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("token", "first").unwrap();

        // A directory in place of the file makes the final rename fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(storage.set("token", "second").is_err());
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("first"));
        assert!(storage.remove("token").is_err());
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_file_corrupted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStorage::open(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageCorrupted);
    }

    #[test]
    fn test_file_empty_is_valid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("storage.json");
        fs::write(&path, "").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }
}
