//! Durable key/value storage for the persisted stores.
//!
//! Both stores write JSON strings under fixed keys, the way a browser's
//! local storage would hold them. Two backends are provided:
//!
//! ```text
//! MemoryStorage   in-process map, lost on drop
//! FileStorage     <data_dir>/<key>.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Key holding the admin authentication blob.
pub const AUTH_STORAGE_KEY: &str = "admin-auth";

/// Key holding the excursions and teilnehmer collections.
pub const DATA_STORAGE_KEY: &str = "admin-data";

/// Key holding the in-progress registration draft.
pub const DRAFT_STORAGE_KEY: &str = "anmeldung-store";

/// File extension used by [`FileStorage`].
const ITEM_EXTENSION: &str = "json";

/// Synchronous string storage keyed by name.
pub trait LocalStorage: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Erases `key`. Returns `true` if a value was removed.
    fn remove_item(&self, key: &str) -> Result<bool, StorageError>;
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        Ok(items.remove(key).is_some())
    }
}

/// Filesystem storage backend.
///
/// Each key is stored as `<key>.json` in the data directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Creates a new storage instance rooted at `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, ITEM_EXTENSION))
    }

    /// Checks if a key exists on disk.
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).exists()
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    /// Creates the data directory if it doesn't exist.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(key);
        fs::write(&path, value).map_err(|e| StorageError::Io(path, e))?;

        tracing::debug!("Wrote {} bytes to {}", value.len(), key);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }
}

/// Errors that can occur while reading or writing storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        (storage, temp_dir)
    }

    #[test]
    fn test_file_path_uses_key() {
        let (storage, _temp) = test_storage();
        assert!(storage.path(DRAFT_STORAGE_KEY).ends_with("anmeldung-store.json"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (storage, _temp) = test_storage();
        assert!(storage.get_item(AUTH_STORAGE_KEY).unwrap().is_none());
        assert!(!storage.exists(AUTH_STORAGE_KEY));
    }

    #[test]
    fn test_set_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let storage = FileStorage::new(nested.clone());

        storage.set_item(DATA_STORAGE_KEY, "{}").unwrap();

        assert!(nested.exists());
        assert!(storage.exists(DATA_STORAGE_KEY));
    }

    #[test]
    fn test_set_overwrites_and_get_returns_latest() {
        let (storage, _temp) = test_storage();

        storage.set_item(DATA_STORAGE_KEY, "first").unwrap();
        storage.set_item(DATA_STORAGE_KEY, "second").unwrap();

        assert_eq!(
            storage.get_item(DATA_STORAGE_KEY).unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_remove_reports_whether_file_existed() {
        let (storage, _temp) = test_storage();
        storage.set_item(DRAFT_STORAGE_KEY, "{}").unwrap();

        assert!(storage.remove_item(DRAFT_STORAGE_KEY).unwrap());
        assert!(!storage.remove_item(DRAFT_STORAGE_KEY).unwrap());
        assert!(storage.get_item(DRAFT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_item(AUTH_STORAGE_KEY, "a").unwrap();
        storage.set_item(DATA_STORAGE_KEY, "b").unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get_item(AUTH_STORAGE_KEY).unwrap().as_deref(), Some("a"));

        assert!(storage.remove_item(AUTH_STORAGE_KEY).unwrap());
        assert!(!storage.remove_item(AUTH_STORAGE_KEY).unwrap());
        assert_eq!(storage.len(), 1);
    }
}
