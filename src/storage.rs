#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::api::types::Film;

/// Key under which the favorites set is persisted.
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Key-value layer
// ---------------------------------------------------------------------------

/// A persisted mapping from string keys to serialized values.
pub trait KeyValueStore {
    /// Read a value; a missing key is `Ok(None)`, not an error.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(StorageError::Unavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write beside the target and rename so readers never see a partial value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-memory store with switchable failures, used in place of the file store
/// in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_owned(), value.to_owned());
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read failed".into()));
        }
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write failed".into()));
        }
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

// ---------------------------------------------------------------------------
// Favorites repository
// ---------------------------------------------------------------------------

/// Whole-set access to the persisted favorites.
pub trait FavoritesRepository {
    fn get(&self) -> Result<Vec<Film>, StorageError>;
    fn set(&self, films: &[Film]) -> Result<(), StorageError>;
}

impl<S: KeyValueStore> FavoritesRepository for S {
    fn get(&self) -> Result<Vec<Film>, StorageError> {
        match self.read(FAVORITES_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn set(&self, films: &[Film]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(films)?;
        self.write(FAVORITES_KEY, &json)
    }
}

/// Default data directory (`~/.config/holocron`).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/holocron")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(episode_id: u32, title: &str) -> Film {
        serde_json::from_value(serde_json::json!({
            "episode_id": episode_id,
            "title": title,
        }))
        .unwrap()
    }

    #[test]
    fn missing_key_is_empty_set() {
        let store = MemoryStore::new();
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let store = MemoryStore::with_value(FAVORITES_KEY, "{not json");
        assert!(matches!(store.get(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn file_store_round_trips_under_fixed_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        assert!(store.get().unwrap().is_empty());
        store.set(&[film(4, "A New Hope"), film(6, "Return of the Jedi")]).unwrap();

        let reloaded = JsonFileStore::new(dir.path().join("nested")).get().unwrap();
        let ids: Vec<u32> = reloaded.iter().map(|f| f.episode_id).collect();
        assert_eq!(ids, vec![4, 6]);
        assert!(dir.path().join("nested/favorites.json").exists());
        assert!(!dir.path().join("nested/favorites.json.tmp").exists());
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let store = MemoryStore::new();
        store.set(&[film(1, "The Phantom Menace")]).unwrap();
        store.set_fail_writes(true);
        assert!(store.set(&[]).is_err());
        assert_eq!(store.get().unwrap().len(), 1);
    }

    #[test]
    fn file_in_place_of_data_dir_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("holocron");
        fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::new(&blocker);
        assert!(matches!(
            store.set(&[film(4, "A New Hope")]),
            Err(StorageError::Unavailable(_))
        ));
    }
}
