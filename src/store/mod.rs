use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Key under which the countdown epoch is persisted (epoch millis as string).
///
/// Key names are camelCase for compatibility with state files written by
/// earlier builds of the wizard.
pub const OTP_TIMER_START_KEY: &str = "otpTimerStart";

/// Key under which the failed-attempt count is persisted (integer as string)
pub const OTP_ATTEMPTS_KEY: &str = "otpAttempts";

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read store: {0}")]
    ReadFailed(String),

    #[error("Failed to write store: {0}")]
    WriteFailed(String),
}

/// Minimal string key-value persistence for cross-session flow state.
///
/// The flow only ever stores the countdown epoch and the attempt counter, so
/// the interface stays deliberately small: load, save, remove. Values are
/// strings for compatibility with the original storage format.
pub trait KeyValueStore {
    /// Load a value, `None` when the key is absent
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Save a value, overwriting any previous one
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key if present
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// JSON file backed store.
///
/// The whole map is read and rewritten on each operation; the state is two
/// short keys, so simplicity wins over caching. A missing or unreadable file
/// behaves as an empty store rather than an error.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StoreError::ReadFailed(e.to_string())),
        };

        // Corrupt contents behave as an empty store rather than an error
        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(
                    "Store file {} is corrupt ({}), starting empty",
                    self.path.display(),
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::WriteFailed(format!("creating store directory: {}", e))
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        std::fs::write(&self.path, serialized)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        debug!("Persisted {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
            debug!("Removed persisted {}", key);
        }
        Ok(())
    }
}

/// In-process store for tests and ephemeral runs.
///
/// Handles are cheap to clone and share the same map, so a caller can keep
/// one handle to inspect state after handing another to the flow.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        assert_eq!(store.load(OTP_TIMER_START_KEY).unwrap(), None);

        store.save(OTP_TIMER_START_KEY, "1700000000000").unwrap();
        assert_eq!(
            store.load(OTP_TIMER_START_KEY).unwrap(),
            Some("1700000000000".to_string())
        );

        store.remove(OTP_TIMER_START_KEY).unwrap();
        assert_eq!(store.load(OTP_TIMER_START_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_handles_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save(OTP_ATTEMPTS_KEY, "3").unwrap();
        assert_eq!(handle.load(OTP_ATTEMPTS_KEY).unwrap(), Some("3".to_string()));
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let store = FileStore::new(&path);

        store.save(OTP_TIMER_START_KEY, "42").unwrap();
        store.save(OTP_ATTEMPTS_KEY, "2").unwrap();

        // A second store over the same file sees the saved state
        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.load(OTP_TIMER_START_KEY).unwrap(),
            Some("42".to_string())
        );
        assert_eq!(reopened.load(OTP_ATTEMPTS_KEY).unwrap(), Some("2".to_string()));

        reopened.remove(OTP_ATTEMPTS_KEY).unwrap();
        assert_eq!(reopened.load(OTP_ATTEMPTS_KEY).unwrap(), None);
        assert_eq!(
            reopened.load(OTP_TIMER_START_KEY).unwrap(),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("never_written.json"));

        assert_eq!(store.load(OTP_TIMER_START_KEY).unwrap(), None);
        // Removing from a missing file is a no-op, not an error
        store.remove(OTP_TIMER_START_KEY).unwrap();
    }

    #[test]
    fn test_file_store_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "not json {{").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.load(OTP_TIMER_START_KEY).unwrap(), None);

        // Writing replaces the corrupt contents
        store.save(OTP_ATTEMPTS_KEY, "1").unwrap();
        assert_eq!(store.load(OTP_ATTEMPTS_KEY).unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_file_store_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("state.json");
        let store = FileStore::new(&path);

        store.save(OTP_TIMER_START_KEY, "7").unwrap();
        assert_eq!(store.load(OTP_TIMER_START_KEY).unwrap(), Some("7".to_string()));
    }
}
