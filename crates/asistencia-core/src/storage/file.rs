use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use super::{SessionStorage, StorageError};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Stores all session keys as one JSON object on disk.
///
/// The map is kept in memory and the whole file is rewritten on every
/// change; the session writes at most five small keys.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) `session.json` inside `cache_dir`.
    ///
    /// An unreadable file is logged and treated as empty so a corrupt
    /// session never blocks startup.
    pub fn open(cache_dir: &Path) -> Result<Self, StorageError> {
        let path = cache_dir.join(SESSION_FILE);
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Ignoring unparseable session file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Session storage opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).expect("open");
        storage.set("auth_token", "T").expect("set");
        storage.set("refresh_token", "R").expect("set");

        let reopened = FileStorage::open(dir.path()).expect("reopen");
        assert_eq!(reopened.get("auth_token").expect("get").as_deref(), Some("T"));
        assert_eq!(reopened.get("refresh_token").expect("get").as_deref(), Some("R"));
        assert_eq!(reopened.get("user").expect("get"), None);
    }

    #[test]
    fn test_removing_last_key_deletes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).expect("open");
        storage.set("auth_token", "T").expect("set");
        assert!(storage.path().exists());

        storage.remove("auth_token").expect("remove");
        storage.remove("auth_token").expect("second remove is a no-op");
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").expect("write");

        let storage = FileStorage::open(dir.path()).expect("open");
        assert_eq!(storage.get("auth_token").expect("get"), None);
    }
}
