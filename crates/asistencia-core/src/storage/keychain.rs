use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use keyring::Entry;
use tracing::debug;

use super::{SessionStorage, StorageError};

const SERVICE_NAME: &str = "asistencia";

/// Stores each session key as its own entry in the OS keychain.
///
/// Entries are opened once per key and reused for the life of the storage.
pub struct KeyringStorage {
    service: String,
    entries: Mutex<HashMap<String, Arc<Entry>>>,
}

impl fmt::Debug for KeyringStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringStorage")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeyringStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: &str) -> Result<Arc<Entry>, StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key) {
            return Ok(Arc::clone(entry));
        }
        let entry = Arc::new(Entry::new(&self.service, key)?);
        entries.insert(key.to_string(), Arc::clone(&entry));
        Ok(entry)
    }
}

impl SessionStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!(key, "Keychain entry already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY};

    fn mock_keychain() -> KeyringStorage {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringStorage::new("asistencia-test")
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let storage = mock_keychain();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).expect("get"), None);

        storage.set(AUTH_TOKEN_KEY, "T").expect("set");
        storage.set(REFRESH_TOKEN_KEY, "R").expect("set");
        assert_eq!(storage.get(AUTH_TOKEN_KEY).expect("get").as_deref(), Some("T"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).expect("get").as_deref(), Some("R"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let storage = mock_keychain();
        storage.set(AUTH_TOKEN_KEY, "T").expect("set");

        storage.remove(AUTH_TOKEN_KEY).expect("remove");
        storage.remove(AUTH_TOKEN_KEY).expect("second remove");
        assert_eq!(storage.get(AUTH_TOKEN_KEY).expect("get"), None);
    }
}
