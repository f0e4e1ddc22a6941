use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use tracing::{info, warn};

use crate::error::StoreError;

/// Key holding the `Bearer ...` token string.
pub const TOKEN_KEY: &str = "github_token";
/// Key holding the most recently selected branch name.
pub const SELECTED_BRANCH_KEY: &str = "selected_branch";

/// Device-scoped secure storage for small string values.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Credential store backed by the OS keychain.
/// Each key becomes its own entry under the configured service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, keyring::Error> {
        Entry::new(&self.service, key)
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        info!("Reading secure entry: {}", key);
        let read_err = |e: keyring::Error| {
            warn!("Failed to read keyring entry {}: {}", key, e);
            StoreError::Read {
                key: key.to_string(),
                message: e.to_string(),
            }
        };
        let entry = self.entry(key).map_err(read_err)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => {
                info!("No secure entry found for: {}", key);
                Ok(None)
            }
            Err(e) => Err(read_err(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        info!("Writing secure entry: {}", key);
        let write_err = |e: keyring::Error| {
            warn!("Failed to write keyring entry {}: {}", key, e);
            StoreError::Write {
                key: key.to_string(),
                message: e.to_string(),
            }
        };
        let entry = self.entry(key).map_err(write_err)?;
        entry.set_password(value).map_err(write_err)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        info!("Deleting secure entry: {}", key);
        let delete_err = |e: keyring::Error| {
            warn!("Failed to delete keyring entry {}: {}", key, e);
            StoreError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            }
        };
        let entry = self.entry(key).map_err(delete_err)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(delete_err(e)),
        }
    }
}

/// Process-local store. Used when no keychain is available and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value, e.g. a token left behind by an earlier run.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_string(), value.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}
