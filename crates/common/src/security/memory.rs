//! In-memory secret store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::traits::{SecretStore, SecretStoreError};

/// Process-local [`SecretStore`]; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn set(&self, key: &str, value: &str) -> Result<(), SecretStoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String, SecretStoreError> {
        self.entries.lock().get(key).cloned().ok_or(SecretStoreError::NotFound)
    }

    fn delete(&self, key: &str) -> Result<(), SecretStoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
