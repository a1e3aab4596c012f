//! Platform keychain backend
//!
//! Thin wrapper over the OS credential vault (macOS Keychain Access, Windows
//! Credential Manager, Linux Secret Service). Every entry lives under one
//! service name; keys are the keychain account names.
//!
//! ```no_run
//! use bookdesk_common::security::{KeychainProvider, SecretStore};
//!
//! let keychain = KeychainProvider::new("bookdesk");
//! keychain.set("access_token", "token")?;
//! assert_eq!(keychain.get("access_token")?, "token");
//! # Ok::<(), bookdesk_common::security::SecretStoreError>(())
//! ```

use keyring::Entry;
use tracing::debug;

use super::traits::{SecretStore, SecretStoreError};

/// Keychain-backed [`SecretStore`]
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn create_entry(&self, account: &str) -> Result<Entry, SecretStoreError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            SecretStoreError::AccessFailed(format!("Failed to create keychain entry: {e}"))
        })
    }
}

impl SecretStore for KeychainProvider {
    fn set(&self, key: &str, value: &str) -> Result<(), SecretStoreError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        self.create_entry(key)?.set_password(value).map_err(|e| {
            SecretStoreError::AccessFailed(format!("Failed to store secret for {key}: {e}"))
        })
    }

    fn get(&self, key: &str) -> Result<String, SecretStoreError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        self.create_entry(key)?.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                SecretStoreError::NotFound
            } else {
                SecretStoreError::AccessFailed(format!("Failed to retrieve secret for {key}: {e}"))
            }
        })
    }

    fn delete(&self, key: &str) -> Result<(), SecretStoreError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        match self.create_entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretStoreError::AccessFailed(format!(
                "Failed to delete secret for {key}: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_service_name() {
        let keychain = KeychainProvider::new("bookdesk.test");
        assert_eq!(keychain.service_name(), "bookdesk.test");
    }
}
