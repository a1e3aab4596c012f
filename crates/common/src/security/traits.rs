//! Secret storage abstraction

use thiserror::Error;

/// Synchronous key-value storage for secrets
///
/// Implementations must treat `delete` of a missing key as success.
pub trait SecretStore: Send + Sync {
    /// Store a secret value under `key`, replacing any existing value
    ///
    /// # Errors
    /// Returns `SecretStoreError::AccessFailed` if the backend rejects the write
    fn set(&self, key: &str, value: &str) -> Result<(), SecretStoreError>;

    /// Retrieve the secret stored under `key`
    ///
    /// # Errors
    /// Returns `SecretStoreError::NotFound` if nothing is stored under `key`
    fn get(&self, key: &str) -> Result<String, SecretStoreError>;

    /// Delete the secret stored under `key` (idempotent)
    ///
    /// # Errors
    /// Returns `SecretStoreError::AccessFailed` if the backend rejects the delete
    fn delete(&self, key: &str) -> Result<(), SecretStoreError>;

    /// Retrieve a secret, mapping `NotFound` to `None`
    ///
    /// # Errors
    /// Propagates every error except `NotFound`
    fn get_optional(&self, key: &str) -> Result<Option<String>, SecretStoreError> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(SecretStoreError::NotFound) => Ok(None),
            Err(other) => Err(other),
        }
    }
}

/// Secret storage errors
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// Backend access failed (permission denied, not available, etc.)
    #[error("Secret store access failed: {0}")]
    AccessFailed(String),

    /// Entry not found
    #[error("Entry not found")]
    NotFound,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<SecretStoreError> for bookdesk_domain::BookdeskError {
    fn from(err: SecretStoreError) -> Self {
        match err {
            SecretStoreError::NotFound => Self::NotFound("secret not found".into()),
            other => Self::Storage(other.to_string()),
        }
    }
}
