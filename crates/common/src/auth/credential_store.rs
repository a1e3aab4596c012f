//! Credential store backed by a [`SecretStore`]
//!
//! Keeps an in-memory snapshot of the persisted credentials so the request
//! path never touches the backing store. Writes go to the backend first and
//! only then replace the snapshot.

use std::fmt;
use std::sync::Arc;

use bookdesk_domain::constants::{ACCESS_TOKEN_KEY, IDENTITY_KEY, REFRESH_TOKEN_KEY};
use bookdesk_domain::{Credentials, Identity};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::security::{SecretStore, SecretStoreError};

/// Durable holder of the credential pair and current identity
///
/// Clones share the same snapshot and backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SecretStore>,
    credentials: Arc<RwLock<Option<Credentials>>>,
    identity: Arc<RwLock<Option<Identity>>>,
}

impl CredentialStore {
    /// Create an empty store over `backend`; call [`load`](Self::load) to
    /// pick up previously persisted state.
    pub fn new(backend: Arc<dyn SecretStore>) -> Self {
        Self {
            backend,
            credentials: Arc::new(RwLock::new(None)),
            identity: Arc::new(RwLock::new(None)),
        }
    }

    /// Load persisted credentials and identity into memory
    ///
    /// A half-written pair (only one of the two tokens present) is treated as
    /// signed out. An identity record that no longer deserializes is dropped.
    ///
    /// # Errors
    /// Returns an error only if the backend cannot be read
    pub fn load(&self) -> Result<Option<Credentials>, SecretStoreError> {
        let access = self.backend.get_optional(ACCESS_TOKEN_KEY)?;
        let refresh = self.backend.get_optional(REFRESH_TOKEN_KEY)?;

        let loaded = match (access, refresh) {
            (Some(access), Some(refresh)) => Some(Credentials::new(access, refresh)),
            (None, None) => None,
            _ => {
                warn!("Incomplete credential pair in secret store; treating as signed out");
                None
            }
        };

        let identity = match self.backend.get_optional(IDENTITY_KEY)? {
            Some(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable identity record");
                    None
                }
            },
            None => None,
        };

        debug!(
            has_credentials = loaded.is_some(),
            has_identity = identity.is_some(),
            "Credential store loaded"
        );

        *self.credentials.write() = loaded.clone();
        *self.identity.write() = identity;
        Ok(loaded)
    }

    /// Persist a new credential pair, replacing any previous one
    ///
    /// # Errors
    /// Returns an error if the backend rejects either write; the in-memory
    /// snapshot is left unchanged in that case.
    pub fn save(&self, credentials: Credentials) -> Result<(), SecretStoreError> {
        self.backend.set(ACCESS_TOKEN_KEY, &credentials.access_token)?;
        self.backend.set(REFRESH_TOKEN_KEY, &credentials.refresh_token)?;
        *self.credentials.write() = Some(credentials);
        debug!("Credentials saved");
        Ok(())
    }

    /// Persist the signed-in identity record
    ///
    /// # Errors
    /// Returns an error if serialization or the backend write fails
    pub fn save_identity(&self, identity: Identity) -> Result<(), SecretStoreError> {
        let raw = serde_json::to_string(&identity)?;
        self.backend.set(IDENTITY_KEY, &raw)?;
        *self.identity.write() = Some(identity);
        Ok(())
    }

    /// Drop credentials and identity from memory and from the backend
    ///
    /// Memory is cleared first so no request can pick up a token that is
    /// being removed. Every key is attempted even if an earlier delete fails.
    ///
    /// # Errors
    /// Returns the first backend error encountered
    pub fn clear(&self) -> Result<(), SecretStoreError> {
        *self.credentials.write() = None;
        *self.identity.write() = None;

        let mut first_error = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, IDENTITY_KEY] {
            if let Err(e) = self.backend.delete(key) {
                warn!(key = %key, error = %e, "Failed to delete persisted credential");
                first_error.get_or_insert(e);
            }
        }

        info!("Credentials cleared");
        first_error.map_or(Ok(()), Err)
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.credentials.read().as_ref().map(|c| c.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.credentials.read().as_ref().map(|c| c.refresh_token.clone())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().clone()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.read().is_some()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_credentials", &self.has_credentials())
            .field("has_identity", &self.identity.read().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::security::MemorySecretStore;

    fn store_with_backend() -> (CredentialStore, MemorySecretStore) {
        let backend = MemorySecretStore::new();
        (CredentialStore::new(Arc::new(backend.clone())), backend)
    }

    fn identity() -> Identity {
        serde_json::from_value(json!({"id": 7, "email": "admin@example.com", "role": "ADMIN"}))
            .unwrap()
    }

    #[test]
    fn empty_backend_loads_nothing() {
        let (store, _) = store_with_backend();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.has_credentials());
        assert_eq!(store.identity(), None);
    }

    #[test]
    fn save_persists_under_fixed_keys() {
        let (store, backend) = store_with_backend();
        store.save(Credentials::new("a1", "r1")).unwrap();

        assert_eq!(backend.get(ACCESS_TOKEN_KEY).unwrap(), "a1");
        assert_eq!(backend.get(REFRESH_TOKEN_KEY).unwrap(), "r1");
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn load_restores_previous_session() {
        let (first, backend) = store_with_backend();
        first.save(Credentials::new("a1", "r1")).unwrap();
        first.save_identity(identity()).unwrap();

        let second = CredentialStore::new(Arc::new(backend));
        let loaded = second.load().unwrap();
        assert_eq!(loaded, Some(Credentials::new("a1", "r1")));
        assert_eq!(second.identity(), Some(identity()));
    }

    #[test]
    fn half_written_pair_is_ignored() {
        let (store, backend) = store_with_backend();
        backend.set(ACCESS_TOKEN_KEY, "orphan").unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!store.has_credentials());
    }

    #[test]
    fn corrupt_identity_is_dropped() {
        let (store, backend) = store_with_backend();
        backend.set(IDENTITY_KEY, "{not json").unwrap();

        store.load().unwrap();
        assert_eq!(store.identity(), None);
    }

    #[test]
    fn clear_drops_identity_and_persisted_keys() {
        let (store, backend) = store_with_backend();
        store.save(Credentials::new("a1", "r1")).unwrap();
        store.save_identity(identity()).unwrap();

        store.clear().unwrap();

        assert!(!store.has_credentials());
        assert_eq!(store.identity(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn debug_output_hides_tokens() {
        let (store, _) = store_with_backend();
        store.save(Credentials::new("secret-a", "secret-r")).unwrap();
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("secret-a"));
        assert!(rendered.contains("has_credentials: true"));
    }
}
