//! Integration tests for the credential store
//!
//! Uses the in-memory secret store so no OS keychain is touched.

use std::sync::Arc;

use bookdesk_common::auth::CredentialStore;
use bookdesk_common::security::{MemorySecretStore, SecretStore, SecretStoreError};
use bookdesk_domain::constants::{ACCESS_TOKEN_KEY, IDENTITY_KEY, REFRESH_TOKEN_KEY};
use bookdesk_domain::{Credentials, Identity};
use serde_json::json;

fn admin() -> Identity {
    serde_json::from_value(json!({
        "id": "u-1",
        "email": "admin@example.com",
        "name": "Admin",
        "role": "ADMIN",
        "tenant": "north"
    }))
    .unwrap()
}

/// A session written by one store instance is visible to the next process
/// start, including the identity record and its extra attributes.
#[test]
fn test_session_survives_restart() {
    let backend = MemorySecretStore::new();

    let first = CredentialStore::new(Arc::new(backend.clone()));
    first.save(Credentials::new("access-1", "refresh-1")).unwrap();
    first.save_identity(admin()).unwrap();

    let restarted = CredentialStore::new(Arc::new(backend));
    assert!(!restarted.has_credentials(), "nothing is visible before load");

    let loaded = restarted.load().unwrap();
    assert_eq!(loaded, Some(Credentials::new("access-1", "refresh-1")));

    let identity = restarted.identity().unwrap();
    assert_eq!(identity.email.as_deref(), Some("admin@example.com"));
    assert_eq!(identity.attributes.get("tenant"), Some(&json!("north")));
}

/// Saving a refreshed pair replaces both tokens in memory and in storage.
#[test]
fn test_save_replaces_previous_pair() {
    let backend = MemorySecretStore::new();
    let store = CredentialStore::new(Arc::new(backend.clone()));

    store.save(Credentials::new("old-a", "old-r")).unwrap();
    store.save(Credentials::new("new-a", "new-r")).unwrap();

    assert_eq!(store.access_token().as_deref(), Some("new-a"));
    assert_eq!(backend.get(ACCESS_TOKEN_KEY).unwrap(), "new-a");
    assert_eq!(backend.get(REFRESH_TOKEN_KEY).unwrap(), "new-r");
}

/// Clearing removes every persisted key and the in-memory identity.
#[test]
fn test_clear_removes_all_keys() {
    let backend = MemorySecretStore::new();
    let store = CredentialStore::new(Arc::new(backend.clone()));
    store.save(Credentials::new("a", "r")).unwrap();
    store.save_identity(admin()).unwrap();

    store.clear().unwrap();

    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, IDENTITY_KEY] {
        assert!(matches!(backend.get(key), Err(SecretStoreError::NotFound)), "{key} left behind");
    }
    assert!(store.identity().is_none());
    assert!(store.credentials().is_none());
}

struct ReadOnlyStore;

impl SecretStore for ReadOnlyStore {
    fn set(&self, _key: &str, _value: &str) -> Result<(), SecretStoreError> {
        Err(SecretStoreError::AccessFailed("read-only".into()))
    }

    fn get(&self, _key: &str) -> Result<String, SecretStoreError> {
        Err(SecretStoreError::NotFound)
    }

    fn delete(&self, _key: &str) -> Result<(), SecretStoreError> {
        Err(SecretStoreError::AccessFailed("read-only".into()))
    }
}

/// A failed write leaves the in-memory snapshot untouched; a failed delete
/// still clears memory.
#[test]
fn test_backend_failures_are_reported() {
    let store = CredentialStore::new(Arc::new(ReadOnlyStore));

    let err = store.save(Credentials::new("a", "r")).unwrap_err();
    assert!(matches!(err, SecretStoreError::AccessFailed(_)));
    assert!(!store.has_credentials());

    assert!(store.clear().is_err());
    assert!(!store.has_credentials());
}
