//! Client context
//!
//! The credential store, response cache and loading tracker live in one
//! explicitly constructed [`ClientContext`] instead of process globals.
//! `init` runs at application start; `reset` runs on logout and when a
//! session can no longer be refreshed.

use std::sync::Arc;

use bookdesk_common::auth::CredentialStore;
use bookdesk_common::loading::LoadingTracker;
use bookdesk_common::security::{KeychainProvider, SecretStore, SecretStoreError};
use bookdesk_common::time::{SharedClock, SystemClock};
use bookdesk_domain::{
    impl_domain_status_conversions, BookdeskError, ClientConfig, Credentials, Identity,
};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::cache::ResponseCache;
use crate::errors::InfraError;

const SESSION_EVENT_CAPACITY: usize = 16;

/// Session lifecycle notifications for the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    /// Credentials were rejected and could not be refreshed; the host should
    /// route to its sign-in page.
    Expired,
}

impl_domain_status_conversions!(SessionEvent {
    SignedIn => "signed_in",
    SignedOut => "signed_out",
    Expired => "expired",
});

struct ContextInner {
    config: ClientConfig,
    credentials: CredentialStore,
    cache: ResponseCache,
    loading: LoadingTracker,
    events: broadcast::Sender<SessionEvent>,
    /// Bumped by every reset and sign-in; guards credential writes.
    generation: Mutex<u64>,
}

/// Shared state behind every [`ApiClient`](super::ApiClient)
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ClientContext {
    inner: Arc<ContextInner>,
}

impl ClientContext {
    /// Validate `config`, build the context and load persisted credentials
    ///
    /// # Errors
    /// Returns `BookdeskError::Config` for an invalid configuration and
    /// `BookdeskError::Storage` if the secret store cannot be read.
    pub fn init(
        config: ClientConfig,
        secret_store: Arc<dyn SecretStore>,
    ) -> Result<Self, BookdeskError> {
        Self::with_clock(config, secret_store, Arc::new(SystemClock))
    }

    /// [`init`](Self::init) backed by the OS keychain under
    /// `config.keychain_service`
    ///
    /// # Errors
    /// See [`init`](Self::init)
    pub fn init_with_keychain(config: ClientConfig) -> Result<Self, BookdeskError> {
        let keychain = KeychainProvider::new(config.keychain_service.clone());
        Self::init(config, Arc::new(keychain))
    }

    /// [`init`](Self::init) with an injected clock for cache expiry
    ///
    /// # Errors
    /// See [`init`](Self::init)
    pub fn with_clock(
        config: ClientConfig,
        secret_store: Arc<dyn SecretStore>,
        clock: SharedClock,
    ) -> Result<Self, BookdeskError> {
        config.validate()?;

        let credentials = CredentialStore::new(secret_store);
        let restored = credentials.load().map_err(|e| BookdeskError::from(InfraError::from(e)))?;
        info!(restored_session = restored.is_some(), "client context initialized");

        let cache = ResponseCache::new(config.cache_ttl(), config.cache_max_entries, clock);
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(ContextInner {
                config,
                credentials,
                cache,
                loading: LoadingTracker::new(),
                events,
                generation: Mutex::new(0),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    pub fn loading(&self) -> &LoadingTracker {
        &self.inner.loading
    }

    /// Receive session events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No receivers is fine: the host may not listen.
        let _ = self.inner.events.send(event);
    }

    /// Clear credentials, identity and cached responses
    ///
    /// Starts a new session generation, so a refresh still in flight can no
    /// longer store its result. A storage failure is logged; the in-memory
    /// session is cleared either way.
    pub fn reset(&self) {
        let mut generation = self.inner.generation.lock();
        *generation += 1;
        if let Err(e) = self.inner.credentials.clear() {
            warn!(error = %e, "failed to remove persisted credentials during reset");
        }
        self.inner.cache.clear_all();
        info!(generation = *generation, "client context reset");
    }

    /// Current session generation
    pub fn session_generation(&self) -> u64 {
        *self.inner.generation.lock()
    }

    /// Replace the session after a successful sign-in
    ///
    /// Persists the pair and identity under a new generation and drops
    /// cached responses of the previous session.
    pub(crate) fn sign_in(
        &self,
        credentials: Credentials,
        identity: Identity,
    ) -> Result<(), SecretStoreError> {
        let mut generation = self.inner.generation.lock();
        *generation += 1;
        self.inner.credentials.save(credentials)?;
        self.inner.credentials.save_identity(identity)?;
        self.inner.cache.clear_all();
        Ok(())
    }

    /// Store a refreshed pair if the session is still `generation`
    ///
    /// Returns `Ok(false)` without writing when a reset or sign-in happened
    /// since the refresh started.
    pub(crate) fn save_refreshed(
        &self,
        generation: u64,
        credentials: Credentials,
    ) -> Result<bool, SecretStoreError> {
        let current = self.inner.generation.lock();
        if *current != generation {
            return Ok(false);
        }
        self.inner.credentials.save(credentials)?;
        Ok(true)
    }

    /// Reset and tell the host the session is gone
    pub(crate) fn expire(&self) {
        warn!("session expired; forcing sign-out");
        self.reset();
        self.emit(SessionEvent::Expired);
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("base_url", &self.inner.config.base_url)
            .field("credentials", &self.inner.credentials)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}
