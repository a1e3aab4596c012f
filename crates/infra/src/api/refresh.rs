//! Credential refresh
//!
//! A 401 from a non-auth endpoint is recovered by exchanging the refresh
//! credential once and replaying the request once. Overlapping 401s share a
//! single in-flight refresh: the first one stores a [`Shared`] handle under a
//! lock, later ones clone it instead of starting their own exchange.
//! Persisting the new pair and the forced sign-out on failure both happen
//! inside the shared future, so they also run once per burst.

use std::sync::Arc;

use async_trait::async_trait;
use bookdesk_domain::constants::{is_auth_endpoint, AUTH_REFRESH_PATH};
use bookdesk_domain::{Credentials, RefreshResponse};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::context::ClientContext;
use super::dispatcher::{RawResponse, RequestDispatcher};
use super::errors::ApiError;
use super::request::RequestDescriptor;

/// Why a refresh could not produce new credentials
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh credential is stored")]
    MissingRefreshToken,

    #[error("refresh rejected with HTTP {0}")]
    Rejected(u16),

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh response could not be decoded: {0}")]
    Decode(String),

    #[error("refreshed credentials could not be stored: {0}")]
    Storage(String),

    #[error("session was reset while the refresh was in flight")]
    Cancelled,
}

/// Exchanges a refresh credential for a new pair
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, RefreshError>;
}

/// `POST /auth/refresh {refreshToken}` → `{access_token, refresh_token}`
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    dispatcher: RequestDispatcher,
}

impl HttpTokenRefresher {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, RefreshError> {
        let request =
            RequestDescriptor::post(AUTH_REFRESH_PATH, json!({ "refreshToken": refresh_token }));

        let response = self.dispatcher.dispatch(&request, None).await.map_err(|e| match e {
            ApiError::Status { status, .. } => RefreshError::Rejected(status),
            other => RefreshError::Transport(other.to_string()),
        })?;

        let value = response.json().map_err(|e| RefreshError::Decode(e.to_string()))?;
        let parsed: RefreshResponse =
            serde_json::from_value(value).map_err(|e| RefreshError::Decode(e.to_string()))?;

        Ok(parsed.into_credentials(refresh_token))
    }
}

type RefreshHandle = Shared<BoxFuture<'static, Result<Credentials, RefreshError>>>;

/// Coalesces refreshes and replays rejected requests
pub struct RefreshCoordinator {
    context: ClientContext,
    refresher: Arc<dyn TokenRefresher>,
    in_flight: Mutex<Option<RefreshHandle>>,
}

impl RefreshCoordinator {
    pub fn new(context: ClientContext, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { context, refresher, in_flight: Mutex::new(None) }
    }

    /// Dispatch with the current credential, recovering from one 401
    ///
    /// Auth endpoints are never recovered. The replay is sent exactly once and
    /// its outcome, including a second 401, is returned as is.
    ///
    /// # Errors
    /// Returns the dispatch error, or `ApiError::SessionExpired` when the
    /// refresh itself failed.
    pub async fn execute(
        &self,
        dispatcher: &RequestDispatcher,
        request: &RequestDescriptor,
    ) -> Result<RawResponse, ApiError> {
        let sent_with = self.context.credentials().access_token();

        match dispatcher.dispatch(request, sent_with.as_deref()).await {
            Err(err) if err.is_unauthorized() && !is_auth_endpoint(&request.path) => {
                debug!(path = %request.path, "access credential rejected; recovering");

                let credentials = self
                    .recover(sent_with.as_deref())
                    .await
                    .map_err(|e| ApiError::SessionExpired(e.to_string()))?;

                debug!(path = %request.path, "replaying request with refreshed credential");
                dispatcher.dispatch(request, Some(&credentials.access_token)).await
            }
            other => other,
        }
    }

    /// Credentials to replay with after `rejected` drew a 401
    ///
    /// Joins a pending refresh if there is one. If the stored credential has
    /// already moved on from `rejected`, returns it without refreshing.
    /// Otherwise starts the refresh every concurrent caller will share.
    ///
    /// # Errors
    /// Returns the shared refresh failure; by then the context has been reset
    /// and `SessionEvent::Expired` emitted. `RefreshError::Cancelled` means
    /// the session was reset or replaced while the exchange ran and nothing
    /// was stored.
    pub async fn recover(&self, rejected: Option<&str>) -> Result<Credentials, RefreshError> {
        let handle = {
            let mut slot = self.in_flight.lock();

            let pending = slot.as_ref().filter(|pending| pending.peek().is_none()).cloned();

            if let Some(pending) = pending {
                debug!("joining in-flight refresh");
                pending
            } else {
                if let Some(current) = self.context.credentials().credentials() {
                    if rejected != Some(current.access_token.as_str()) {
                        debug!("credential already refreshed; skipping exchange");
                        *slot = None;
                        return Ok(current);
                    }
                }

                let handle = self.start_refresh();
                *slot = Some(handle.clone());
                handle
            }
        };

        let outcome = handle.clone().await;

        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&handle)) {
            *slot = None;
        }

        outcome
    }

    /// Whether a refresh is currently pending
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.lock().as_ref().is_some_and(|pending| pending.peek().is_none())
    }

    fn start_refresh(&self) -> RefreshHandle {
        let context = self.context.clone();
        let refresher = Arc::clone(&self.refresher);
        let generation = context.session_generation();

        async move {
            let Some(refresh_token) = context.credentials().refresh_token() else {
                warn!("no refresh credential available");
                context.expire();
                return Err(RefreshError::MissingRefreshToken);
            };

            info!(generation, "refreshing access credential");
            let result = match refresher.refresh(&refresh_token).await {
                Ok(credentials) => {
                    match context.save_refreshed(generation, credentials.clone()) {
                        Ok(true) => Ok(credentials),
                        Ok(false) => Err(RefreshError::Cancelled),
                        Err(e) => Err(RefreshError::Storage(e.to_string())),
                    }
                }
                Err(e) => Err(e),
            };

            match &result {
                Ok(_) => info!("access credential refreshed"),
                // The session already moved on; leave it alone.
                Err(RefreshError::Cancelled) => {
                    info!("discarding refreshed credential for a superseded session");
                }
                Err(e) => {
                    warn!(error = %e, "credential refresh failed");
                    context.expire();
                }
            }

            result
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}
