//! Session operations
//!
//! Login and logout go through the same dispatch path as every other call,
//! so they show up in the loading tracker. Auth endpoints are never
//! refreshed.

use bookdesk_domain::constants::{AUTH_LOGIN_PATH, AUTH_LOGOUT_PATH};
use bookdesk_domain::{Credentials, Identity, LoginRequest, LoginResponse, ResultEnvelope};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::client::ApiClient;
use super::context::SessionEvent;
use super::errors::ApiError;
use super::request::RequestDescriptor;

impl ApiClient {
    /// Sign in with email and password
    ///
    /// On success the credential pair and identity are persisted, cached
    /// responses from any previous session are dropped, and
    /// `SessionEvent::SignedIn` is emitted.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> ResultEnvelope<Identity> {
        match self.try_login(request).await {
            Ok(identity) => {
                info!("signed in");
                self.context.emit(SessionEvent::SignedIn);
                ResultEnvelope::success(identity)
            }
            Err(err) => {
                warn!(error = %err, "sign-in failed");
                err.into_envelope()
            }
        }
    }

    async fn try_login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        let body = json!({ "email": request.email, "password": request.password });
        let value = self.perform(&RequestDescriptor::post(AUTH_LOGIN_PATH, body)).await?;

        let response: LoginResponse =
            serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
        let identity = response
            .user
            .ok_or_else(|| ApiError::Decode("login response did not include the user".into()))?;

        self.context
            .sign_in(
                Credentials::new(response.access_token, response.refresh_token),
                identity.clone(),
            )
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        Ok(identity)
    }

    /// Sign out
    ///
    /// Tells the server with `POST /auth/logout {refreshToken}` on a best
    /// effort basis, then always clears credentials, identity and cache and
    /// emits `SessionEvent::SignedOut`.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ResultEnvelope<()> {
        if let Some(refresh_token) = self.context.credentials().refresh_token() {
            let request =
                RequestDescriptor::post(AUTH_LOGOUT_PATH, json!({ "refreshToken": refresh_token }));
            if let Err(err) = self.perform(&request).await {
                warn!(error = %err, "server-side logout failed; clearing local session anyway");
            }
        }

        self.context.reset();
        self.context.emit(SessionEvent::SignedOut);
        info!("signed out");
        ResultEnvelope::success(())
    }

    /// Whether an access credential is stored
    pub fn is_authenticated(&self) -> bool {
        self.context.credentials().has_credentials()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.context.credentials().identity()
    }
}
