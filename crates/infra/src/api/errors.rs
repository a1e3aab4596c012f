//! API-specific error types
//!
//! Every request-level failure is an [`ApiError`]. The façade maps it once
//! into the closed [`ErrorKind`] plus a user-facing message and never lets it
//! escape.

use std::time::Duration;

use bookdesk_domain::{ErrorKind, ResultEnvelope};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

const NETWORK_MESSAGE: &str = "Unable to reach the server. Check your connection and try again.";
const TIMEOUT_MESSAGE: &str = "The server took too long to respond. Please try again.";
const VALIDATION_MESSAGE: &str = "The request could not be processed.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
const SERVER_MESSAGE: &str = "The server encountered an error. Please try again later.";
const UNEXPECTED_RESPONSE_MESSAGE: &str = "The server returned an unexpected response.";
const STORAGE_MESSAGE: &str = "Your session could not be saved on this device.";

/// API operation errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response reached the client
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Non-success status with the raw response body
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The access credential was rejected and could not be refreshed
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A success response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request could not be built
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local credential storage failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Map a transport failure, naming the configured timeout when it fired.
    pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// HTTP status for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Classify into the closed error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::Config(_) => ErrorKind::Network,
            Self::SessionExpired(_) => ErrorKind::Unauthorized,
            Self::Serialization(_) => ErrorKind::Validation,
            Self::Decode(_) | Self::Storage(_) => ErrorKind::ServerError,
            Self::Status { status, .. } => match *status {
                401 => ErrorKind::Unauthorized,
                403 => ErrorKind::Forbidden,
                404 => ErrorKind::NotFound,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::ServerError,
            },
        }
    }

    /// Message suitable for showing to the user
    ///
    /// Validation and 401 failures prefer the server's own message; every
    /// other kind uses fixed text so transport details never reach the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) | Self::Config(_) => NETWORK_MESSAGE.to_string(),
            Self::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
            Self::SessionExpired(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Serialization(_) => VALIDATION_MESSAGE.to_string(),
            Self::Decode(_) => UNEXPECTED_RESPONSE_MESSAGE.to_string(),
            Self::Storage(_) => STORAGE_MESSAGE.to_string(),
            Self::Status { status, body } => match self.kind() {
                ErrorKind::Validation => {
                    server_message(body).unwrap_or_else(|| VALIDATION_MESSAGE.to_string())
                }
                ErrorKind::Unauthorized => {
                    server_message(body).unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string())
                }
                ErrorKind::Forbidden => FORBIDDEN_MESSAGE.to_string(),
                ErrorKind::NotFound => NOT_FOUND_MESSAGE.to_string(),
                ErrorKind::Network | ErrorKind::ServerError => {
                    tracing::debug!(status, "server failure mapped to generic message");
                    SERVER_MESSAGE.to_string()
                }
            },
        }
    }

    /// Fold into a failed envelope
    pub fn into_envelope<T>(self) -> ResultEnvelope<T> {
        ResultEnvelope::failure(self.kind(), self.user_message())
    }
}

/// Extract the human-readable message from an error body
///
/// Looks at `message` (a string, or an array of strings joined with `", "`)
/// and then `error`.
pub fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let from_message = match value.get("message") {
        Some(Value::String(message)) if !message.trim().is_empty() => Some(message.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    };

    from_message.or_else(|| match value.get("error") {
        Some(Value::String(error)) if !error.trim().is_empty() => Some(error.clone()),
        _ => None,
    })
}
