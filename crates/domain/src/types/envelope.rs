//! Uniform result envelope
//!
//! Every client operation returns a [`ResultEnvelope`]; callers never see
//! transport errors directly.

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Closed classification of failed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response reached the client (DNS, refused connection, timeout)
    Network,
    /// 400/422 and other client-side rejections
    Validation,
    /// 401 that could not be recovered by refreshing credentials
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 5xx and unexpected responses
    ServerError,
}

impl_domain_status_conversions!(ErrorKind {
    Network => "network",
    Validation => "validation",
    Unauthorized => "unauthorized",
    Forbidden => "forbidden",
    NotFound => "not_found",
    ServerError => "server_error",
});

/// `{ success, data?, error? }` wrapper returned by every client operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> ResultEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, kind: None }
    }

    pub fn failure(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), kind: Some(kind) }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Convert into a standard `Result`, pairing the kind with the message.
    pub fn into_result(self) -> Result<Option<T>, (ErrorKind, String)> {
        if self.success {
            Ok(self.data)
        } else {
            Err((
                self.kind.unwrap_or(ErrorKind::ServerError),
                self.error.unwrap_or_default(),
            ))
        }
    }

    pub fn map<U, F>(self, f: F) -> ResultEnvelope<U>
    where
        F: FnOnce(T) -> U,
    {
        ResultEnvelope {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            kind: self.kind,
        }
    }
}
