//! Conversions from external infrastructure errors into domain errors.

use bookdesk_common::security::SecretStoreError;
use bookdesk_domain::BookdeskError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BookdeskError);

impl From<InfraError> for BookdeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BookdeskError> for InfraError {
    fn from(value: BookdeskError) -> Self {
        InfraError(value)
    }
}

trait IntoBookdeskError {
    fn into_bookdesk(self) -> BookdeskError;
}

/* -------------------------------------------------------------------------- */
/* SecretStoreError → BookdeskError */
/* -------------------------------------------------------------------------- */

impl IntoBookdeskError for SecretStoreError {
    fn into_bookdesk(self) -> BookdeskError {
        match self {
            SecretStoreError::NotFound => {
                BookdeskError::NotFound("secret store entry not found".into())
            }
            SecretStoreError::AccessFailed(message) => {
                BookdeskError::Storage(format!("unable to access secure storage: {message}"))
            }
            SecretStoreError::Serialization(err) => {
                BookdeskError::Storage(format!("stored record is malformed: {err}"))
            }
        }
    }
}

impl From<SecretStoreError> for InfraError {
    fn from(value: SecretStoreError) -> Self {
        InfraError(value.into_bookdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BookdeskError */
/* -------------------------------------------------------------------------- */

impl IntoBookdeskError for HttpError {
    fn into_bookdesk(self) -> BookdeskError {
        if self.is_builder() {
            return BookdeskError::Config(format!("invalid HTTP client configuration: {self}"));
        }

        if self.is_timeout() {
            return BookdeskError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return BookdeskError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => BookdeskError::Auth(message),
                404 => BookdeskError::NotFound(message),
                400..=499 => BookdeskError::InvalidInput(message),
                _ => BookdeskError::Network(message),
            };
        }

        BookdeskError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_bookdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
