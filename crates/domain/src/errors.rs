//! Error types used throughout the client core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Bookdesk
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BookdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Bookdesk operations
pub type Result<T> = std::result::Result<T, BookdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = BookdeskError::Config("missing base url".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing base url");
    }

    #[test]
    fn display_includes_category() {
        let err = BookdeskError::Storage("keychain locked".into());
        assert_eq!(err.to_string(), "Storage error: keychain locked");
    }
}
