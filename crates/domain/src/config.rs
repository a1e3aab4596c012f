//! Client configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::{BookdeskError, Result};

/// Configuration for the authenticated API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is relative to (e.g. "https://api.bookdesk.io/v1")
    pub base_url: String,
    /// Fixed per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Default TTL for cached GET responses
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Optional LRU cap on cached responses (unbounded when absent)
    #[serde(default)]
    pub cache_max_entries: Option<usize>,
    /// Keychain service namespace for persisted credentials
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_keychain_service() -> String {
    DEFAULT_KEYCHAIN_SERVICE.to_string()
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_max_entries: None,
            keychain_service: default_keychain_service(),
            user_agent: None,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Base URL without trailing slashes, ready for `format!("{base}{path}")`.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `BookdeskError::Config` if the base URL is empty, not an absolute
    /// http(s) URL, or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(BookdeskError::Config("base_url must not be empty".into()));
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| BookdeskError::Config(format!("Invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BookdeskError::Config(format!(
                "Unsupported base_url scheme: {}",
                parsed.scheme()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(BookdeskError::Config("request_timeout_secs must be positive".into()));
        }

        Ok(())
    }
}
