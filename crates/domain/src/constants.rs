//! Domain constants
//!
//! Fixed endpoint paths, storage keys and defaults shared by every crate.

use std::time::Duration;

// Authentication endpoints (exempt from refresh-and-replay)
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const AUTH_REFRESH_PATH: &str = "/auth/refresh";
pub const AUTH_LOGOUT_PATH: &str = "/auth/logout";

// Persisted state layout
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const IDENTITY_KEY: &str = "current_user";

// Defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "bookdesk";

/// Default time-to-live for cached GET responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);

/// Returns `true` when `path` targets one of the authentication endpoints.
///
/// Login matches by prefix (`/auth/login`, `/auth/login/google`, ...); refresh and
/// logout match exactly. Query strings are ignored.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path.starts_with(AUTH_LOGIN_PATH) || path == AUTH_REFRESH_PATH || path == AUTH_LOGOUT_PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_auth_endpoints() {
        assert!(is_auth_endpoint("/auth/login"));
        assert!(is_auth_endpoint("/auth/login/google"));
        assert!(is_auth_endpoint("/auth/refresh"));
        assert!(is_auth_endpoint("/auth/logout?all=true"));
    }

    #[test]
    fn resource_paths_are_not_auth_endpoints() {
        assert!(!is_auth_endpoint("/bookings"));
        assert!(!is_auth_endpoint("/auth/me"));
        assert!(!is_auth_endpoint("/users/auth/refresh"));
    }
}
