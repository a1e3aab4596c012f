//! Runtime building blocks for the Bookdesk client core.
//!
//! - [`time`]: injectable clocks (`SystemClock`, `MockClock`)
//! - [`cache`]: generic TTL cache with optional LRU cap and statistics
//! - [`loading`]: keyed in-flight markers with RAII guards
//! - [`security`]: secret storage seam (`SecretStore`) and its backends
//! - [`auth`]: the credential store persisted through a `SecretStore`
//!
//! # Feature Tiers
//!
//! - default: everything except the OS keychain backend
//! - `platform`: adds `security::KeychainProvider` (keyring)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod cache;
pub mod loading;
pub mod security;
pub mod time;

pub use auth::CredentialStore;
pub use cache::{Cache, CacheConfig, CacheStats};
pub use loading::{LoadingGuard, LoadingTracker};
pub use security::{MemorySecretStore, SecretStore, SecretStoreError};
pub use time::{Clock, MockClock, SharedClock, SystemClock};
