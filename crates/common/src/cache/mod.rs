//! Generic TTL cache
//!
//! Thread-safe keyed store of `{value, stored_at, expires_at}` entries. An entry
//! is only returned while `now < expires_at`; reading it later evicts it and
//! reports a miss. Entries can be removed in bulk with a key predicate, which is
//! how the API layer invalidates a whole resource after a mutation.
//!
//! # Examples
//!
//! ## TTL-based cache
//! ```
//! use std::time::Duration;
//!
//! use bookdesk_common::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, String> = Cache::new(CacheConfig::ttl(Duration::from_secs(300)));
//! cache.insert("bookings".to_string(), "[]".to_string());
//! assert_eq!(cache.get(&"bookings".to_string()), Some("[]".to_string()));
//! ```
//!
//! ## Per-entry TTL and predicate invalidation
//! ```
//! use std::time::Duration;
//!
//! use bookdesk_common::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, i32> = Cache::new(CacheConfig::default());
//! cache.insert_with_ttl("users/1".to_string(), 1, Some(Duration::from_secs(60)));
//! cache.insert_with_ttl("users/2".to_string(), 2, None);
//! cache.insert("services/9".to_string(), 9);
//!
//! assert_eq!(cache.remove_where(|key| key.starts_with("users/")), 2);
//! assert_eq!(cache.len(), 1);
//! ```
//!
//! # Size bound
//!
//! With no `max_size` the cache grows without limit; setting one turns on
//! least-recently-used eviction for long-lived hosts.

mod config;
mod core;
mod stats;

// Re-export public API
pub use core::Cache;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use stats::CacheStats;
