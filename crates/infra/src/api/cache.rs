//! Response cache
//!
//! Decoded GET bodies keyed by `(method, path, serialized params)`. Mutations
//! invalidate by resource prefix, the first path segment.

use std::time::Duration;

use bookdesk_common::cache::{Cache, CacheConfig, CacheStats};
use bookdesk_common::time::SharedClock;
use serde_json::Value;
use tracing::debug;

use super::request::{HttpVerb, RequestDescriptor};

/// Cache key for one GET
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: HttpVerb,
    pub path: String,
    pub params: String,
}

impl CacheKey {
    pub fn new(method: HttpVerb, path: impl Into<String>, params: impl Into<String>) -> Self {
        Self { method, path: path.into(), params: params.into() }
    }

    pub fn for_request(request: &RequestDescriptor) -> Self {
        Self::new(request.verb, request.path.clone(), request.options.serialized_params())
    }

    pub fn resource(&self) -> &str {
        resource_prefix(&self.path)
    }
}

/// First non-empty path segment, ignoring any query string
///
/// `/bookings/42?x=1` → `bookings`
pub fn resource_prefix(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    path.split('/').find(|segment| !segment.is_empty()).unwrap_or("")
}

/// TTL cache of decoded response bodies
///
/// Clones share entries.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<CacheKey, Value, SharedClock>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(default_ttl: Duration, max_entries: Option<usize>, clock: SharedClock) -> Self {
        let mut config = CacheConfig::builder().default_ttl(default_ttl).track_metrics(true);
        if let Some(max_entries) = max_entries {
            config = config.max_size(max_entries);
        }
        Self { inner: Cache::with_clock(config.build(), clock), default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Live value for `key`; an expired entry is evicted and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let hit = self.inner.get(key);
        debug!(path = %key.path, params = %key.params, hit = hit.is_some(), "response cache lookup");
        hit
    }

    /// Store `value` until `now + ttl` (configured default when `None`)
    pub fn set(&self, key: CacheKey, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.inner.insert_with_ttl(key, value, Some(ttl));
    }

    /// Remove every entry belonging to the resource named by `resource`
    ///
    /// Accepts a bare name (`bookings`) or any path under it
    /// (`/bookings/42`). Returns the number of entries removed.
    pub fn invalidate_prefix(&self, resource: &str) -> usize {
        let resource = resource_prefix(resource);
        if resource.is_empty() {
            return 0;
        }

        let removed = self.inner.remove_where(|key| key.resource() == resource);
        debug!(resource = %resource, removed, "response cache invalidated");
        removed
    }

    pub fn clear_all(&self) {
        self.inner.clear();
        debug!("response cache cleared");
    }

    /// Drop expired entries; returns how many were removed
    pub fn sweep(&self) -> usize {
        self.inner.cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.inner.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
