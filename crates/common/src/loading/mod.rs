//! In-flight operation tracking
//!
//! A keyed set of busy markers the UI polls to show per-endpoint spinners.
//! `begin`/`end` are idempotent set operations; [`LoadingGuard`] ties one
//! `begin` to exactly one `end` on every exit path, including early returns,
//! panics and dropped futures.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

/// Keyed set of in-flight operation markers
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct LoadingTracker {
    active: Arc<RwLock<HashSet<String>>>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight. Marking an already-busy key is a no-op.
    pub fn begin(&self, key: impl Into<String>) {
        let key = key.into();
        trace!(key = %key, "loading begin");
        self.active.write().insert(key);
    }

    /// Clear the marker for `key`. Clearing an idle key is a no-op.
    pub fn end(&self, key: &str) {
        trace!(key = %key, "loading end");
        self.active.write().remove(key);
    }

    /// Mark `key` busy until the returned guard is dropped
    #[must_use = "the key is cleared as soon as the guard is dropped"]
    pub fn guard(&self, key: impl Into<String>) -> LoadingGuard {
        let key = key.into();
        self.begin(key.clone());
        LoadingGuard { tracker: self.clone(), key }
    }

    /// Whether any in-flight key starts with `prefix`
    ///
    /// `is_busy("/bookings")` is true while `/bookings` or `/bookings/42` is
    /// being fetched or mutated.
    pub fn is_busy(&self, prefix: &str) -> bool {
        self.active.read().iter().any(|key| key.starts_with(prefix))
    }

    pub fn is_any_busy(&self) -> bool {
        !self.active.read().is_empty()
    }

    /// Snapshot of in-flight keys, sorted
    pub fn active_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.active.read().iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every marker
    pub fn clear(&self) {
        self.active.write().clear();
    }
}

/// Scoped busy marker; ends its key on drop
#[derive(Debug)]
pub struct LoadingGuard {
    tracker: LoadingTracker,
    key: String,
}

impl LoadingGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.tracker.end(&self.key);
    }
}
