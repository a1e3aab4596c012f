//! Core cache implementation with per-entry TTL and optional LRU cap

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::CacheConfig;
use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

/// Entry stored in the cache
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

#[derive(Debug)]
struct CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    entries: HashMap<K, CacheEntry<V>>,
    /// Least recently used first; only maintained when a size cap is set
    access_order: Vec<K>,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self { entries: HashMap::new(), access_order: Vec::new() }
    }

    fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        self.access_order.retain(|k| k != key);
        self.entries.remove(key)
    }

    fn touch(&mut self, key: &K) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
    }
}

/// Generic thread-safe cache with TTL expiry
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// Clones share storage and metrics.
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage::new())),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Insert a value using the configured default TTL
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert a value that expires `ttl` after now (`None` = never expires)
    ///
    /// Replaces any existing entry for the key. If the cache is at capacity,
    /// the least recently used entry is evicted first.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        if let Some(max_size) = self.config.max_size {
            if storage.entries.len() >= max_size && !storage.entries.contains_key(&key) {
                self.evict_one(&mut storage);
            }
        }

        let expires_at = ttl.map(|ttl| now + ttl);
        storage.entries.insert(key.clone(), CacheEntry { value, stored_at: now, expires_at });

        if self.config.max_size.is_some() {
            storage.touch(&key);
        }

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }

    /// Get a live value
    ///
    /// Returns `None` if the key doesn't exist. An expired entry is evicted
    /// and also reported as `None`.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        let expired = match storage.entries.get(key) {
            None => {
                if self.config.track_metrics {
                    self.metrics.record_miss();
                }
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            storage.remove(key);
            if self.config.track_metrics {
                self.metrics.record_miss();
                self.metrics.record_expirations(1);
            }
            return None;
        }

        let value = storage.entries.get(key).map(|entry| entry.value.clone());
        if self.config.max_size.is_some() {
            storage.touch(key);
        }

        if self.config.track_metrics {
            self.metrics.record_hit();
        }

        value
    }

    /// Check for a live entry without touching LRU order or metrics
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.storage.read().entries.get(key).is_some_and(|entry| !entry.is_expired(now))
    }

    /// Time since a live entry was stored
    pub fn age(&self, key: &K) -> Option<Duration> {
        let now = self.clock.now();
        self.storage
            .read()
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| now.duration_since(entry.stored_at))
    }

    /// Remove a value from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.storage.write().remove(key).map(|e| e.value);
        if removed.is_some() && self.config.track_metrics {
            self.metrics.record_invalidations(1);
        }
        removed
    }

    /// Remove every entry whose key matches the predicate
    ///
    /// Returns the number of entries removed.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut storage = self.storage.write();
        let keys: Vec<K> = storage.entries.keys().filter(|k| predicate(k)).cloned().collect();

        for key in &keys {
            storage.remove(key);
        }

        if self.config.track_metrics {
            self.metrics.record_invalidations(keys.len() as u64);
        }

        keys.len()
    }

    /// Clear all entries from the cache
    ///
    /// Counters survive; the dropped entries count as invalidations.
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        let removed = storage.entries.len();
        storage.entries.clear();
        storage.access_order.clear();

        if self.config.track_metrics {
            self.metrics.record_invalidations(removed as u64);
        }
    }

    /// Zero every counter without touching the entries
    pub fn reset_stats(&self) {
        self.metrics.reset();
    }

    /// Get the current number of entries (expired entries included until swept)
    pub fn len(&self) -> usize {
        self.storage.read().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        let keys: Vec<K> = storage
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &keys {
            storage.remove(key);
        }

        if self.config.track_metrics {
            self.metrics.record_expirations(keys.len() as u64);
        }

        keys.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len(), self.config.max_size)
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn evict_one(&self, storage: &mut CacheStorage<K, V>) {
        if let Some(key) = storage.access_order.first().cloned() {
            storage.remove(&key);

            if self.config.track_metrics {
                self.metrics.record_eviction();
            }
        }
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::time::MockClock;

    fn ttl_cache(secs: u64) -> (Cache<String, i32, MockClock>, MockClock) {
        let clock = MockClock::new();
        let config = CacheConfig::builder()
            .default_ttl(Duration::from_secs(secs))
            .track_metrics(true)
            .build();
        (Cache::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache: Cache<String, i32> = Cache::new(CacheConfig::default());

        cache.insert("key1".to_string(), 42);
        cache.insert("key2".to_string(), 84);

        assert_eq!(cache.get(&"key1".to_string()), Some(42));
        assert_eq!(cache.get(&"key2".to_string()), Some(84));
        assert_eq!(cache.get(&"key3".to_string()), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_update_replaces_value() {
        let cache: Cache<String, i32> = Cache::new(CacheConfig::default());

        cache.insert("key".to_string(), 42);
        cache.insert("key".to_string(), 84);

        assert_eq!(cache.get(&"key".to_string()), Some(84));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_live_until_just_before_expiry() {
        let (cache, clock) = ttl_cache(10);
        cache.insert("key".to_string(), 42);

        clock.advance(Duration::from_millis(9_999));

        assert_eq!(cache.get(&"key".to_string()), Some(42));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_expires_exactly_at_ttl() {
        let (cache, clock) = ttl_cache(10);
        cache.insert("key".to_string(), 42);

        clock.advance(Duration::from_secs(10));

        assert_eq!(cache.get(&"key".to_string()), None);
        assert_eq!(cache.len(), 0, "expired read must evict");

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_per_entry_ttl_overrides_default() {
        let (cache, clock) = ttl_cache(10);
        cache.insert_with_ttl("short".to_string(), 1, Some(Duration::from_secs(2)));
        cache.insert_with_ttl("forever".to_string(), 2, None);
        cache.insert("default".to_string(), 3);

        clock.advance_secs(5);
        assert_eq!(cache.get(&"short".to_string()), None);
        assert_eq!(cache.get(&"default".to_string()), Some(3));

        clock.advance_secs(3600);
        assert_eq!(cache.get(&"default".to_string()), None);
        assert_eq!(cache.get(&"forever".to_string()), Some(2));
    }

    #[test]
    fn test_contains_key_ignores_expired_entries() {
        let (cache, clock) = ttl_cache(1);
        cache.insert("key".to_string(), 1);
        assert!(cache.contains_key(&"key".to_string()));

        clock.advance_secs(1);
        assert!(!cache.contains_key(&"key".to_string()));
    }

    #[test]
    fn test_age_tracks_time_since_store() {
        let (cache, clock) = ttl_cache(60);
        cache.insert("key".to_string(), 1);
        clock.advance_secs(12);

        assert_eq!(cache.age(&"key".to_string()), Some(Duration::from_secs(12)));
        assert_eq!(cache.age(&"missing".to_string()), None);
    }

    #[test]
    fn test_remove_where_drops_matching_keys() {
        let (cache, _clock) = ttl_cache(60);
        cache.insert("bookings?page=1".to_string(), 1);
        cache.insert("bookings?page=2".to_string(), 2);
        cache.insert("services".to_string(), 3);

        let removed = cache.remove_where(|k| k.starts_with("bookings"));

        assert_eq!(removed, 2);
        assert_eq!(cache.get(&"services".to_string()), Some(3));
        assert_eq!(cache.stats().invalidations, 2);
    }

    #[test]
    fn test_cache_remove_and_clear() {
        let cache: Cache<String, i32> = Cache::new(CacheConfig::default());
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.remove(&"a".to_string()), Some(1));
        assert_eq!(cache.remove(&"a".to_string()), None);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_keeps_counters() {
        let (cache, _clock) = ttl_cache(60);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.get(&"a".to_string());
        cache.get(&"missing".to_string());

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!((stats.hits, stats.misses, stats.inserts), (1, 1, 2));
        assert_eq!(stats.invalidations, 2);

        cache.reset_stats();
        assert_eq!(cache.stats().total_accesses(), 0);
    }

    #[test]
    fn test_cleanup_expired_sweeps_only_dead_entries() {
        let (cache, clock) = ttl_cache(10);
        cache.insert("old1".to_string(), 1);
        cache.insert("old2".to_string(), 2);
        clock.advance_secs(6);
        cache.insert("fresh".to_string(), 3);
        clock.advance_secs(5);

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"fresh".to_string()), Some(3));
    }

    #[test]
    fn test_lru_cap_evicts_least_recently_used() {
        let cache: Cache<String, i32> =
            Cache::new(CacheConfig::builder().max_size(2).track_metrics(true).build());

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        let _ = cache.get(&"a".to_string());
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
        assert_eq!(cache.get(&"c".to_string()), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_unbounded_cache_never_evicts() {
        let cache: Cache<u32, u32> = Cache::new(CacheConfig::default());
        for i in 0..500 {
            cache.insert(i, i);
        }
        assert_eq!(cache.len(), 500);
    }

    #[test]
    fn test_cache_thread_safety() {
        let cache = Arc::new(Cache::new(CacheConfig::default()));
        let mut handles = vec![];

        for i in 0..10 {
            let cache_clone = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..10 {
                    cache_clone.insert(format!("key-{i}-{j}"), i * 10 + j);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn test_cache_clone_shares_storage() {
        let cache1: Cache<String, i32> = Cache::new(CacheConfig::default());
        cache1.insert("key".to_string(), 42);

        let cache2 = cache1.clone();
        assert_eq!(cache2.get(&"key".to_string()), Some(42));

        cache2.insert("key2".to_string(), 84);
        assert_eq!(cache1.get(&"key2".to_string()), Some(84));
    }
}
