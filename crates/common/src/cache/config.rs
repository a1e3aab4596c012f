//! Cache configuration types and builder

use std::time::Duration;

/// Configuration for cache behavior
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited). When reached, the least
    /// recently used entry is evicted.
    pub max_size: Option<usize>,

    /// TTL applied by [`Cache::insert`](super::Cache::insert) (None = no expiration)
    pub default_ttl: Option<Duration>,

    /// Whether to collect hit/miss/eviction counters
    pub track_metrics: bool,
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for an unbounded TTL cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use bookdesk_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(300));
    /// assert!(config.max_size.is_none());
    /// ```
    pub fn ttl(duration: Duration) -> Self {
        Self { max_size: None, default_ttl: Some(duration), track_metrics: false }
    }

    /// Combined TTL + LRU cap
    pub fn ttl_lru(ttl: Duration, max_size: usize) -> Self {
        Self { max_size: Some(max_size), default_ttl: Some(ttl), track_metrics: false }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set maximum number of entries
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = Some(size);
        self
    }

    /// Set the default time-to-live for entries
    pub fn default_ttl(mut self, duration: Duration) -> Self {
        self.config.default_ttl = Some(duration);
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
