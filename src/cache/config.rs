//! Resource cache configuration.

use std::time::Duration;

/// Configuration for a persisted resource cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age after which a cached collection is stale and must be re-fetched.
    pub ttl: Duration,

    /// Capacity of the in-process decoded layer.
    /// Each resource type uses a single slot, so this rarely matters.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600), // 10 minutes
            max_capacity: 16,
        }
    }
}

impl CacheConfig {
    /// Create a config with the given time-to-live.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Default::default()
        }
    }

    /// Set time-to-live (builder pattern).
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the decoded-layer capacity (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Product catalogue: 10 minutes.
    pub fn products() -> Self {
        Self::with_ttl(Duration::from_secs(600))
    }

    /// Product catalogue as cached by older clients: 1 hour.
    pub fn legacy_products() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Categories change rarely but are cheap to reload: 10 minutes.
    pub fn categories() -> Self {
        Self::with_ttl(Duration::from_secs(600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(CacheConfig::products().ttl, Duration::from_secs(600));
        assert_eq!(CacheConfig::categories().ttl, Duration::from_secs(600));
        assert_eq!(CacheConfig::legacy_products().ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_builder_overrides() {
        let config = CacheConfig::default()
            .ttl(Duration::from_millis(500))
            .max_capacity(2);
        assert_eq!(config.ttl, Duration::from_millis(500));
        assert_eq!(config.max_capacity, 2);
    }
}
