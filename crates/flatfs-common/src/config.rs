//! Configuration types for flatfs

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Listing proxy configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Maximum age of a cached backend listing (milliseconds)
    pub listing_cache_ttl_ms: u64,
    /// Lifetime of a noted addition or removal (milliseconds); must be at
    /// least `listing_cache_ttl_ms` for a note to survive one cache cycle
    pub note_ttl_ms: u64,
}

/// Default TTL for cached backend listings
pub const DEFAULT_LISTING_CACHE_TTL_MS: u64 = 10_000;

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listing_cache_ttl_ms: DEFAULT_LISTING_CACHE_TTL_MS,
            note_ttl_ms: DEFAULT_LISTING_CACHE_TTL_MS,
        }
    }
}

impl ProxyConfig {
    /// Maximum age of a cached backend listing.
    #[must_use]
    pub fn listing_cache_ttl(&self) -> Duration {
        Duration::milliseconds(self.listing_cache_ttl_ms as i64)
    }

    /// Lifetime of a noted addition or removal.
    #[must_use]
    pub fn note_ttl(&self) -> Duration {
        Duration::milliseconds(self.note_ttl_ms as i64)
    }

    /// Whether notes are guaranteed to outlive at least one listing cycle.
    #[must_use]
    pub fn notes_outlive_listings(&self) -> bool {
        self.note_ttl_ms >= self.listing_cache_ttl_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.listing_cache_ttl_ms, DEFAULT_LISTING_CACHE_TTL_MS);
        assert!(config.notes_outlive_listings());
        assert_eq!(config.listing_cache_ttl(), Duration::seconds(10));
    }

    #[test]
    fn test_config_round_trip() {
        let config = ProxyConfig {
            listing_cache_ttl_ms: 5_000,
            note_ttl_ms: 7_500,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ProxyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_short_note_ttl_flagged() {
        let config = ProxyConfig {
            listing_cache_ttl_ms: 10_000,
            note_ttl_ms: 1_000,
        };
        assert!(!config.notes_outlive_listings());
    }
}
