//! Cached backend listing state and proxy counters

use chrono::{DateTime, Duration, Utc};
use flatfs_common::ObjectRecord;
use std::sync::atomic::{AtomicU64, Ordering};

/// One validated backend listing, timestamped at acquisition.
#[derive(Clone, Debug)]
pub struct CachedListing {
    /// Objects returned by the backend, placeholder already dropped.
    pub objects: Vec<ObjectRecord>,
    /// Immediate sub-directory names returned by the backend.
    pub subdirs: Vec<String>,
    /// When the listing was acquired.
    pub acquired_at: DateTime<Utc>,
}

impl CachedListing {
    /// Whether the listing is still usable at `now` under `ttl`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.acquired_at) <= ttl
    }
}

/// Proxy counters for monitoring
#[derive(Debug, Default)]
pub struct ProxyStats {
    /// Listings served from the cache without a backend call
    pub cache_hits: AtomicU64,
    /// Listing requests issued to the backend
    pub backend_fetches: AtomicU64,
    /// Mutation notes accepted into the ledger
    pub notes_applied: AtomicU64,
    /// Ledger entries reaped after their TTL
    pub entries_expired: AtomicU64,
}

impl ProxyStats {
    /// Fraction of listings served from cache (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f64;
        let fetches = self.backend_fetches.load(Ordering::Relaxed) as f64;
        let total = hits + fetches;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.backend_fetches.store(0, Ordering::Relaxed);
        self.notes_applied.store(0, Ordering::Relaxed);
        self.entries_expired.store(0, Ordering::Relaxed);
    }
}
