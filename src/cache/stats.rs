//! Cache Statistics Module
//!
//! Tracks read outcomes and how entries left the cache through expiration.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that found nothing (missing or expired)
    pub misses: u64,
    /// Number of entries removed lazily when a read found them expired
    pub expired: u64,
    /// Number of entries removed by the eager sweep
    pub swept: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current number of entries scheduled to expire
    pub pending_expirations: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expired ==
    /// Counts an entry found expired on read.
    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    // == Record Swept ==
    /// Counts `count` entries removed by one sweep pass.
    pub fn record_swept(&mut self, count: usize) {
        self.swept += count as u64;
    }
}
