//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with an expiry heap for TTL
//! expiration, both lazily on read and eagerly through `drop_expired`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, ExpiryHeap, SystemClock, Value};

// == Cache Store ==
/// Key-value storage with per-entry TTL.
///
/// Every entry with an expiration has exactly one node in `expirations`
/// carrying the same timestamp, and no other key has one.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Keys ordered by expiration time
    expirations: ExpiryHeap,
    /// Performance statistics
    stats: CacheStats,
    /// Time source for stamping and checking expirations
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new empty CacheStore on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new empty CacheStore reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            expirations: ExpiryHeap::new(),
            stats: CacheStats::new(),
            clock,
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// Any previous entry for the key is fully replaced, including its
    /// expiration: a write without a TTL makes the key permanent.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds; zero or negative means none
    pub fn set(&mut self, key: String, value: Value, ttl_seconds: Option<f64>) {
        let entry = CacheEntry::new(value, ttl_seconds, self.clock.now_ms());

        self.expirations.delete(&key);
        if let Some(expires_at) = entry.expires_at {
            self.expirations.insert(key.clone(), expires_at);
        }

        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is missing or expired. Expired entries are
    /// removed on the spot.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired_at(now) {
                self.remove(key);
                self.stats.record_expired();
                self.stats.record_miss();
                debug!(key, "Expired on read");
                return None;
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            Some(value)
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns true if an entry was present. Deleting a missing key is a no-op.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key)
    }

    // == Drop Expired ==
    /// Removes every entry whose expiration is not in the future.
    ///
    /// Walks the heap from its minimum and stops at the first key that
    /// expires after the current time, so the cost is proportional to the
    /// number of removals. A key due exactly now is swept here even though
    /// `get` would still return it for that millisecond.
    /// Returns the number of entries removed.
    pub fn drop_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut removed = 0;

        while let Some(min) = self.expirations.peek_min() {
            if min.expires_at > now {
                break;
            }
            let Some(node) = self.expirations.extract_min() else {
                break;
            };

            self.entries.remove(&node.key);
            debug!(key = %node.key, expires_at = node.expires_at, "Swept expired key");
            removed += 1;
        }

        self.stats.record_swept(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.pending_expirations = self.expirations.len();
        stats
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the expiration of `key` as tracked by the expiry heap.
    pub fn scheduled_expiration(&self, key: &str) -> Option<u64> {
        self.expirations.expires_at(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        self.expirations.delete(key);
        self.entries.remove(key).is_some()
    }

    /// Panics if the entry table and the expiry heap disagree.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.expirations.assert_invariants();

        for (key, entry) in &self.entries {
            assert_eq!(
                self.expirations.expires_at(key),
                entry.expires_at,
                "heap out of sync for {:?}",
                key
            );
        }
        for node in self.expirations.iter() {
            assert!(
                self.entries.contains_key(&node.key),
                "dangling heap node for {:?}",
                node.key
            );
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::time::Duration;

    const START_MS: u64 = 1_700_000_000_000;

    fn test_store() -> (CacheStore, ManualClock) {
        let clock = ManualClock::new(START_MS);
        (CacheStore::with_clock(Arc::new(clock.clone())), clock)
    }

    fn text(s: &str) -> Option<Value> {
        Some(Value::from(s))
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_get_delete() {
        let (mut store, _clock) = test_store();

        store.set("k".to_string(), "v".into(), None);
        assert_eq!(store.get("k"), text("v"));

        assert!(store.delete("k"));
        assert_eq!(store.get("k"), None);
        store.assert_invariants();
    }

    #[test]
    fn test_numeric_value() {
        let (mut store, _clock) = test_store();

        store.set("n".to_string(), Value::Number(3.5), Some(10.0));
        assert_eq!(store.get("n"), Some(Value::Number(3.5)));
    }

    #[test]
    fn test_delete_nonexistent_is_noop() {
        let (mut store, _clock) = test_store();

        assert!(!store.delete("nonexistent"));
        assert!(!store.delete("nonexistent"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_lazy_expiration() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(1.0));
        assert_eq!(store.get("k"), text("v"));

        clock.advance(Duration::from_millis(1_100));

        assert_eq!(store.get("k"), None);
        assert!(store.is_empty());
        assert_eq!(store.scheduled_expiration("k"), None);
        assert_eq!(store.stats().expired, 1);
        store.assert_invariants();
    }

    #[test]
    fn test_alive_at_exact_expiration() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(1.0));
        clock.advance(Duration::from_millis(1_000));
        assert_eq!(store.get("k"), text("v"));

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_drop_expired_keeps_live_keys() {
        let (mut store, clock) = test_store();

        store.set("a".to_string(), "1".into(), Some(1.0));
        store.set("b".to_string(), "2".into(), Some(2.0));
        store.set("c".to_string(), "3".into(), None);
        clock.advance(Duration::from_millis(1_100));

        assert_eq!(store.drop_expired(), 1);

        // Checked via len so lazy expiry cannot mask a missed sweep
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), text("2"));
        assert_eq!(store.get("c"), text("3"));
        store.assert_invariants();
    }

    #[test]
    fn test_drop_expired_is_idempotent() {
        let (mut store, clock) = test_store();

        for i in 0..10 {
            store.set(format!("k{}", i), Value::from(i as i64), Some(1.0 + i as f64));
        }
        clock.advance(Duration::from_millis(5_500));

        assert_eq!(store.drop_expired(), 5);
        assert_eq!(store.drop_expired(), 0);
        assert_eq!(store.len(), 5);
        assert_eq!(store.stats().swept, 5);
    }

    #[test]
    fn test_drop_expired_removes_key_at_exact_expiration() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(1.0));
        store.set("later".to_string(), "v".into(), Some(1.001));
        clock.advance(Duration::from_millis(1_000));

        assert_eq!(store.drop_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.scheduled_expiration("k"), None);
        store.assert_invariants();

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.drop_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_keeps_key_that_sweep_would_take() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(1.0));
        clock.advance(Duration::from_millis(1_000));

        // Reads stay strict at the exact expiration instant
        assert_eq!(store.get("k"), text("v"));
        assert_eq!(store.drop_expired(), 1);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_drop_expired_empty_store() {
        let (mut store, _clock) = test_store();
        assert_eq!(store.drop_expired(), 0);
    }

    #[test]
    fn test_drop_expired_many_keys_same_deadline() {
        let (mut store, clock) = test_store();

        for i in 0..10_000 {
            store.set(format!("k{}", i), "v".into(), Some(1.0));
        }
        clock.advance(Duration::from_secs(2));

        assert_eq!(store.drop_expired(), 10_000);
        assert!(store.is_empty());
        store.assert_invariants();
    }

    #[test]
    fn test_overwrite_without_ttl_makes_key_permanent() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(1.0));
        store.set("k".to_string(), "v2".into(), None);
        assert_eq!(store.scheduled_expiration("k"), None);

        clock.advance(Duration::from_millis(1_100));
        assert_eq!(store.drop_expired(), 0);
        assert_eq!(store.get("k"), text("v2"));
        store.assert_invariants();
    }

    #[test]
    fn test_overwrite_with_new_ttl_replaces_deadline() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(1.0));
        store.set("k".to_string(), "v2".into(), Some(10.0));
        assert_eq!(store.scheduled_expiration("k"), Some(START_MS + 10_000));
        store.assert_invariants();

        clock.advance(Duration::from_millis(1_100));
        assert_eq!(store.drop_expired(), 0);
        assert_eq!(store.get("k"), text("v2"));
    }

    #[test]
    fn test_overwrite_shortens_ttl() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(60.0));
        store.set("k".to_string(), "v2".into(), Some(1.0));

        clock.advance(Duration::from_millis(1_100));
        assert_eq!(store.drop_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_ttl_is_permanent() {
        let (mut store, clock) = test_store();

        store.set("k".to_string(), "v".into(), Some(0.0));
        clock.advance(Duration::from_secs(3_600));

        assert_eq!(store.drop_expired(), 0);
        assert_eq!(store.get("k"), text("v"));
    }

    #[test]
    fn test_stats() {
        let (mut store, _clock) = test_store();

        store.set("key1".to_string(), "value1".into(), Some(30.0));
        store.set("key2".to_string(), "value2".into(), None);
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.pending_expirations, 1);
    }
}
