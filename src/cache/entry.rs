//! Cache Entry Module
//!
//! Defines the stored value type and the per-key record with TTL support.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Value ==
/// A scalar cache value: either text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and expiration metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now_ms`.
    ///
    /// Only a positive TTL sets an expiration. Zero, negative and NaN TTLs
    /// produce a permanent entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in (possibly fractional) seconds
    /// * `now_ms` - Write time in Unix milliseconds
    pub fn new(value: Value, ttl_seconds: Option<f64>, now_ms: u64) -> Self {
        let expires_at = ttl_seconds
            .filter(|ttl| *ttl > 0.0)
            .map(|ttl| now_ms.saturating_add(ttl_to_ms(ttl)));

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now_ms`.
    ///
    /// An entry is expired once its expiration lies strictly before `now_ms`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expires_at.is_some_and(|expires| has_expired(expires, now_ms))
    }
}

/// Read-path expiry check. The sweep also takes keys due exactly at `now_ms`.
fn has_expired(expires_at: u64, now_ms: u64) -> bool {
    expires_at < now_ms
}

/// Converts a positive TTL in seconds to whole milliseconds.
fn ttl_to_ms(ttl_seconds: f64) -> u64 {
    // `as` saturates for out-of-range floats
    (ttl_seconds * 1000.0).round() as u64
}
