//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, Value};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (POST /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Confirmation message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, value: &Value) -> Self {
        let key = key.into();
        Self {
            message: format!("Key {} set to {}", key, value),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /delete/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Confirmation message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key {} deleted", key),
            key,
        }
    }
}

/// Response body for the sweep endpoint (DELETE /dropExpired)
#[derive(Debug, Clone, Serialize)]
pub struct DropExpiredResponse {
    /// Confirmation message
    pub message: String,
    /// Number of entries removed by this sweep
    pub removed: usize,
}

impl DropExpiredResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: "Removed all expired keys".to_string(),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that found nothing
    pub misses: u64,
    /// Entries removed on read after expiring
    pub expired: u64,
    /// Entries removed by the expiry sweep
    pub swept: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Entries currently scheduled to expire
    pub pending_expirations: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            swept: stats.swept,
            total_entries: stats.total_entries,
            pending_expirations: stats.pending_expirations,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("count", Value::Number(3.0));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "count");
        assert_eq!(json["value"], 3.0);
    }

    #[test]
    fn test_set_response_message() {
        let resp = SetResponse::new("key1", &Value::from("value1"));
        assert_eq!(resp.message, "Key key1 set to value1");
    }

    #[test]
    fn test_delete_response_message() {
        let resp = DeleteResponse::new("key1");
        assert_eq!(resp.message, "Key key1 deleted");
    }

    #[test]
    fn test_drop_expired_response_serialize() {
        let json = serde_json::to_value(DropExpiredResponse::new(4)).unwrap();
        assert_eq!(json["message"], "Removed all expired keys");
        assert_eq!(json["removed"], 4);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
