//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, DropExpiredResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// The store and its expiry heap sit behind one lock, so a handler and the
/// background sweep never observe one without the other.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }
}

/// Handler for POST /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let response = SetResponse::new(req.key.clone(), &req.value);

    let mut cache = state.cache.write().await;
    cache.set(req.key, req.value, req.ttl_seconds);

    Ok(Json(response))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a read may expire the entry
    let mut cache = state.cache.write().await;
    let value = cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /delete/:key
///
/// Deletes a key from the cache. Deleting a missing key still succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let mut cache = state.cache.write().await;
    if !cache.delete(&key) {
        debug!(key = %key, "Delete of missing key");
    }

    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /dropExpired
///
/// Runs one full expiry sweep.
pub async fn drop_expired_handler(State(state): State<AppState>) -> Json<DropExpiredResponse> {
    let removed = state.cache.write().await.drop_expired();

    Json(DropExpiredResponse::new(removed))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;

    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
