//! Heapcache - A lightweight in-memory key-value cache server
//!
//! Stores text or numeric values with optional per-key TTL. Expirations are
//! tracked in an indexed min-heap and enforced both on read and by a sweep.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
