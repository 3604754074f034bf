//! Cache Module
//!
//! Provides an in-memory key-value store with TTL expiration backed by an
//! indexed min-heap of expiration times.

mod clock;
mod entry;
mod heap;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, Value};
pub use heap::{ExpiryHeap, HeapNode};
pub use stats::CacheStats;
pub use store::CacheStore;
