//! Cache Module
//!
//! Generation-tagged response stores with FIFO eviction and stamp-based expiration.

mod entry;
pub mod eviction;
pub mod expiration;
mod order;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, ResourceResponse, STORED_AT_HEADER};
pub use expiration::{is_expired, is_expired_at, DEFAULT_MAX_AGE};
pub use order::InsertionOrder;
pub use registry::{CacheRegistry, SharedStore, StoreKind};
pub use stats::CacheStats;
pub use store::CacheStore;
