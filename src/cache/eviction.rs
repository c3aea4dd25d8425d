//! Eviction Engine
//!
//! Trims a bounded store down to its cap, oldest insertion first.

use tracing::debug;

use crate::cache::CacheStore;

/// Deletes the oldest keys until the store is within its cap.
///
/// Unbounded stores are left alone. Removal order is strictly FIFO by
/// first insertion; reads never affect it. Returns the number of evicted
/// entries.
pub fn trim(store: &mut CacheStore) -> usize {
    let Some(max_items) = store.max_items() else {
        return 0;
    };

    let mut evicted = 0;
    while store.len() > max_items {
        if store.evict_oldest().is_none() {
            break;
        }
        evicted += 1;
    }

    if evicted > 0 {
        debug!(store = store.name(), evicted, "Trimmed store to cap");
    }
    evicted
}
