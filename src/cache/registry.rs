//! Store Registry Module
//!
//! Owns every named, generation-tagged store.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStore};

/// Shared handle to a single store. All mutations go through its write lock.
pub type SharedStore = Arc<RwLock<CacheStore>>;

// == Store Kind ==
/// The four stores the manager writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Fixed seed list written at install
    Install,
    /// Navigation documents, scripts and styles
    Runtime,
    Image,
    Font,
}

impl StoreKind {
    pub const ALL: [StoreKind; 4] = [
        StoreKind::Install,
        StoreKind::Runtime,
        StoreKind::Image,
        StoreKind::Font,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Install => "precache",
            StoreKind::Runtime => "runtime",
            StoreKind::Image => "images",
            StoreKind::Font => "fonts",
        }
    }

    /// Builds `"{prefix}-{kind}-{generation}"`.
    pub fn store_name(&self, prefix: &str, generation: &str) -> String {
        format!("{}-{}-{}", prefix, self.as_str(), generation)
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Registry ==
/// Collection of named stores, enumerable in creation order.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    stores: RwLock<Vec<(String, SharedStore)>>,
    quota_bytes: Option<usize>,
}

impl CacheRegistry {
    pub fn new(quota_bytes: Option<usize>) -> Self {
        Self {
            stores: RwLock::new(Vec::new()),
            quota_bytes,
        }
    }

    // == Open ==
    /// Returns the named store, creating it on first use.
    pub async fn open(&self, name: &str, max_items: Option<usize>) -> SharedStore {
        if let Some(store) = self.get(name).await {
            return store;
        }

        let mut stores = self.stores.write().await;
        // Another task may have created it between the two locks
        if let Some((_, store)) = stores.iter().find(|(n, _)| n == name) {
            return store.clone();
        }

        debug!(store = name, ?max_items, "Creating store");
        let store = Arc::new(RwLock::new(
            CacheStore::new(name, max_items).with_quota(self.quota_bytes),
        ));
        stores.push((name.to_string(), store.clone()));
        store
    }

    // == Get ==
    /// Returns the named store without creating it.
    pub async fn get(&self, name: &str) -> Option<SharedStore> {
        self.stores
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, store)| store.clone())
    }

    /// All store names in creation order.
    pub async fn names(&self) -> Vec<String> {
        self.stores
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    // == Delete ==
    /// Drops the named store and all of its entries.
    pub async fn delete(&self, name: &str) -> bool {
        let mut stores = self.stores.write().await;
        let before = stores.len();
        stores.retain(|(n, _)| n != name);

        let removed = stores.len() != before;
        if removed {
            info!(store = name, "Deleted store");
        }
        removed
    }

    // == Match Any ==
    /// Looks `key` up in each of `names`, in order, returning the first hit.
    ///
    /// Only the listed stores are consulted, so callers restrict reads to
    /// their own generation. Stores that do not exist yet are skipped. A hit
    /// is charged to the store that answered; a miss is charged once, to the
    /// first listed store that exists.
    pub async fn match_any(&self, names: &[String], key: &str) -> Option<CacheEntry> {
        let mut first = None;
        for name in names {
            let Some(store) = self.get(name).await else {
                continue;
            };
            let found = store.read().await.peek(key);
            if let Some(entry) = found {
                store.write().await.record_lookup(true);
                return Some(entry);
            }
            first.get_or_insert(store);
        }

        if let Some(store) = first {
            store.write().await.record_lookup(false);
        }
        None
    }
}
