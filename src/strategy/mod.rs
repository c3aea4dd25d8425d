//! Strategy Module
//!
//! The five request-handling algorithms and the context they share.

mod cache_first;
mod fetch;
mod network_first;
mod stale_while_revalidate;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::{eviction, CacheEntry, CacheRegistry, ResourceResponse, StoreKind};
use crate::error::Result;
use crate::policy::{InterceptedRequest, Strategy};
use crate::tasks::BackgroundTasks;

pub use cache_first::{cache_first_permanent, cache_first_revalidate};
pub use fetch::{Fetcher, HttpFetcher};
pub use network_first::{network_first, network_first_with_fallback};
pub use stale_while_revalidate::stale_while_revalidate;

#[cfg(test)]
pub(crate) use fetch::test_support;

// == Store Layout ==
/// Names and caps of the current generation's stores.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    pub prefix: String,
    pub generation: String,
    pub runtime_max_items: usize,
    pub image_max_items: usize,
}

impl StoreLayout {
    pub fn name(&self, kind: StoreKind) -> String {
        kind.store_name(&self.prefix, &self.generation)
    }

    /// Item cap per store; install and font stores are unbounded.
    pub fn max_items(&self, kind: StoreKind) -> Option<usize> {
        match kind {
            StoreKind::Runtime => Some(self.runtime_max_items),
            StoreKind::Image => Some(self.image_max_items),
            StoreKind::Install | StoreKind::Font => None,
        }
    }

    /// Current-generation store names, in lookup order.
    pub fn names(&self) -> Vec<String> {
        StoreKind::ALL.iter().map(|kind| self.name(*kind)).collect()
    }

    /// True when `name` belongs to the current generation.
    pub fn owns(&self, name: &str) -> bool {
        StoreKind::ALL.iter().any(|kind| self.name(*kind) == name)
    }
}

// == Strategy Context ==
/// Everything a strategy reads or writes. Cheap to clone.
#[derive(Clone)]
pub struct StrategyContext {
    pub registry: Arc<CacheRegistry>,
    pub fetcher: Arc<dyn Fetcher>,
    pub layout: StoreLayout,
    /// Freshness window for stale-while-revalidate
    pub max_age: Duration,
    /// Key of the offline placeholder document in the install store
    pub offline_key: String,
    pub tasks: BackgroundTasks,
}

impl StrategyContext {
    /// Reads `key` from one store of the current generation, if it exists.
    pub async fn lookup(&self, kind: StoreKind, key: &str) -> Option<CacheEntry> {
        let store = self.registry.get(&self.layout.name(kind)).await?;
        let mut guard = store.write().await;
        guard.lookup(key)
    }

    /// Reads `key` from any store of the current generation.
    pub async fn match_any(&self, key: &str) -> Option<CacheEntry> {
        self.registry.match_any(&self.layout.names(), key).await
    }

    // == Write Through ==
    /// Stamps a copy of `response` and writes it into `kind`, trimming bounded stores.
    ///
    /// Put and trim run under one store lock, so no reader sees the store over
    /// its cap. Write failures are logged and never reach the caller.
    pub async fn write_through(&self, kind: StoreKind, key: &str, response: &ResourceResponse) {
        let name = self.layout.name(kind);
        let store = self
            .registry
            .open(&name, self.layout.max_items(kind))
            .await;
        let entry = CacheEntry::stamped(key, response.clone(), Utc::now());

        let mut guard = store.write().await;
        match guard.put(&entry) {
            Ok(()) => {
                let evicted = eviction::trim(&mut guard);
                debug!(store = %name, key, evicted, "Cached response");
            }
            Err(e) => {
                warn!(store = %name, key, error = %e, "Cache write failed");
            }
        }
    }
}

/// Fetches from the network and writes 2xx responses through to `kind`.
///
/// Non-2xx responses are returned but not cached.
pub async fn refresh(
    ctx: &StrategyContext,
    request: &InterceptedRequest,
    kind: StoreKind,
) -> Result<ResourceResponse> {
    let response = ctx.fetcher.fetch(request).await?;
    if response.is_success() {
        ctx.write_through(kind, &request.key(), &response).await;
    } else {
        debug!(url = %request.url, status = response.status, "Not caching unsuccessful response");
    }
    Ok(response)
}

/// Runs the selected strategy for a request.
pub async fn execute(
    ctx: &StrategyContext,
    strategy: Strategy,
    request: &InterceptedRequest,
) -> Result<ResourceResponse> {
    debug!(url = %request.url, %strategy, "Handling request");
    match strategy {
        Strategy::NetworkFirstWithFallback => network_first_with_fallback(ctx, request).await,
        Strategy::CacheFirstRevalidate => cache_first_revalidate(ctx, request).await,
        Strategy::CacheFirstPermanent => cache_first_permanent(ctx, request).await,
        Strategy::StaleWhileRevalidate => stale_while_revalidate(ctx, request).await,
        Strategy::NetworkFirst => network_first(ctx, request).await,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedFetcher;
    use super::testing::*;
    use super::*;

    #[test]
    fn test_layout_names_and_caps() {
        let ctx = context(Arc::new(ScriptedFetcher::new()));

        assert_eq!(ctx.layout.name(StoreKind::Image), "offline-images-v1");
        assert_eq!(ctx.layout.max_items(StoreKind::Runtime), Some(50));
        assert_eq!(ctx.layout.max_items(StoreKind::Font), None);
        assert_eq!(ctx.layout.max_items(StoreKind::Install), None);
        assert!(ctx.layout.owns("offline-precache-v1"));
        assert!(!ctx.layout.owns("offline-precache-v0"));
    }

    #[tokio::test]
    async fn test_write_through_stamps_cached_copy_only() {
        let ctx = context(Arc::new(ScriptedFetcher::new()));
        let response = ResourceResponse::new(200, "body");

        ctx.write_through(StoreKind::Runtime, "GET https://app.test/a", &response)
            .await;

        assert!(response.header(crate::cache::STORED_AT_HEADER).is_none());
        let cached = ctx
            .lookup(StoreKind::Runtime, "GET https://app.test/a")
            .await
            .unwrap();
        assert!(cached.stored_at().is_some());
    }

    #[tokio::test]
    async fn test_refresh_does_not_cache_errors() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/missing")).unwrap();

        let response = refresh(&ctx, &request, StoreKind::Runtime).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(store_len(&ctx, StoreKind::Runtime).await, 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/big"), &"x".repeat(1024));
        let mut ctx = context(fetcher);
        ctx.registry = Arc::new(CacheRegistry::new(Some(16)));
        let request = InterceptedRequest::get(&url("/big")).unwrap();

        let response = refresh(&ctx, &request, StoreKind::Runtime).await.unwrap();

        assert_eq!(response.body.len(), 1024);
        let store = ctx
            .registry
            .get(&ctx.layout.name(StoreKind::Runtime))
            .await
            .unwrap();
        let guard = store.read().await;
        assert!(guard.is_empty());
        assert_eq!(guard.stats().write_failures, 1);
    }
}
