//! Stale-while-revalidate for scripts and styles.

use tracing::debug;

use crate::cache::{is_expired, ResourceResponse, StoreKind};
use crate::error::Result;
use crate::policy::InterceptedRequest;
use crate::strategy::{refresh, StrategyContext};
use crate::tasks::spawn_revalidation;

/// Serves a fresh cached copy immediately and refreshes it in the background.
///
/// An expired or missing copy makes the caller wait for the network. If that
/// fails, an expired copy is still served; with nothing cached the network
/// error propagates. A failed background refresh leaves the cached copy as is.
pub async fn stale_while_revalidate(
    ctx: &StrategyContext,
    request: &InterceptedRequest,
) -> Result<ResourceResponse> {
    let cached = ctx.lookup(StoreKind::Runtime, &request.key()).await;

    if let Some(entry) = &cached {
        if !is_expired(entry, ctx.max_age) {
            spawn_revalidation(ctx, request.clone(), StoreKind::Runtime).await;
            return Ok(entry.response.clone());
        }
    }

    match refresh(ctx, request, StoreKind::Runtime).await {
        Ok(response) => Ok(response),
        Err(err) => match cached {
            Some(stale) => {
                debug!(url = %request.url, error = %err, "Network failed, serving expired copy");
                Ok(stale.response)
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::cache::CacheEntry;
    use crate::error::CacheError;
    use crate::strategy::test_support::ScriptedFetcher;
    use crate::strategy::testing::*;

    /// Writes an entry stamped `age` ago straight into the runtime store.
    async fn seed_aged(ctx: &StrategyContext, request: &InterceptedRequest, body: &str, age: chrono::Duration) {
        let store = ctx
            .registry
            .open(&ctx.layout.name(StoreKind::Runtime), Some(50))
            .await;
        let entry = CacheEntry::stamped(
            request.key(),
            ResourceResponse::new(200, body.to_string()),
            Utc::now() - age,
        );
        store.write().await.put(&entry).unwrap();
    }

    #[tokio::test]
    async fn test_fresh_hit_served_then_refreshed() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/app.js"), "js v2");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/app.js")).unwrap();
        seed_aged(&ctx, &request, "js v1", chrono::Duration::hours(1)).await;

        let response = stale_while_revalidate(&ctx, &request).await.unwrap();
        assert_eq!(response.body, "js v1");

        ctx.tasks.settle().await;
        let cached = ctx.lookup(StoreKind::Runtime, &request.key()).await.unwrap();
        assert_eq!(cached.response.body, "js v2");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_hit_waits_for_network() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/app.css"), "css v2");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/app.css")).unwrap();
        seed_aged(&ctx, &request, "css v1", chrono::Duration::days(8)).await;

        let response = stale_while_revalidate(&ctx, &request).await.unwrap();

        assert_eq!(response.body, "css v2");
        assert_eq!(ctx.tasks.pending().await, 0);
    }

    #[tokio::test]
    async fn test_unstamped_hit_counts_as_fresh() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_delay(Duration::from_secs(30));
        let ctx = context(fetcher);
        let request = InterceptedRequest::get(&url("/app.js")).unwrap();
        let store = ctx
            .registry
            .open(&ctx.layout.name(StoreKind::Runtime), Some(50))
            .await;
        store
            .write()
            .await
            .put(&CacheEntry::new(request.key(), ResourceResponse::new(200, "js")))
            .unwrap();

        let response = tokio::time::timeout(Duration::from_secs(1), stale_while_revalidate(&ctx, &request))
            .await
            .expect("unstamped copy should be served immediately")
            .unwrap();

        assert_eq!(response.body, "js");
    }

    #[tokio::test]
    async fn test_miss_fetches_and_writes_through() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/app.js"), "js");
        let ctx = context(fetcher);
        let request = InterceptedRequest::get(&url("/app.js")).unwrap();

        stale_while_revalidate(&ctx, &request).await.unwrap();

        assert!(ctx.lookup(StoreKind::Runtime, &request.key()).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_background_refresh_keeps_stale_copy() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_offline(true);
        let ctx = context(fetcher);
        let request = InterceptedRequest::get(&url("/app.js")).unwrap();
        seed_aged(&ctx, &request, "js v1", chrono::Duration::minutes(5)).await;

        let response = stale_while_revalidate(&ctx, &request).await.unwrap();
        ctx.tasks.settle().await;

        assert_eq!(response.body, "js v1");
        let cached = ctx.lookup(StoreKind::Runtime, &request.key()).await.unwrap();
        assert_eq!(cached.response.body, "js v1");
    }

    #[tokio::test]
    async fn test_expired_copy_served_when_network_fails() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_offline(true);
        let ctx = context(fetcher);
        let request = InterceptedRequest::get(&url("/app.js")).unwrap();
        seed_aged(&ctx, &request, "old js", chrono::Duration::days(30)).await;

        let response = stale_while_revalidate(&ctx, &request).await.unwrap();

        assert_eq!(response.body, "old js");
    }

    #[tokio::test]
    async fn test_miss_with_network_failure_propagates() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_offline(true);
        let ctx = context(fetcher);
        let request = InterceptedRequest::get(&url("/app.js")).unwrap();

        let result = stale_while_revalidate(&ctx, &request).await;

        assert!(matches!(result, Err(CacheError::Network(_))));
    }
}
