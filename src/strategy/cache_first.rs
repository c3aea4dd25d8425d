//! Cache-first strategies for images and fonts.

use crate::cache::{ResourceResponse, StoreKind};
use crate::error::Result;
use crate::policy::InterceptedRequest;
use crate::strategy::{refresh, StrategyContext};
use crate::tasks::spawn_revalidation;

/// Images: serve a cached copy immediately and refresh it in the background.
///
/// On a miss the caller waits for the network; a network failure is
/// returned as-is with no further fallback.
pub async fn cache_first_revalidate(
    ctx: &StrategyContext,
    request: &InterceptedRequest,
) -> Result<ResourceResponse> {
    match ctx.lookup(StoreKind::Image, &request.key()).await {
        Some(entry) => {
            spawn_revalidation(ctx, request.clone(), StoreKind::Image).await;
            Ok(entry.response)
        }
        None => refresh(ctx, request, StoreKind::Image).await,
    }
}

/// Fonts: once cached for a generation, never fetched again.
pub async fn cache_first_permanent(
    ctx: &StrategyContext,
    request: &InterceptedRequest,
) -> Result<ResourceResponse> {
    if let Some(entry) = ctx.lookup(StoreKind::Font, &request.key()).await {
        return Ok(entry.response);
    }
    refresh(ctx, request, StoreKind::Font).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::error::CacheError;
    use crate::strategy::test_support::ScriptedFetcher;
    use crate::strategy::testing::*;

    #[tokio::test]
    async fn test_image_miss_waits_for_network_and_caches() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/logo.png"), "png v1");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/logo.png")).unwrap();

        let response = cache_first_revalidate(&ctx, &request).await.unwrap();

        assert_eq!(response.body, "png v1");
        assert_eq!(store_len(&ctx, StoreKind::Image).await, 1);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_image_hit_returns_cached_and_revalidates_in_background() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/logo.png"), "png v1");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/logo.png")).unwrap();
        cache_first_revalidate(&ctx, &request).await.unwrap();

        fetcher.respond(&url("/logo.png"), "png v2");
        let response = cache_first_revalidate(&ctx, &request).await.unwrap();
        assert_eq!(response.body, "png v1");

        ctx.tasks.settle().await;
        let cached = ctx.lookup(StoreKind::Image, &request.key()).await.unwrap();
        assert_eq!(cached.response.body, "png v2");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_image_hit_does_not_wait_for_slow_network() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/logo.png"), "png v1");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/logo.png")).unwrap();
        cache_first_revalidate(&ctx, &request).await.unwrap();

        fetcher.set_delay(Duration::from_secs(30));
        let response = tokio::time::timeout(
            Duration::from_secs(1),
            cache_first_revalidate(&ctx, &request),
        )
        .await
        .expect("cached image should be served without waiting")
        .unwrap();

        assert_eq!(response.body, "png v1");
        assert_eq!(ctx.tasks.pending().await, 1);
    }

    #[tokio::test]
    async fn test_image_offline_hit_keeps_cached_copy() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/logo.png"), "png v1");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/logo.png")).unwrap();
        cache_first_revalidate(&ctx, &request).await.unwrap();

        fetcher.set_offline(true);
        let response = cache_first_revalidate(&ctx, &request).await.unwrap();
        ctx.tasks.settle().await;

        assert_eq!(response.body, "png v1");
        assert!(ctx.lookup(StoreKind::Image, &request.key()).await.is_some());
    }

    #[tokio::test]
    async fn test_image_offline_miss_fails() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_offline(true);
        let ctx = context(fetcher);
        let request = InterceptedRequest::get(&url("/logo.png")).unwrap();

        let result = cache_first_revalidate(&ctx, &request).await;

        assert!(matches!(result, Err(CacheError::Network(_))));
    }

    #[tokio::test]
    async fn test_concurrent_same_image_leaves_one_entry() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/a.png"), "a");
        fetcher.respond(&url("/b.png"), "b");
        fetcher.respond(&url("/c.png"), "c");
        let ctx = context_with(fetcher, 50, 2);
        let b = InterceptedRequest::get(&url("/b.png")).unwrap();
        let c = InterceptedRequest::get(&url("/c.png")).unwrap();
        cache_first_revalidate(&ctx, &InterceptedRequest::get(&url("/a.png")).unwrap())
            .await
            .unwrap();
        cache_first_revalidate(&ctx, &b).await.unwrap();

        let (first, second) = tokio::join!(
            cache_first_revalidate(&ctx, &c),
            cache_first_revalidate(&ctx, &c)
        );
        first.unwrap();
        second.unwrap();

        let store = ctx
            .registry
            .get(&ctx.layout.name(StoreKind::Image))
            .await
            .unwrap();
        let keys = store.read().await.keys();
        assert_eq!(keys.iter().filter(|k| **k == c.key()).count(), 1);
        assert_eq!(keys, vec![b.key(), c.key()]);
    }

    #[tokio::test]
    async fn test_font_cached_triggers_no_more_fetches() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url("/inter.woff2"), "font");
        let ctx = context(fetcher.clone());
        let request = InterceptedRequest::get(&url("/inter.woff2")).unwrap();

        cache_first_permanent(&ctx, &request).await.unwrap();
        for _ in 0..5 {
            let response = cache_first_permanent(&ctx, &request).await.unwrap();
            assert_eq!(response.body, "font");
        }
        ctx.tasks.settle().await;

        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_font_store_is_unbounded() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let ctx = context_with(fetcher.clone(), 2, 2);
        for i in 0..10 {
            fetcher.respond(&url(&format!("/f{}.woff", i)), "font");
            let request = InterceptedRequest::get(&url(&format!("/f{}.woff", i))).unwrap();
            cache_first_permanent(&ctx, &request).await.unwrap();
        }

        assert_eq!(store_len(&ctx, StoreKind::Font).await, 10);
    }
}
