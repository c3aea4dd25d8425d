//! Network-first strategies for documents and the generic bucket.

use tracing::{debug, info};

use crate::cache::{ResourceResponse, StoreKind};
use crate::error::{CacheError, Result};
use crate::policy::InterceptedRequest;
use crate::strategy::{refresh, StrategyContext};

/// Documents: network, then any current store, then the offline placeholder.
///
/// Never propagates a network error. Only a missing placeholder degrades
/// to `CacheError::OfflineUnavailable`.
pub async fn network_first_with_fallback(
    ctx: &StrategyContext,
    request: &InterceptedRequest,
) -> Result<ResourceResponse> {
    let err = match refresh(ctx, request, StoreKind::Runtime).await {
        Ok(response) => return Ok(response),
        Err(err) => err,
    };

    debug!(url = %request.url, error = %err, "Document fetch failed, falling back to cache");
    if let Some(entry) = ctx.match_any(&request.key()).await {
        return Ok(entry.response);
    }

    match ctx.lookup(StoreKind::Install, &ctx.offline_key).await {
        Some(placeholder) => {
            info!(url = %request.url, "Serving offline placeholder");
            Ok(placeholder.response)
        }
        None => Err(CacheError::OfflineUnavailable(request.url.to_string())),
    }
}

/// Miscellaneous requests: network, then any current store, else the network error.
pub async fn network_first(
    ctx: &StrategyContext,
    request: &InterceptedRequest,
) -> Result<ResourceResponse> {
    match refresh(ctx, request, StoreKind::Runtime).await {
        Ok(response) => Ok(response),
        Err(err) => {
            debug!(url = %request.url, error = %err, "Fetch failed, trying cache");
            ctx.match_any(&request.key())
                .await
                .map(|entry| entry.response)
                .ok_or(err)
        }
    }
}
