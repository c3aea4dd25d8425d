//! Background Revalidation
//!
//! Fire-and-forget refreshes for the image and stale-while-revalidate
//! strategies. Their only observable effect is the store write; failures
//! are swallowed at the task boundary.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::StoreKind;
use crate::policy::InterceptedRequest;
use crate::strategy::{refresh, StrategyContext};

// == Background Tasks ==
/// Tracks detached tasks so the host can wait for them to settle.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a detached task and tracks it. Finished handles are pruned.
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut handles = self.handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of tracked tasks that have not finished yet.
    pub async fn pending(&self) -> usize {
        self.handles
            .lock()
            .await
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    // == Settle ==
    /// Waits until every tracked task, including ones spawned meanwhile, has finished.
    pub async fn settle(&self) {
        loop {
            let batch = std::mem::take(&mut *self.handles.lock().await);
            if batch.is_empty() {
                break;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    warn!("Background task ended abnormally: {}", e);
                }
            }
        }
    }
}

/// Spawns a network refresh of `request` that writes through to `kind` on success.
///
/// The caller never observes the outcome.
pub async fn spawn_revalidation(ctx: &StrategyContext, request: InterceptedRequest, kind: StoreKind) {
    let task_ctx = ctx.clone();
    ctx.tasks
        .spawn(async move {
            match refresh(&task_ctx, &request, kind).await {
                Ok(response) => {
                    debug!(url = %request.url, status = response.status, store = %kind, "Revalidated");
                }
                Err(e) => {
                    debug!(url = %request.url, error = %e, "Background revalidation failed");
                }
            }
        })
        .await;
}
