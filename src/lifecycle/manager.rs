//! Lifecycle Manager
//!
//! Versioned store creation at install, removal of other generations'
//! stores at activation, client takeover, and request interception.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheEntry, CacheRegistry, CacheStats, ResourceResponse, StoreKind};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::lifecycle::{ClientRegistry, LifecycleState};
use crate::notifications::{self, ClientAction, Notification, PushPayload};
use crate::policy::{classify, normalize_url, request_key, Destination, InterceptedRequest, Route};
use crate::strategy::{execute, Fetcher, StoreLayout, StrategyContext};
use crate::tasks::BackgroundTasks;

/// A seed path that could not be stored at install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of the install event.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub generation: String,
    pub store: String,
    pub cached: Vec<String>,
    pub failed: Vec<SeedFailure>,
}

/// Outcome of the activate event.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationReport {
    pub generation: String,
    pub deleted: Vec<String>,
    pub claimed: usize,
}

/// Per-store snapshot for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub max_items: Option<usize>,
    pub stats: CacheStats,
}

// == Offline Cache Manager ==
/// Handles the host's lifecycle and intercept events for one generation.
pub struct OfflineCacheManager {
    ctx: StrategyContext,
    origin: Url,
    api_prefix: String,
    seed_paths: Vec<String>,
    state: RwLock<LifecycleState>,
    clients: ClientRegistry,
}

impl OfflineCacheManager {
    // == Constructor ==
    /// Creates a manager with its own, empty store registry.
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        Self::with_registry(config, fetcher, Arc::new(CacheRegistry::new(config.store_quota_bytes)))
    }

    /// Creates a manager over an existing registry, e.g. one left behind by
    /// an earlier generation.
    pub fn with_registry(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        registry: Arc<CacheRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        let origin = config.origin_url()?;
        let offline_url = origin
            .join(&config.offline_path)
            .map_err(|e| CacheError::InvalidConfig(format!("offline path: {}", e)))?;

        let ctx = StrategyContext {
            registry,
            fetcher,
            layout: StoreLayout {
                prefix: config.store_prefix.clone(),
                generation: config.generation.clone(),
                runtime_max_items: config.runtime_max_items,
                image_max_items: config.image_max_items,
            },
            max_age: config.max_age(),
            offline_key: request_key("GET", &offline_url),
            tasks: BackgroundTasks::new(),
        };

        Ok(Self {
            ctx,
            origin,
            api_prefix: config.api_prefix.clone(),
            seed_paths: config.seed_paths.clone(),
            state: RwLock::new(LifecycleState::Idle),
            clients: ClientRegistry::new(config.max_clients),
        })
    }

    // == Install ==
    /// Opens the install store and writes every seed path into it.
    ///
    /// Seeding is best-effort: a failing path is recorded and logged, the
    /// others are still stored.
    pub async fn install(&self) -> Result<InstallReport> {
        let previous = self.transition_from(LifecycleState::can_install, LifecycleState::Installing).await?;
        let generation = self.generation().to_string();
        info!(%generation, seeds = self.seed_paths.len(), "Installing");

        let store_name = self.ctx.layout.name(StoreKind::Install);
        self.ctx.registry.open(&store_name, None).await;

        let mut cached = Vec::new();
        let mut failed = Vec::new();
        for path in &self.seed_paths {
            match self.seed(path).await {
                Ok(()) => cached.push(path.clone()),
                Err(e) => {
                    warn!(path = %path, error = %e, "Seed failed, continuing");
                    failed.push(SeedFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let next = if previous.is_active() {
            LifecycleState::Active
        } else {
            LifecycleState::Installed
        };
        *self.state.write().await = next;
        info!(%generation, cached = cached.len(), failed = failed.len(), "Install finished");

        Ok(InstallReport {
            generation,
            store: store_name,
            cached,
            failed,
        })
    }

    async fn seed(&self, path: &str) -> Result<()> {
        let request = self
            .request("GET", path, Vec::new(), Bytes::new())?
            .with_destination(Destination::Document);
        let response = self.ctx.fetcher.fetch(&request).await?;
        if !response.is_success() {
            return Err(CacheError::UnexpectedStatus {
                url: request.url.to_string(),
                status: response.status,
            });
        }

        let store = self.ctx.registry.open(&self.ctx.layout.name(StoreKind::Install), None).await;
        let entry = CacheEntry::stamped(request.key(), response, Utc::now());
        let mut guard = store.write().await;
        guard.put(&entry)
    }

    // == Activate ==
    /// Deletes every store outside the current generation and claims all clients.
    pub async fn activate(&self) -> Result<ActivationReport> {
        self.transition_from(LifecycleState::can_activate, LifecycleState::Activating).await?;
        let generation = self.generation().to_string();
        info!(%generation, "Activating");

        let mut deleted = Vec::new();
        for name in self.ctx.registry.names().await {
            if !self.ctx.layout.owns(&name) && self.ctx.registry.delete(&name).await {
                deleted.push(name);
            }
        }

        let claimed = self.clients.claim(&generation).await;
        *self.state.write().await = LifecycleState::Active;
        info!(%generation, deleted = deleted.len(), claimed, "Active");

        Ok(ActivationReport {
            generation,
            deleted,
            claimed,
        })
    }

    /// Moves to `next` if `allowed` accepts the current state.
    ///
    /// An active manager stays active while it re-installs or re-activates,
    /// so requests keep going through the strategies meanwhile.
    async fn transition_from(
        &self,
        allowed: fn(&LifecycleState) -> bool,
        next: LifecycleState,
    ) -> Result<LifecycleState> {
        let mut state = self.state.write().await;
        let previous = *state;
        if !allowed(&previous) {
            return Err(CacheError::InvalidRequest(format!(
                "cannot enter {} from {}",
                next, previous
            )));
        }
        if !previous.is_active() {
            *state = next;
        }
        Ok(previous)
    }

    // == Handle ==
    /// Satisfies an intercepted request.
    ///
    /// Until the manager is active every request goes straight to the network.
    pub async fn handle(&self, request: InterceptedRequest, client_id: Option<&str>) -> Result<ResourceResponse> {
        let state = self.state().await;
        if let Some(id) = client_id {
            let controller = state.is_active().then(|| self.generation());
            self.clients.register(id, controller).await;
        }

        if !state.is_active() {
            debug!(url = %request.url, %state, "Not active, passing through");
            return self.ctx.fetcher.fetch(&request).await;
        }

        match classify(&request, &self.api_prefix) {
            Route::Passthrough(reason) => {
                debug!(url = %request.url, ?reason, "Passing through");
                self.ctx.fetcher.fetch(&request).await
            }
            Route::Intercept(strategy) => execute(&self.ctx, strategy, &request).await,
        }
    }

    /// Builds a request for `path_and_query` resolved against the origin.
    ///
    /// Anything that resolves to another scheme, host or port, such as a
    /// scheme-relative `//host/path`, is rejected.
    pub fn request(
        &self,
        method: &str,
        path_and_query: &str,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Result<InterceptedRequest> {
        let url = self
            .origin
            .join(path_and_query)
            .map_err(|e| CacheError::InvalidRequest(format!("{}: {}", path_and_query, e)))?;
        if !same_origin(&url, &self.origin) {
            return Err(CacheError::InvalidRequest(format!(
                "{} leaves origin {}",
                path_and_query, self.origin
            )));
        }
        let url = normalize_url(url.as_str())?;
        InterceptedRequest::new(method, url.as_str(), headers, body)
    }

    // == Notifications ==
    pub fn push_received(&self, payload: PushPayload) -> Notification {
        notifications::push_received(payload)
    }

    pub fn notification_clicked(&self, payload: PushPayload) -> ClientAction {
        notifications::notification_clicked(payload)
    }

    /// Waits for detached background work to finish.
    pub async fn settle(&self) {
        self.ctx.tasks.settle().await;
    }

    pub async fn pending_tasks(&self) -> usize {
        self.ctx.tasks.pending().await
    }

    // == Accessors ==
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub fn generation(&self) -> &str {
        &self.ctx.layout.generation
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.ctx.registry
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn store_name(&self, kind: StoreKind) -> String {
        self.ctx.layout.name(kind)
    }

    /// Snapshot of every store currently in the registry.
    pub async fn store_summaries(&self) -> Vec<StoreSummary> {
        let mut summaries = Vec::new();
        for name in self.ctx.registry.names().await {
            if let Some(store) = self.ctx.registry.get(&name).await {
                let guard = store.read().await;
                summaries.push(StoreSummary {
                    name,
                    max_items: guard.max_items(),
                    stats: guard.stats(),
                });
            }
        }
        summaries
    }
}

fn same_origin(url: &Url, origin: &Url) -> bool {
    url.scheme() == origin.scheme()
        && url.host_str() == origin.host_str()
        && url.port_or_known_default() == origin.port_or_known_default()
}
