//! Offline Cache - an offline-first resource cache manager
//!
//! Serves as a caching front for an origin server: installs the seed list,
//! activates the current generation and intercepts every request.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline_cache::{create_router, AppState, Config, HttpFetcher, OfflineCacheManager};

/// Main entry point for the offline cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Build the network fetcher and the manager
/// 4. Run install and activate for the configured generation
/// 5. Create Axum router and start the HTTP server
/// 6. On SIGINT/SIGTERM, stop accepting and let background work settle
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting offline cache server");

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: generation={}, origin={}, port={}, runtime_cap={}, image_cap={}",
        config.generation,
        config.origin,
        config.server_port,
        config.runtime_max_items,
        config.image_max_items
    );
    if !config.seeds_offline_document() {
        warn!(
            offline_path = %config.offline_path,
            "Offline document is not in the seed list, offline navigations will fail"
        );
    }

    let fetcher = HttpFetcher::new(config.fetch_timeout()).context("failed to build fetcher")?;
    let manager = OfflineCacheManager::new(&config, Arc::new(fetcher))
        .context("failed to create manager")?;

    let report = manager.install().await.context("install failed")?;
    if !report.failed.is_empty() {
        warn!(failed = report.failed.len(), "Some seed paths were not cached");
    }
    manager.activate().await.context("activation failed")?;

    let state = AppState::new(manager);
    let manager = state.manager.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.settle().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
