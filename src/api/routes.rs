//! API Routes
//!
//! Configures the Axum router: management endpoints plus the intercepting fallback.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    activate_handler, health_handler, install_handler, intercept_handler,
    notification_click_handler, push_handler, stats_handler, AppState,
};

/// Creates the main router.
///
/// # Endpoints
/// - `POST /__offline/install` - Seed the install store
/// - `POST /__offline/activate` - Drop other generations, claim clients
/// - `GET /__offline/stats` - Per-store statistics
/// - `GET /__offline/health` - Health check endpoint
/// - `POST /__offline/push` - Push received hook
/// - `POST /__offline/notification-click` - Notification clicked hook
/// - anything else - intercepted request
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/__offline/install", post(install_handler))
        .route("/__offline/activate", post(activate_handler))
        .route("/__offline/stats", get(stats_handler))
        .route("/__offline/health", get(health_handler))
        .route("/__offline/push", post(push_handler))
        .route(
            "/__offline/notification-click",
            post(notification_click_handler),
        )
        .fallback(intercept_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
