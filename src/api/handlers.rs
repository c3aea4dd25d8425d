//! API Handlers
//!
//! The intercept handler and the `/__offline/*` management endpoints.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::ResourceResponse;
use crate::error::Result;
use crate::lifecycle::{ActivationReport, InstallReport, OfflineCacheManager};
use crate::models::{HealthResponse, StatsResponse, StoreStatsResponse};
use crate::notifications::{ClientAction, Notification, PushPayload};

/// Header the host uses to identify its client session.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<OfflineCacheManager>,
}

impl AppState {
    pub fn new(manager: OfflineCacheManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}

/// Fallback handler: every non-management request is an intercept-request event.
pub async fn intercept_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let client_id = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let forwarded = headers
        .iter()
        .filter(|(name, _)| name.as_str() != CLIENT_ID_HEADER)
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let request = state
        .manager
        .request(method.as_str(), path_and_query, forwarded, body)?;
    let response = state.manager.handle(request, client_id.as_deref()).await?;

    Ok(into_http_response(response))
}

/// Converts a stored or fetched response into an axum response.
///
/// Headers that are not valid HTTP are dropped.
pub fn into_http_response(resource: ResourceResponse) -> Response {
    let status = StatusCode::from_u16(resource.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = (status, Body::from(resource.body)).into_response();

    let headers = response.headers_mut();
    for (name, value) in resource.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            headers.append(name, value);
        }
    }
    response
}

/// Handler for POST /__offline/install
pub async fn install_handler(State(state): State<AppState>) -> Result<Json<InstallReport>> {
    Ok(Json(state.manager.install().await?))
}

/// Handler for POST /__offline/activate
pub async fn activate_handler(State(state): State<AppState>) -> Result<Json<ActivationReport>> {
    Ok(Json(state.manager.activate().await?))
}

/// Handler for GET /__offline/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let manager = &state.manager;
    let stores = manager
        .store_summaries()
        .await
        .into_iter()
        .map(StoreStatsResponse::from)
        .collect();

    Json(StatsResponse {
        generation: manager.generation().to_string(),
        state: manager.state().await,
        pending_tasks: manager.pending_tasks().await,
        stores,
    })
}

/// Handler for GET /__offline/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.manager.state().await))
}

/// Handler for POST /__offline/push
pub async fn push_handler(
    State(state): State<AppState>,
    Json(payload): Json<PushPayload>,
) -> Json<Notification> {
    Json(state.manager.push_received(payload))
}

/// Handler for POST /__offline/notification-click
pub async fn notification_click_handler(
    State(state): State<AppState>,
    Json(payload): Json<PushPayload>,
) -> Json<ClientAction> {
    Json(state.manager.notification_clicked(payload))
}
