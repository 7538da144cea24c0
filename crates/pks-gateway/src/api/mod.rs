//! API module for the PKS gateway

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub core_version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub endpoint_count: usize,
    pub adapters: Vec<String>,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        core_version: pks_core::VERSION.into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let endpoints = state.store.list_endpoints().await;

    Json(ReadyResponse {
        ready: endpoints.is_ok(),
        name: state.config.gateway_name.clone(),
        endpoint_count: endpoints.map(|v| v.len()).unwrap_or(0),
        adapters: state.adapters.paths(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Endpoint registration
        .route(
            "/v1/pks/endpoints",
            put(handlers::register_endpoint).get(handlers::list_endpoints),
        )
        .route("/v1/pks/endpoints/validate", put(handlers::validate_endpoint))
        .route(
            "/v1/pks/endpoints/{id}",
            get(handlers::get_endpoint).delete(handlers::delete_endpoint),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
