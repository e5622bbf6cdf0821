//! HTTP server module: health, status, and the authenticated cycle trigger.

mod auth;
mod cycle;
mod error;
mod status;

use std::sync::Arc;

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
pub use error::ApiError;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::{config::AppConfig, context::AppMetrics, engine::CycleOrchestrator};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Shared metrics.
    pub app_metrics: AppMetrics,
    /// The orchestrator the trigger endpoint drives.
    pub orchestrator: Arc<CycleOrchestrator>,
    /// Cancels a triggered cycle when the process shuts down.
    pub cancellation_token: CancellationToken,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
pub fn router(state: ApiState) -> Router {
    let protected = Router::new()
        .route("/cycle", post(cycle::trigger_cycle))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth));

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::status))
        .merge(protected)
        .with_state(state)
}

/// Serves the API until the state's cancellation token fires.
pub async fn run_server_from_config(state: ApiState) -> std::io::Result<()> {
    let addr = state.config.server.listen_address;
    if state.config.server.api_key.is_none() {
        tracing::warn!("No API key configured; POST /cycle will reject every request.");
    }

    let shutdown = state.cancellation_token.clone();
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "HTTP server listening.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}
