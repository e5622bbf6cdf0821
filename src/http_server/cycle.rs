//! `POST /cycle`: runs one monitoring cycle on demand.

use axum::{extract::State, response::Json};

use super::{ApiError, ApiState};
use crate::{engine::OrchestratorError, models::CycleResult};

/// Runs a cycle and returns its result. Responds 409 while another cycle is
/// running.
///
/// The cycle runs on its own task so a client that disconnects mid-request
/// does not abort it; the result is still recorded in the metrics.
pub async fn trigger_cycle(State(state): State<ApiState>) -> Result<Json<CycleResult>, ApiError> {
    tracing::info!("Cycle triggered over HTTP.");
    let ApiState { orchestrator, app_metrics, cancellation_token, .. } = state;

    let handle = tokio::spawn(async move {
        match orchestrator.run_cycle(&cancellation_token).await {
            Ok(result) => {
                app_metrics.record_cycle(&result).await;
                Ok(result)
            }
            Err(e @ OrchestratorError::CycleInProgress) => {
                tracing::warn!("Rejected cycle trigger: a cycle is already running.");
                app_metrics.record_rejected().await;
                Err(e)
            }
        }
    });

    match handle.await {
        Ok(outcome) => Ok(Json(outcome?)),
        Err(e) => {
            tracing::error!(error = %e, "Monitoring cycle task failed.");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
