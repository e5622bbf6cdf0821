//! `GET /status`: counters, the current cycle phase and the last result.

use axum::{Json, extract::State};
use serde::Serialize;

use super::ApiState;
use crate::models::{CycleResult, CycleState};

/// Body of `GET /status`.
#[derive(Debug, Serialize, Clone)]
pub struct StatusResponse {
    /// Crate version.
    pub version: String,
    /// Seconds since the metrics were created.
    pub uptime_secs: u64,
    /// Completed cycles since start.
    pub cycles_run: u64,
    /// Triggers rejected because a cycle was running.
    pub cycles_rejected: u64,
    /// Notifications delivered since start.
    pub notifications_sent: u64,
    /// Phase of the current cycle.
    pub cycle_state: CycleState,
    /// Dedup cache size; absent while a cycle holds the cache.
    pub tracked_sightings: Option<usize>,
    /// Result of the most recent cycle.
    pub last_cycle: Option<CycleResult>,
}

/// Snapshot of the process. Never blocks on a running cycle.
pub async fn status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let metrics = state.app_metrics.metrics.read().await;
    Json(StatusResponse {
        uptime_secs: metrics.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cycles_run: metrics.cycles_run,
        cycles_rejected: metrics.cycles_rejected,
        notifications_sent: metrics.notifications_sent,
        cycle_state: state.orchestrator.state(),
        tracked_sightings: state.orchestrator.tracked_sightings(),
        last_cycle: metrics.last_cycle.clone(),
    })
}
