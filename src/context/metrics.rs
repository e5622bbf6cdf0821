use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::CycleResult;

/// A struct to hold application metrics.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// The time the application started.
    pub start_time: tokio::time::Instant,
    /// Completed cycles since start.
    pub cycles_run: u64,
    /// Triggers rejected because a cycle was already running.
    pub cycles_rejected: u64,
    /// Notifications sent since start.
    pub notifications_sent: u64,
    /// Result of the most recent completed cycle.
    pub last_cycle: Option<CycleResult>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            start_time: tokio::time::Instant::now(),
            cycles_run: 0,
            cycles_rejected: 0,
            notifications_sent: 0,
            last_cycle: None,
        }
    }
}

impl Metrics {
    /// Folds a finished cycle into the counters.
    pub fn record_cycle(&mut self, result: &CycleResult) {
        self.cycles_run += 1;
        let delivered: usize = result
            .subscriber_results
            .iter()
            .map(|r| r.new_planes.saturating_sub(r.notification_failures))
            .sum();
        self.notifications_sent += delivered as u64;
        self.last_cycle = Some(result.clone());
    }
}

/// Shared application metrics for the HTTP server.
#[derive(Clone, Default)]
pub struct AppMetrics {
    /// Shared metrics.
    pub metrics: Arc<RwLock<Metrics>>,
}

impl AppMetrics {
    /// Records a finished cycle.
    pub async fn record_cycle(&self, result: &CycleResult) {
        self.metrics.write().await.record_cycle(result);
    }

    /// Records a trigger that was turned away.
    pub async fn record_rejected(&self) {
        self.metrics.write().await.cycles_rejected += 1;
    }
}
