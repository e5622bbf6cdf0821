//! The Supervisor manages the lifecycle of the monitoring service.
//!
//! It owns the cycle orchestrator and runs three kinds of tasks side by side:
//!
//! - a signal handler that turns `SIGINT`/`SIGTERM` into a cancellation,
//! - the interval scheduler that triggers one monitoring cycle per
//!   `cycle_interval`,
//! - the HTTP server (when enabled).
//!
//! If any supervised task panics the supervisor cancels the others so the
//! process exits cleanly instead of running partially.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::{signal, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    context::AppMetrics,
    engine::{CycleOrchestrator, OrchestratorError},
    http_server::{self, ApiState},
    persistence::SqliteSubscriberStore,
};

/// Errors that can occur while building or running the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// No orchestrator was provided to the `SupervisorBuilder`.
    #[error("Missing cycle orchestrator for Supervisor")]
    MissingOrchestrator,

    /// A supervised task panicked or was aborted.
    #[error("Supervised task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    config: Arc<AppConfig>,
    orchestrator: Arc<CycleOrchestrator>,
    app_metrics: AppMetrics,
    /// Closed during cleanup when the supervisor owns the connection pool.
    store: Option<Arc<SqliteSubscriberStore>>,
    cancellation_token: CancellationToken,
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Creates a supervisor over an already wired orchestrator.
    pub fn new(
        config: AppConfig,
        orchestrator: Arc<CycleOrchestrator>,
        app_metrics: AppMetrics,
        store: Option<Arc<SqliteSubscriberStore>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
            app_metrics,
            store,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder`.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// The token that stops every supervised task when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// The metrics the scheduler and the HTTP server write to.
    pub fn app_metrics(&self) -> AppMetrics {
        self.app_metrics.clone()
    }

    /// Starts all supervised tasks and blocks until shutdown.
    ///
    /// Returns an error if a task panicked; a signal or an external
    /// cancellation is a normal shutdown.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        self.spawn_signal_handler();

        if self.config.server.enabled {
            let state = ApiState {
                config: Arc::clone(&self.config),
                app_metrics: self.app_metrics.clone(),
                orchestrator: Arc::clone(&self.orchestrator),
                cancellation_token: self.cancellation_token.clone(),
            };
            let token = self.cancellation_token.clone();
            self.join_set.spawn(async move {
                if let Err(e) = http_server::run_server_from_config(state).await {
                    tracing::error!(error = %e, "HTTP server stopped with an error.");
                    token.cancel();
                }
            });
        }

        let scheduler = Scheduler {
            orchestrator: Arc::clone(&self.orchestrator),
            app_metrics: self.app_metrics.clone(),
            interval: self.config.cycle_interval,
            cancellation_token: self.cancellation_token.clone(),
        };
        self.join_set.spawn(scheduler.run());

        tracing::info!(
            cycle_interval_secs = self.config.cycle_interval.as_secs(),
            server_enabled = self.config.server.enabled,
            "Supervisor started."
        );

        let mut failure = None;
        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(())) => {}
                        Some(Err(e)) => {
                            tracing::error!(error = ?e, "A critical task failed. Initiating shutdown.");
                            self.cancellation_token.cancel();
                            failure.get_or_insert(e);
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        self.shutdown().await;
        match failure {
            Some(e) => Err(SupervisorError::TaskFailed(e)),
            None => Ok(()),
        }
    }

    fn spawn_signal_handler(&mut self) {
        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = cancellation_token.cancelled() => return,
            }
            cancellation_token.cancel();
        });
    }

    /// Waits for tasks to wind down within `shutdown_timeout`, aborting the
    /// stragglers, then releases resources.
    async fn shutdown(&mut self) {
        let shutdown_timeout = self.config.shutdown_timeout;
        tracing::info!(timeout = ?shutdown_timeout, "Waiting for supervised tasks to finish...");

        let drain = async {
            while let Some(result) = self.join_set.join_next().await {
                if let Err(e) = result {
                    tracing::warn!(error = ?e, "Task ended abnormally during shutdown.");
                }
            }
        };
        if tokio::time::timeout(shutdown_timeout, drain).await.is_err() {
            tracing::warn!(
                "Tasks did not finish within the timeout of {:?}. Aborting them.",
                shutdown_timeout
            );
        }
        self.join_set.shutdown().await;

        let metrics = self.app_metrics.metrics.read().await;
        tracing::info!(
            cycles_run = metrics.cycles_run,
            cycles_rejected = metrics.cycles_rejected,
            notifications_sent = metrics.notifications_sent,
            "Final counters."
        );
        drop(metrics);

        if let Some(store) = &self.store {
            store.close().await;
        }
        tracing::info!("Supervisor shutdown complete.");
    }
}

/// Triggers one cycle per interval until cancelled.
struct Scheduler {
    orchestrator: Arc<CycleOrchestrator>,
    app_metrics: AppMetrics,
    interval: std::time::Duration,
    cancellation_token: CancellationToken,
}

impl Scheduler {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // A cycle that overran has already been reported; don't fire a burst
        // of catch-up cycles afterwards.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Scheduler received shutdown signal.");
                    break;
                }
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    async fn tick(&self) {
        match self.orchestrator.run_cycle(&self.cancellation_token).await {
            Ok(result) => self.app_metrics.record_cycle(&result).await,
            Err(OrchestratorError::CycleInProgress) => {
                self.app_metrics.record_rejected().await;
                tracing::warn!("Scheduled cycle skipped: another cycle is still running.");
            }
        }
    }
}
