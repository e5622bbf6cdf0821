//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    config::AppConfig,
    context::{AppContext, AppMetrics},
    engine::CycleOrchestrator,
    persistence::SqliteSubscriberStore,
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    orchestrator: Option<Arc<CycleOrchestrator>>,
    app_metrics: Option<AppMetrics>,
    store: Option<Arc<SqliteSubscriberStore>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the configuration, orchestrator and store from a built context.
    pub fn context(self, context: AppContext) -> Self {
        let orchestrator = Arc::new(context.orchestrator());
        self.config(context.config).orchestrator(orchestrator).store(context.store)
    }

    /// Sets the application configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the orchestrator the scheduler and the HTTP trigger share.
    pub fn orchestrator(mut self, orchestrator: Arc<CycleOrchestrator>) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    /// Sets shared metrics. Fresh metrics are created when omitted.
    pub fn app_metrics(mut self, app_metrics: AppMetrics) -> Self {
        self.app_metrics = Some(app_metrics);
        self
    }

    /// Sets the store whose pool is closed on shutdown.
    pub fn store(mut self, store: Arc<SqliteSubscriberStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Checks that all required components were provided and assembles the
    /// `Supervisor`.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let orchestrator = self.orchestrator.ok_or(SupervisorError::MissingOrchestrator)?;
        let app_metrics = self.app_metrics.unwrap_or_default();

        Ok(Supervisor::new(config, orchestrator, app_metrics, self.store))
    }
}
