//! Application context: loads configuration and builds the store, the feed
//! client and the notification service shared by every entry point.

mod error;
mod metrics;

use std::sync::Arc;

pub use error::AppContextError;
pub use metrics::{AppMetrics, Metrics};

use crate::{
    config::AppConfig,
    engine::CycleOrchestrator,
    feed::OpenSkyFeedClient,
    http_client::HttpClientPool,
    notification::NotificationService,
    persistence::SqliteSubscriberStore,
};

/// Long-lived components built from the configuration.
pub struct AppContext {
    /// Shared application configuration.
    pub config: AppConfig,

    /// The subscriber store.
    pub store: Arc<SqliteSubscriberStore>,

    /// The upstream aircraft feed client.
    pub feed: Arc<OpenSkyFeedClient>,

    /// The notification fan-out.
    pub notifications: Arc<NotificationService>,
}

impl AppContext {
    /// Wires an orchestrator over this context's components.
    pub fn orchestrator(&self) -> CycleOrchestrator {
        CycleOrchestrator::new(
            self.store.clone(),
            self.feed.clone(),
            self.notifications.clone(),
            &self.config.monitor,
            self.config.cycle_interval,
        )
    }
}

/// A builder for the `AppContext`, allowing configuration overrides.
#[derive(Default)]
pub struct AppContextBuilder {
    config_dir: Option<String>,
    database_url_override: Option<String>,
}

impl AppContextBuilder {
    /// Creates a new builder reading configuration from `config_dir`.
    pub fn new(config_dir: Option<String>) -> Self {
        Self { config_dir, database_url_override: None }
    }

    /// Sets a database URL override.
    pub fn database_url(mut self, url: String) -> Self {
        self.database_url_override = Some(url);
        self
    }

    /// Loads and validates the configuration, then builds the context.
    pub async fn build(self) -> Result<AppContext, AppContextError> {
        tracing::debug!("Loading application configuration...");
        let mut config = AppConfig::new(self.config_dir.as_deref())?;
        if let Some(db_url) = self.database_url_override {
            tracing::info!(database_url = %db_url, "Overriding database URL.");
            config.database_url = db_url;
        }
        Self::from_config(config).await
    }

    /// Builds the context from an already loaded configuration.
    pub async fn from_config(config: AppConfig) -> Result<AppContext, AppContextError> {
        config.validate()?;
        tracing::debug!(database_url = %config.database_url, feed = %config.feed.base_url, "Configuration loaded.");

        let store = Arc::new(SqliteSubscriberStore::new(&config.database_url).await?);
        store.run_migrations().await?;

        let feed = Arc::new(OpenSkyFeedClient::new(&config.feed)?);

        let notifiers = config.effective_notifiers();
        let notifications =
            Arc::new(NotificationService::new(notifiers, Arc::new(HttpClientPool::new())));
        tracing::info!(
            notifiers = ?notifications.notifier_names(),
            "Notification service initialized."
        );

        Ok(AppContext { config, store, feed, notifications })
    }
}
