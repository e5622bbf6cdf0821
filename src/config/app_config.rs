use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use super::{FeedConfig, MIN_BATCH_BUFFER_KM, MonitorConfig, ServerConfig, durations};
use crate::models::notifier::{NotifierConfig, NotifierTypeConfigError};

/// Provides the default value for cycle_interval_secs.
fn default_cycle_interval() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default value for shutdown_timeout_secs.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default value for database_url.
fn default_database_url() -> String {
    "sqlite:skywatch.db".to_string()
}

/// Errors found while validating a loaded configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    /// The feed timeout would let one slow request stall the whole cycle.
    #[error("feed request timeout ({timeout:?}) must be shorter than the cycle interval ({interval:?})")]
    TimeoutExceedsInterval {
        /// Configured feed request timeout.
        timeout: Duration,
        /// Configured cycle interval.
        interval: Duration,
    },

    /// A numeric setting is outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A notifier definition is invalid.
    #[error("notifier `{name}` is invalid: {source}")]
    Notifier {
        /// Name of the notifier.
        name: String,
        /// The validation failure.
        #[source]
        source: NotifierTypeConfigError,
    },
}

/// Application configuration for skywatch.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// SQLite URL of the subscriber store.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Period of the internal cycle scheduler.
    #[serde(
        rename = "cycle_interval_secs",
        deserialize_with = "durations::secs::deserialize",
        default = "default_cycle_interval"
    )]
    pub cycle_interval: Duration,

    /// The maximum time to wait for graceful shutdown.
    #[serde(
        rename = "shutdown_timeout_secs",
        deserialize_with = "durations::secs::deserialize",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,

    /// Monitoring engine tuning.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Upstream aircraft feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Notification channels. Empty means stdout only.
    #[serde(default)]
    pub notifiers: Vec<NotifierConfig>,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            cycle_interval: default_cycle_interval(),
            shutdown_timeout: default_shutdown_timeout(),
            monitor: MonitorConfig::default(),
            feed: FeedConfig::default(),
            notifiers: Vec::new(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the configuration
    /// directory, with `SKYWATCH__*` environment overrides.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("SKYWATCH").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.feed.request_timeout >= self.cycle_interval {
            return Err(ConfigValidationError::TimeoutExceedsInterval {
                timeout: self.feed.request_timeout,
                interval: self.cycle_interval,
            });
        }
        if self.feed.retry.max_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "feed.retry.max_attempts",
                reason: "at least one attempt is required".to_string(),
            });
        }
        if self.monitor.expiry.is_zero() {
            return Err(ConfigValidationError::InvalidValue {
                field: "monitor.expiry_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.monitor.clustering_threshold_km > 0.0) {
            return Err(ConfigValidationError::InvalidValue {
                field: "monitor.clustering_threshold_km",
                reason: format!("{} is not a positive distance", self.monitor.clustering_threshold_km),
            });
        }
        if !(self.monitor.batch_buffer_km >= MIN_BATCH_BUFFER_KM) {
            return Err(ConfigValidationError::InvalidValue {
                field: "monitor.batch_buffer_km",
                reason: format!(
                    "{} km is below the minimum of {MIN_BATCH_BUFFER_KM} km",
                    self.monitor.batch_buffer_km
                ),
            });
        }
        for notifier in &self.notifiers {
            notifier.config.validate().map_err(|source| ConfigValidationError::Notifier {
                name: notifier.name.clone(),
                source,
            })?;
        }

        let worst_case = self.feed.worst_case_latency();
        if worst_case >= self.cycle_interval {
            tracing::warn!(
                worst_case_batch = ?worst_case,
                cycle_interval = ?self.cycle_interval,
                "A single failing batch can outlast the cycle interval."
            );
        }
        Ok(())
    }

    /// Notifiers to build, falling back to stdout when none are configured.
    pub fn effective_notifiers(&self) -> Vec<NotifierConfig> {
        if self.notifiers.is_empty() {
            vec![NotifierConfig::default_stdout()]
        } else {
            self.notifiers.clone()
        }
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database_url = url.to_string();
        self
    }

    pub fn cycle_interval(mut self, interval: Duration) -> Self {
        self.config.cycle_interval = interval;
        self
    }

    pub fn feed_timeout(mut self, timeout: Duration) -> Self {
        self.config.feed.request_timeout = timeout;
        self
    }

    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.config.monitor.expiry = expiry;
        self
    }

    pub fn batch_buffer_km(mut self, buffer_km: f64) -> Self {
        self.config.monitor.batch_buffer_km = buffer_km;
        self
    }

    pub fn notifiers(mut self, notifiers: Vec<NotifierConfig>) -> Self {
        self.config.notifiers = notifiers;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
