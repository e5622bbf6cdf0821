//! Configuration module for skywatch.

mod app_config;
pub mod durations;
mod feed;
mod http_retry;
mod monitor;
mod server;

pub use app_config::{AppConfig, ConfigValidationError};
pub use feed::{FeedConfig, FeedRetryConfig};
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use monitor::{MIN_BATCH_BUFFER_KM, MonitorConfig};
pub use server::ServerConfig;
