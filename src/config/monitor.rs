use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::durations;

/// Smallest batch buffer that still covers GPS and box-approximation error.
pub const MIN_BATCH_BUFFER_KM: f64 = 10.0;

/// Tuning of the proximity-monitoring engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Window during which a repeat sighting of the same aircraft for the same
    /// subscriber is suppressed.
    #[serde(rename = "expiry_ms", with = "durations::millis")]
    pub expiry: Duration,

    /// Subscribers closer than this to a batch seed share its feed query.
    pub clustering_threshold_km: f64,

    /// Extra radius added around each batch query.
    pub batch_buffer_km: f64,

    /// Pause between consecutive batch queries.
    #[serde(rename = "inter_batch_delay_ms", with = "durations::millis")]
    pub inter_batch_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_millis(300_000),
            clustering_threshold_km: 20.0,
            batch_buffer_km: MIN_BATCH_BUFFER_KM,
            inter_batch_delay: Duration::from_secs(1),
        }
    }
}

impl MonitorConfig {
    /// The dedup expiry window in milliseconds.
    pub fn expiry_ms(&self) -> i64 {
        i64::try_from(self.expiry.as_millis()).unwrap_or(i64::MAX)
    }
}
