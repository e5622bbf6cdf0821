use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::durations;

/// How much randomness goes into each webhook backoff.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
    /// Deterministic backoff.
    None,
    /// Uniformly random between zero and the computed backoff.
    #[default]
    Full,
}

/// Retry policy for one notifier's webhook client.
///
/// Also the key of the shared client pool, so it is `Hash + Eq`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct HttpRetryConfig {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Multiplier between consecutive backoffs.
    pub base_for_backoff: u32,
    /// Backoff before the first retry.
    #[serde(rename = "initial_backoff_ms", with = "durations::millis")]
    pub initial_backoff: Duration,
    /// Cap on a single backoff.
    #[serde(rename = "max_backoff_ms", with = "durations::millis")]
    pub max_backoff: Duration,
    /// Randomisation of each backoff.
    pub jitter: JitterSetting,
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_for_backoff: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
            jitter: JitterSetting::Full,
        }
    }
}
