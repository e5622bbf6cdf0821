use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::durations;

const DEFAULT_FEED_URL: &str = "https://opensky-network.org/api/states/all";

fn default_base_url() -> Url {
    Url::parse(DEFAULT_FEED_URL).expect("default feed URL is valid")
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_user_agent() -> String {
    format!("skywatch/{}", env!("CARGO_PKG_VERSION"))
}

/// Bounded retry policy for feed requests.
///
/// Attempt `n` (1-based) that fails is followed by a delay of
/// `initial_backoff * backoff_base^(n-1)`, capped at `max_backoff`. No delay
/// follows the last attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedRetryConfig {
    /// Total attempts per query, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    #[serde(rename = "initial_backoff_ms", with = "durations::millis")]
    pub initial_backoff: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_base: u32,
    /// Upper bound for a single delay.
    #[serde(rename = "max_backoff_ms", with = "durations::millis")]
    pub max_backoff: Duration,
}

impl Default for FeedRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            backoff_base: 2,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl FeedRetryConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_base.max(1).saturating_pow(exponent);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Sum of every delay a fully failing query waits through.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|attempt| self.backoff_for(attempt)).sum()
    }
}

/// Configuration of the upstream aircraft feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    /// Endpoint returning state vectors for a bounding box.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Per-request timeout.
    #[serde(
        rename = "request_timeout_secs",
        default = "default_request_timeout",
        with = "durations::secs"
    )]
    pub request_timeout: Duration,

    /// Retry policy applied to every query.
    #[serde(default)]
    pub retry: FeedRetryConfig,

    /// Optional basic-auth user for the feed.
    #[serde(default)]
    pub username: Option<String>,

    /// Optional basic-auth password for the feed.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            retry: FeedRetryConfig::default(),
            username: None,
            password: None,
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    /// Longest time a single batch query can take when every attempt times out.
    pub fn worst_case_latency(&self) -> Duration {
        self.request_timeout.saturating_mul(self.retry.max_attempts) + self.retry.total_backoff()
    }
}
