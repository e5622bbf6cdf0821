//! Outbound HTTP clients.
//!
//! Webhooks go through retry middleware driven by the notifier's
//! [`HttpRetryConfig`]. The feed runs its own attempt loop and gets a plain
//! client whose timeout bounds each attempt.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{HttpRetryConfig, JitterSetting};

const FEED_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

fn backoff(policy: &HttpRetryConfig) -> ExponentialBackoff {
    let jitter = match policy.jitter {
        JitterSetting::None => Jitter::None,
        JitterSetting::Full => Jitter::Full,
    };
    ExponentialBackoff::builder()
        .jitter(jitter)
        .base(policy.base_for_backoff)
        .retry_bounds(policy.initial_backoff, policy.max_backoff)
        .build_with_max_retries(policy.max_retries)
}

/// Wraps `base_client` so transient failures (connect errors, 5xx, 429) are
/// retried according to `policy`.
pub fn create_retryable_http_client(
    policy: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(backoff(policy)))
        .build()
}

/// The plain client used for feed queries.
pub fn create_feed_http_client(
    request_timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(request_timeout)
        .user_agent(user_agent)
        .pool_idle_timeout(Some(FEED_IDLE_TIMEOUT))
        .build()
}
