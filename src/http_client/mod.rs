//! HTTP clients for the feed and for notification webhooks.

mod client;
mod pool;

pub use client::{create_feed_http_client, create_retryable_http_client};
pub use pool::{HttpClientPool, HttpClientPoolError};
