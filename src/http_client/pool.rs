//! Shared webhook clients, one per distinct retry policy.
//!
//! Notifiers that share a policy share the underlying connection pool, so a
//! burst of sightings to the same endpoint reuses keep-alive connections.

use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::RwLock;

use super::client::create_retryable_http_client;
use crate::config::HttpRetryConfig;

const IDLE_CONNECTIONS_PER_HOST: usize = 10;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The TLS backend or system resolver could not be initialised.
#[derive(Debug, Error)]
#[error("cannot build webhook client: {0}")]
pub struct HttpClientPoolError(#[from] reqwest::Error);

/// Webhook clients keyed by [`HttpRetryConfig`].
#[derive(Default)]
pub struct HttpClientPool {
    clients: RwLock<HashMap<HttpRetryConfig, Arc<ClientWithMiddleware>>>,
}

impl HttpClientPool {
    /// An empty pool; clients are built lazily.
    pub fn new() -> Self {
        Self::default()
    }

    /// The client for `policy`, built on first request.
    pub async fn get_or_create(
        &self,
        policy: &HttpRetryConfig,
    ) -> Result<Arc<ClientWithMiddleware>, HttpClientPoolError> {
        if let Some(client) = self.clients.read().await.get(policy) {
            return Ok(Arc::clone(client));
        }

        let mut clients = self.clients.write().await;
        if let Some(client) = clients.get(policy) {
            return Ok(Arc::clone(client));
        }
        let client = Arc::new(create_retryable_http_client(policy, base_client()?));
        clients.insert(policy.clone(), Arc::clone(&client));
        tracing::debug!(policies = clients.len(), "Built webhook client.");
        Ok(client)
    }

    /// Number of distinct policies seen so far.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// True until the first client is built.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

fn base_client() -> Result<reqwest::Client, HttpClientPoolError> {
    Ok(reqwest::Client::builder()
        .pool_max_idle_per_host(IDLE_CONNECTIONS_PER_HOST)
        .pool_idle_timeout(Some(IDLE_TIMEOUT))
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?)
}
