use std::{
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};

use axum::{Router, routing::get};
use reqwest::Client;
use skywatch::{
    config::{AppConfig, FeedConfig, FeedRetryConfig, MonitorConfig, ServerConfig},
    context::AppMetrics,
    engine::CycleOrchestrator,
    feed::OpenSkyFeedClient,
    http_client::HttpClientPool,
    http_server::{self, ApiState},
    notification::NotificationService,
    persistence::SqliteSubscriberStore,
    test_helpers::{AircraftStateBuilder, feed_body},
};
use tokio::task;
use tokio_util::sync::CancellationToken;

pub const API_KEY: &str = "test-key";

pub async fn create_test_store() -> Arc<SqliteSubscriberStore> {
    let store = SqliteSubscriberStore::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory store");
    store.run_migrations().await.expect("Failed to run migrations");
    Arc::new(store)
}

/// Serves a feed that answers after `delay` with one aircraft ~8 km east of
/// Warsaw. Returns the feed URL.
pub async fn spawn_feed(delay: Duration) -> String {
    let body = feed_body(&[AircraftStateBuilder::new("48ae21")
        .position(52.2297, 21.1297)
        .callsign("LOT3AB")
        .build()]);
    let app = Router::new().route(
        "/states/all",
        get(move || {
            let body = body.clone();
            async move {
                tokio::time::sleep(delay).await;
                body
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    task::spawn(async move {
        axum::serve(listener, app).await.expect("feed server failed");
    });
    format!("http://{addr}/states/all")
}

pub struct TestServer {
    pub address: SocketAddr,
    pub client: Client,
    pub metrics: AppMetrics,
    cancellation_token: CancellationToken,
    server_handle: task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub async fn new(store: Arc<SqliteSubscriberStore>, feed_url: &str) -> Self {
        Self::with_api_key(store, feed_url, Some(API_KEY)).await
    }

    pub async fn with_api_key(
        store: Arc<SqliteSubscriberStore>,
        feed_url: &str,
        api_key: Option<&str>,
    ) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");
        drop(listener); // Release port for the app to use

        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            feed: FeedConfig {
                base_url: feed_url.parse().expect("invalid feed url"),
                request_timeout: Duration::from_secs(5),
                retry: FeedRetryConfig { max_attempts: 1, ..Default::default() },
                ..Default::default()
            },
            monitor: MonitorConfig { inter_batch_delay: Duration::ZERO, ..Default::default() },
            server: ServerConfig {
                listen_address: addr,
                api_key: api_key.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        };

        let feed = OpenSkyFeedClient::new(&config.feed).expect("Failed to build feed client");
        let sink = NotificationService::new(vec![], Arc::new(HttpClientPool::new()));
        let orchestrator = Arc::new(CycleOrchestrator::new(
            store,
            Arc::new(feed),
            Arc::new(sink),
            &config.monitor,
            config.cycle_interval,
        ));

        let metrics = AppMetrics::default();
        let cancellation_token = CancellationToken::new();
        let state = ApiState {
            config: Arc::new(config),
            app_metrics: metrics.clone(),
            orchestrator,
            cancellation_token: cancellation_token.clone(),
        };

        // Spawn the actual app server
        let server_handle = task::spawn(http_server::run_server_from_config(state));

        let server = Self {
            address: addr,
            client: Client::new(),
            metrics,
            cancellation_token,
            server_handle,
        };
        server.wait_until_ready().await;
        server
    }

    async fn wait_until_ready(&self) {
        for _ in 0..50 {
            if self.client.get(self.url("/health")).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server did not start on {}", self.address);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("Request failed")
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub async fn trigger_cycle(&self) -> reqwest::Response {
        self.post("/cycle").bearer_auth(API_KEY).send().await.expect("Request failed")
    }

    /// Stops the server through its cancellation token and waits for the
    /// graceful shutdown to finish.
    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), self.server_handle)
            .await
            .expect("server did not shut down")
            .expect("server task panicked");
        assert!(result.is_ok());
    }
}
