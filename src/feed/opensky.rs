//! Client for an OpenSky-compatible `states/all` endpoint.
//!
//! Each call makes up to `retry.max_attempts` requests. Any transport error,
//! non-success status, or undecodable body counts as a failed attempt and is
//! followed by an exponential backoff, except after the last attempt.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::traits::{AircraftFeed, FeedError, FeedRequestError};
use crate::{
    config::{FeedConfig, FeedRetryConfig},
    geo::BoundingBox,
    http_client::create_feed_http_client,
    models::AircraftState,
};

/// The JSON body returned by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    /// Server timestamp of the snapshot, in seconds.
    #[serde(default)]
    pub time: Option<i64>,
    /// Positional state rows; `null` when nothing is in the box.
    #[serde(default)]
    pub states: Option<Vec<Vec<Value>>>,
}

impl FeedResponse {
    /// Decodes every row, skipping malformed ones.
    pub fn into_states(self) -> Vec<AircraftState> {
        self.states
            .unwrap_or_default()
            .iter()
            .filter_map(|row| match AircraftState::from_row(row) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed state row.");
                    None
                }
            })
            .collect()
    }
}

/// Feed client with a bounded retry loop.
pub struct OpenSkyFeedClient {
    client: reqwest::Client,
    base_url: url::Url,
    retry: FeedRetryConfig,
    credentials: Option<(String, Option<String>)>,
}

impl OpenSkyFeedClient {
    /// Creates a client from the feed configuration.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = create_feed_http_client(config.request_timeout, &config.user_agent)
            .map_err(FeedError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            retry: config.retry.clone(),
            credentials: config.username.clone().map(|user| (user, config.password.clone())),
        })
    }

    async fn fetch_once(&self, bbox: &BoundingBox) -> Result<FeedResponse, FeedRequestError> {
        let mut request = self.client.get(self.base_url.clone()).query(&[
            ("lamin", bbox.lat_min),
            ("lamax", bbox.lat_max),
            ("lomin", bbox.lon_min),
            ("lomax", bbox.lon_max),
        ]);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedRequestError::Status(status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FeedRequestError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AircraftFeed for OpenSkyFeedClient {
    #[tracing::instrument(skip(self), fields(
        lat_min = bbox.lat_min, lat_max = bbox.lat_max,
        lon_min = bbox.lon_min, lon_max = bbox.lon_max,
    ))]
    async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<AircraftState>, FeedError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.fetch_once(bbox).await {
                Ok(response) => {
                    let states = response.into_states();
                    tracing::debug!(attempt, count = states.len(), "Feed query succeeded.");
                    return Ok(states);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(attempt, error = %e, "Feed query failed, giving up.");
                    return Err(FeedError::Unavailable { attempts: attempt, source: e });
                }
                Err(e) => {
                    let backoff = self.retry.backoff_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Feed query failed, retrying."
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
