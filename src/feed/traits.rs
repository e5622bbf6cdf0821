use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::{geo::BoundingBox, models::AircraftState};

/// The reason a single feed request failed.
#[derive(Debug, Error)]
pub enum FeedRequestError {
    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("feed returned status {0}")]
    Status(reqwest::StatusCode),

    /// The body was not a valid state response.
    #[error("invalid feed response: {0}")]
    Decode(String),
}

/// Errors surfaced by an [`AircraftFeed`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// Every attempt failed; `source` is the last failure.
    #[error("feed unavailable after {attempts} attempts: {source}")]
    Unavailable {
        /// Number of requests made.
        attempts: u32,
        /// The final request failure.
        #[source]
        source: FeedRequestError,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build feed client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A source of aircraft states inside a bounding box.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AircraftFeed: Send + Sync {
    /// Fetches every aircraft the feed reports inside `bbox`.
    async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<AircraftState>, FeedError>;
}
