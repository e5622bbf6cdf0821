//! Delivery failures.

use reqwest::StatusCode;
use thiserror::Error;

use crate::{http_client::HttpClientPoolError, notification::template::TemplateServiceError};

/// Why a sighting could not be delivered.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The title or body template did not render against the sighting.
    #[error("template: {0}")]
    Render(#[from] TemplateServiceError),

    /// No HTTP client could be built for the notifier's retry policy.
    #[error("http client: {0}")]
    Client(#[from] HttpClientPoolError),

    /// The request never got a response, retries included.
    #[error("request: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint answered {status}")]
    Rejected {
        /// Final status after retries.
        status: StatusCode,
    },

    /// A method, header or secret that cannot be put on the wire.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The sighting or payload could not be serialized.
    #[error("serialization: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A notifier of this kind cannot take the HTTP path.
    #[error("{0} notifier has no HTTP endpoint")]
    NoEndpoint(&'static str),

    /// One or more notifiers failed while delivering a single sighting.
    #[error("{failed} of {total} notifiers failed: {}", .errors.join("; "))]
    PartialDelivery {
        /// Number of notifiers that failed.
        failed: usize,
        /// Number of notifiers attempted.
        total: usize,
        /// Per-notifier error messages, prefixed with the notifier name.
        errors: Vec<String>,
    },
}
