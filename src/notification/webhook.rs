//! Delivery of a JSON payload to a webhook endpoint, optionally HMAC-signed.
//!
//! A signed request carries `X-Timestamp` (milliseconds since the epoch) and
//! `X-Signature`, the hex HMAC-SHA256 of the exact request body followed by
//! the timestamp digits.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{
    Method,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use reqwest_middleware::ClientWithMiddleware;
use sha2::Sha256;
use url::Url;

use super::error::NotificationError;

const SIGNATURE_HEADER: &str = "x-signature";
const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Hex HMAC-SHA256 of `body` followed by `timestamp_ms`.
pub fn sign(secret: &str, body: &[u8], timestamp_ms: i64) -> Result<String, NotificationError> {
    // HMAC accepts empty keys; an empty secret is a config mistake.
    if secret.is_empty() {
        return Err(NotificationError::InvalidRequest("webhook secret is empty".to_string()));
    }
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| NotificationError::InvalidRequest(format!("webhook secret: {e}")))?;
    mac.update(body);
    mac.update(timestamp_ms.to_string().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Sends JSON payloads to one webhook endpoint.
#[derive(Debug)]
pub struct WebhookNotifier {
    url: Url,
    method: Method,
    secret: Option<String>,
    headers: HeaderMap,
    client: Arc<ClientWithMiddleware>,
}

impl WebhookNotifier {
    /// Checks the method, secret and extra headers once, up front.
    pub fn new(
        url: Url,
        method: Option<&str>,
        secret: Option<String>,
        headers: Option<HashMap<String, String>>,
        client: Arc<ClientWithMiddleware>,
    ) -> Result<Self, NotificationError> {
        let method = match method {
            None => Method::POST,
            Some(name) => Method::from_bytes(name.to_uppercase().as_bytes())
                .map_err(|_| NotificationError::InvalidRequest(format!("method {name:?}")))?,
        };
        if secret.as_deref() == Some("") {
            return Err(NotificationError::InvalidRequest("webhook secret is empty".to_string()));
        }

        let mut header_map = HeaderMap::new();
        for (key, value) in headers.unwrap_or_default() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| NotificationError::InvalidRequest(format!("header name {key:?}")))?;
            let value = HeaderValue::from_str(&value).map_err(|_| {
                NotificationError::InvalidRequest(format!("header value for {key:?}"))
            })?;
            header_map.insert(name, value);
        }

        Ok(Self { url, method, secret, headers: header_map, client })
    }

    /// Sends `payload`; anything but a 2xx answer is an error.
    pub async fn notify_json(&self, payload: &serde_json::Value) -> Result<(), NotificationError> {
        let body = serde_json::to_vec(payload)?;

        let mut request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.secret {
            let timestamp = Utc::now().timestamp_millis();
            request = request
                .header(SIGNATURE_HEADER, sign(secret, &body, timestamp)?)
                .header(TIMESTAMP_HEADER, timestamp.to_string());
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected { status });
        }
        tracing::trace!(url = %self.url, %status, "Webhook accepted payload.");
        Ok(())
    }
}
