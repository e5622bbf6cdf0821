//! # Notification Service
//!
//! Delivers a [`Sighting`] to every configured notifier. Each notifier renders
//! its `message.title` and `message.body` templates against the sighting and
//! sends the result through its channel:
//!
//! - `stdout` prints the rendered message (or the raw sighting JSON).
//! - `webhook` posts `{title, body}`, signed when a secret is configured.
//! - `slack` and `discord` post their channel-specific payloads.
//!
//! Notifiers are dispatched concurrently and errors are reported in
//! configuration order. Webhook clients come from a shared [`HttpClientPool`]
//! keyed by retry policy.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
#[cfg(test)]
use mockall::automock;

use crate::{
    http_client::HttpClientPool,
    models::{
        Sighting,
        notifier::{NotifierConfig, NotifierTypeConfig, StdoutConfig},
    },
};

pub mod error;
pub mod payload_builder;
pub mod template;
mod webhook;

use error::NotificationError;
use payload_builder::PayloadShape;
use template::TemplateService;
pub use webhook::WebhookNotifier;

/// Receives sightings that passed the dedup check.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one sighting. Failures are reported, never retried by the
    /// caller.
    async fn notify(&self, sighting: &Sighting) -> Result<(), NotificationError>;
}

/// A service that fans a sighting out to every configured notifier.
pub struct NotificationService {
    client_pool: Arc<HttpClientPool>,
    template_service: TemplateService,
    notifiers: Vec<NotifierConfig>,
}

impl NotificationService {
    /// Creates a new `NotificationService` over validated notifier configs.
    pub fn new(notifiers: Vec<NotifierConfig>, client_pool: Arc<HttpClientPool>) -> Self {
        Self { client_pool, template_service: TemplateService::new(), notifiers }
    }

    /// Names of the configured notifiers, in dispatch order.
    pub fn notifier_names(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.name.as_str()).collect()
    }

    async fn send_webhook(
        &self,
        config: &NotifierTypeConfig,
        context: &serde_json::Value,
    ) -> Result<(), NotificationError> {
        let (message, retry_policy, shape) = match config {
            NotifierTypeConfig::Webhook(c) => (&c.message, &c.retry_policy, PayloadShape::Generic),
            NotifierTypeConfig::Slack(c) => (&c.message, &c.retry_policy, PayloadShape::Slack),
            NotifierTypeConfig::Discord(c) => (&c.message, &c.retry_policy, PayloadShape::Discord),
            NotifierTypeConfig::Stdout(_) => return Err(NotificationError::NoEndpoint("stdout")),
        };
        let (method, secret, headers) = match config {
            NotifierTypeConfig::Webhook(c) => (c.method.as_deref(), c.secret.clone(), c.headers.clone()),
            _ => (None, None, None),
        };
        let url =
            config.endpoint().cloned().ok_or(NotificationError::NoEndpoint(config.kind()))?;

        let (title, body) = self.template_service.render_message(message, context)?;
        let payload = shape.build(&title, &body);
        let http_client = self.client_pool.get_or_create(retry_policy).await?;
        let notifier = WebhookNotifier::new(url, method, secret, headers, http_client)?;
        notifier.notify_json(&payload).await
    }

    fn print_stdout(
        &self,
        name: &str,
        config: &StdoutConfig,
        context: &serde_json::Value,
    ) -> Result<(), NotificationError> {
        match &config.message {
            Some(message) => {
                let (title, body) = self.template_service.render_message(message, context)?;
                println!("=== {name} ===\n{title}\n{body}\n");
            }
            None => println!("=== {name} ===\n{context}\n"),
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    #[tracing::instrument(skip_all, fields(subscriber_id = %sighting.subscriber_id, icao24 = %sighting.icao24))]
    async fn notify(&self, sighting: &Sighting) -> Result<(), NotificationError> {
        let context = serde_json::to_value(sighting)?;

        let deliveries = self.notifiers.iter().map(|notifier| {
            let context = &context;
            async move {
                let result = match &notifier.config {
                    NotifierTypeConfig::Stdout(config) => {
                        self.print_stdout(&notifier.name, config, context)
                    }
                    other => self.send_webhook(other, context).await,
                };
                (notifier.name.as_str(), result)
            }
        });

        let mut errors = Vec::new();
        for (name, result) in future::join_all(deliveries).await {
            match result {
                Ok(()) => tracing::debug!(notifier = %name, "Notification delivered."),
                Err(e) => {
                    tracing::warn!(notifier = %name, error = %e, "Notification failed.");
                    errors.push(format!("{name}: {e}"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NotificationError::PartialDelivery {
                failed: errors.len(),
                total: self.notifiers.len(),
                errors,
            })
        }
    }
}
