//! Notification channels a sighting can be delivered through.
//!
//! Each entry of the `notifiers` list names a channel and carries exactly one
//! channel table (`stdout`, `webhook`, `slack` or `discord`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{config::HttpRetryConfig, models::notification::NotificationMessage};

const SLACK_HOSTS: &[&str] = &["hooks.slack.com"];
const DISCORD_HOSTS: &[&str] = &["discord.com", "discordapp.com"];
const WEBHOOK_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// A generic JSON webhook receiving `{title, body}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Endpoint receiving the JSON payload.
    pub url: Url,
    /// `POST` when omitted.
    pub method: Option<String>,
    /// HMAC-SHA256 key; requests carry `X-Signature` and `X-Timestamp` when set.
    pub secret: Option<String>,
    /// Extra request headers.
    pub headers: Option<HashMap<String, String>>,
    /// Title and body templates.
    #[serde(default)]
    pub message: NotificationMessage,
    /// Retries for transient delivery failures.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

/// A Slack incoming webhook.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SlackConfig {
    /// Webhook URL issued by the service.
    pub url: Url,
    /// Title and body templates.
    #[serde(default)]
    pub message: NotificationMessage,
    /// Retries for transient delivery failures.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

/// A Discord channel webhook.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DiscordConfig {
    /// Webhook URL issued by the service.
    pub url: Url,
    /// Title and body templates.
    #[serde(default)]
    pub message: NotificationMessage,
    /// Retries for transient delivery failures.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

/// Prints to the process's standard output.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct StdoutConfig {
    /// Without a message the sighting is printed as JSON.
    pub message: Option<NotificationMessage>,
}

/// The channel-specific part of a notifier entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifierTypeConfig {
    /// A generic webhook.
    Webhook(WebhookConfig),
    /// A Slack webhook.
    Slack(SlackConfig),
    /// A Discord webhook.
    Discord(DiscordConfig),
    /// Standard output.
    Stdout(StdoutConfig),
}

/// Reasons a notifier entry is rejected at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifierTypeConfigError {
    /// An HTTP channel with a blank message title.
    #[error("{channel} message title cannot be empty")]
    EmptyTitle {
        /// Channel kind.
        channel: &'static str,
    },

    /// The URL host does not belong to the channel's service.
    #[error("{channel} URL host {found:?} is not one of {expected:?}")]
    UnexpectedHost {
        /// Channel kind.
        channel: &'static str,
        /// Accepted hosts.
        expected: &'static [&'static str],
        /// Host of the configured URL.
        found: Option<String>,
    },

    /// The URL is not http(s).
    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    /// The webhook method is not one a JSON webhook accepts.
    #[error("unsupported webhook method {0:?}")]
    UnsupportedMethod(String),
}

impl NotifierTypeConfig {
    /// Short channel name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            NotifierTypeConfig::Webhook(_) => "webhook",
            NotifierTypeConfig::Slack(_) => "slack",
            NotifierTypeConfig::Discord(_) => "discord",
            NotifierTypeConfig::Stdout(_) => "stdout",
        }
    }

    /// The endpoint of an HTTP channel; `None` for stdout.
    pub fn endpoint(&self) -> Option<&Url> {
        match self {
            NotifierTypeConfig::Webhook(c) => Some(&c.url),
            NotifierTypeConfig::Slack(c) => Some(&c.url),
            NotifierTypeConfig::Discord(c) => Some(&c.url),
            NotifierTypeConfig::Stdout(_) => None,
        }
    }

    /// Checks the entry without contacting the endpoint.
    pub fn validate(&self) -> Result<(), NotifierTypeConfigError> {
        let channel = self.kind();
        let (url, message, hosts) = match self {
            NotifierTypeConfig::Stdout(_) => return Ok(()),
            NotifierTypeConfig::Webhook(c) => {
                if let Some(method) = &c.method {
                    if !WEBHOOK_METHODS.contains(&method.to_uppercase().as_str()) {
                        return Err(NotifierTypeConfigError::UnsupportedMethod(method.clone()));
                    }
                }
                (&c.url, &c.message, None)
            }
            NotifierTypeConfig::Slack(c) => (&c.url, &c.message, Some(SLACK_HOSTS)),
            NotifierTypeConfig::Discord(c) => (&c.url, &c.message, Some(DISCORD_HOSTS)),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(NotifierTypeConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if let Some(expected) = hosts {
            let found = url.host_str();
            if !found.is_some_and(|host| expected.contains(&host)) {
                return Err(NotifierTypeConfigError::UnexpectedHost {
                    channel,
                    expected,
                    found: found.map(str::to_string),
                });
            }
        }
        if message.title.trim().is_empty() {
            return Err(NotifierTypeConfigError::EmptyTitle { channel });
        }
        Ok(())
    }
}

/// One entry of the `notifiers` list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Name used in logs and delivery errors.
    pub name: String,

    /// The channel table.
    #[serde(flatten)]
    pub config: NotifierTypeConfig,
}

impl NotifierConfig {
    /// The notifier used when none is configured.
    pub fn default_stdout() -> Self {
        Self {
            name: "stdout".to_string(),
            config: NotifierTypeConfig::Stdout(StdoutConfig {
                message: Some(NotificationMessage::default()),
            }),
        }
    }
}
