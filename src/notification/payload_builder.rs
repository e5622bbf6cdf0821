//! JSON bodies for the HTTP channels.

use serde_json::{Value, json};

/// The body layout an HTTP channel expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"title": ..., "body": ...}`
    Generic,
    /// A single markdown section block, title in bold.
    Slack,
    /// A `content` message, title in bold.
    Discord,
}

impl PayloadShape {
    /// Wraps an already rendered title and body.
    pub fn build(self, title: &str, body: &str) -> Value {
        match self {
            PayloadShape::Generic => json!({ "title": title, "body": body }),
            PayloadShape::Slack => json!({
                "blocks": [{
                    "type": "section",
                    "text": { "type": "mrkdwn", "text": format!("*{title}*\n\n{body}") }
                }]
            }),
            PayloadShape::Discord => json!({ "content": format!("**{title}**\n\n{body}") }),
        }
    }
}
