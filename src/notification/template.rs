//! Rendering of notification templates against a serialized sighting.

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

use crate::models::notification::NotificationMessage;

/// A title or body template that did not render.
#[derive(Debug, Error)]
#[error("{part} template: {source}")]
pub struct TemplateServiceError {
    /// `"title"` or `"body"`.
    pub part: &'static str,
    /// Parse error or undefined variable.
    #[source]
    pub source: minijinja::Error,
}

/// Renders message templates. Undefined variables are errors, so a typo in
/// a configured template fails the notifier instead of rendering blank.
pub struct TemplateService {
    env: Environment<'static>,
}

impl TemplateService {
    /// A strict environment with the default filters.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }

    /// Renders the title and then the body of `message`.
    pub fn render_message(
        &self,
        message: &NotificationMessage,
        context: &serde_json::Value,
    ) -> Result<(String, String), TemplateServiceError> {
        let title = self.render_part("title", &message.title, context)?;
        let body = self.render_part("body", &message.body, context)?;
        Ok((title, body))
    }

    fn render_part(
        &self,
        part: &'static str,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<String, TemplateServiceError> {
        self.env.render_str(template, context).map_err(|source| {
            tracing::warn!(part, template, error = %source, "Template did not render.");
            TemplateServiceError { part, source }
        })
    }
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}
