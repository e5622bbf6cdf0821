use thiserror::Error;

use crate::{
    config::ConfigValidationError, feed::FeedError, persistence::error::PersistenceError,
};

/// Startup failures while wiring the application together.
#[derive(Debug, Error)]
pub enum AppContextError {
    /// The YAML files or environment overrides could not be read.
    #[error("loading configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// A value loaded but is out of range.
    #[error("{0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// The subscriber database could not be opened or migrated.
    #[error("opening subscriber store: {0}")]
    Persistence(#[from] PersistenceError),

    /// The feed client could not be built.
    #[error("building feed client: {0}")]
    Feed(#[from] FeedError),
}
