//! Command-line entry points besides the long-running supervisor.

pub mod run_once;
pub mod subscribers;

use thiserror::Error;

use crate::{context::AppContextError, engine::OrchestratorError, persistence::error::PersistenceError};

/// Errors surfaced by CLI commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The application context could not be built.
    #[error("Initialization error: {0}")]
    Context(#[from] AppContextError),

    /// A subscriber store operation failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The cycle could not be started.
    #[error("Cycle error: {0}")]
    Cycle(#[from] OrchestratorError),

    /// The result could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
