//! Failures reported by the subscriber store.

use thiserror::Error;

/// Errors returned by [`SubscriberStore`](super::traits::SubscriberStore)
/// implementations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The database rejected or could not run a statement.
    #[error("subscriber store unavailable: {0}")]
    OperationFailed(String),

    /// No subscriber with this id exists.
    #[error("no subscriber with id {0:?}")]
    NotFound(String),

    /// Schema migrations could not be applied.
    #[error("could not migrate subscriber schema: {0}")]
    Migration(String),

    /// The subscriber or the connection string was rejected before touching
    /// the database.
    #[error("rejected input: {0}")]
    InvalidInput(String),
}
