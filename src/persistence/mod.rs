//! Subscriber storage.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteSubscriberStore;
