//! SQLite-backed [`SubscriberStore`].

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::{error::PersistenceError, traits::SubscriberStore};
use crate::models::SubscriberGeofence;

mod subscriber_sql {
    pub const SELECT_ACTIVE: &str = "SELECT id, latitude, longitude, radius_km FROM subscribers \
         WHERE active = 1 ORDER BY seq";

    pub const SELECT_ALL: &str =
        "SELECT id, latitude, longitude, radius_km FROM subscribers ORDER BY seq";

    pub const SELECT_ONE: &str =
        "SELECT id, latitude, longitude, radius_km FROM subscribers WHERE id = ?";

    pub const UPSERT: &str = "INSERT INTO subscribers (id, latitude, longitude, radius_km) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET latitude = excluded.latitude, \
         longitude = excluded.longitude, radius_km = excluded.radius_km, \
         updated_at = CURRENT_TIMESTAMP";

    pub const DELETE: &str = "DELETE FROM subscribers WHERE id = ?";

    pub const SET_ACTIVE: &str =
        "UPDATE subscribers SET active = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?";
}

/// Subscriber store over a SQLite connection pool.
pub struct SqliteSubscriberStore {
    pool: SqlitePool,
}

impl SqliteSubscriberStore {
    /// Connects to `database_url`, creating the database file if missing.
    #[tracing::instrument(level = "info")]
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") || database_url.contains("mode=memory") {
            // Each in-memory connection is its own database, and it is gone
            // once that connection closes.
            pool_options = pool_options.max_connections(1).idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await.map_err(|e| {
            PersistenceError::OperationFailed(format!("Failed to connect to database: {e}"))
        })?;
        tracing::info!(database_url, "Successfully connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            PersistenceError::Migration(e.to_string())
        })?;
        tracing::info!("Database migrations completed successfully.");
        Ok(())
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed.");
    }

    /// Inserts a subscriber, or updates the geofence of an existing one.
    /// Re-adding keeps the original position in the listing order.
    #[tracing::instrument(skip(self), fields(subscriber_id = %subscriber.id))]
    pub async fn add_subscriber(
        &self,
        subscriber: &SubscriberGeofence,
    ) -> Result<(), PersistenceError> {
        subscriber.validate().map_err(|e| PersistenceError::InvalidInput(e.to_string()))?;
        sqlx::query(subscriber_sql::UPSERT)
            .bind(&subscriber.id)
            .bind(subscriber.latitude)
            .bind(subscriber.longitude)
            .bind(subscriber.radius_km)
            .execute(&self.pool)
            .await
            .map_err(|e| operation_failed("add subscriber", e))?;
        Ok(())
    }

    /// Deletes a subscriber.
    pub async fn remove_subscriber(&self, id: &str) -> Result<(), PersistenceError> {
        let result = sqlx::query(subscriber_sql::DELETE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| operation_failed("remove subscriber", e))?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Fetches one subscriber regardless of its active flag.
    pub async fn get_subscriber(
        &self,
        id: &str,
    ) -> Result<Option<SubscriberGeofence>, PersistenceError> {
        sqlx::query_as::<_, SubscriberGeofence>(subscriber_sql::SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| operation_failed("get subscriber", e))
    }

    /// Pauses or resumes a subscriber without deleting it.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), PersistenceError> {
        let result = sqlx::query(subscriber_sql::SET_ACTIVE)
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| operation_failed("set subscriber active flag", e))?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Every subscriber, active or not, in insertion order.
    pub async fn list_subscribers(&self) -> Result<Vec<SubscriberGeofence>, PersistenceError> {
        sqlx::query_as::<_, SubscriberGeofence>(subscriber_sql::SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| operation_failed("list subscribers", e))
    }
}

#[async_trait]
impl SubscriberStore for SqliteSubscriberStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_active_subscribers(&self) -> Result<Vec<SubscriberGeofence>, PersistenceError> {
        sqlx::query_as::<_, SubscriberGeofence>(subscriber_sql::SELECT_ACTIVE)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| operation_failed("list active subscribers", e))
    }
}

fn operation_failed(operation: &str, error: sqlx::Error) -> PersistenceError {
    tracing::error!(error = %error, operation, "Database operation failed.");
    PersistenceError::OperationFailed(format!("Failed to {operation}: {error}"))
}
