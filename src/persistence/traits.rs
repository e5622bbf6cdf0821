//! The subscriber store seam consumed by the monitoring engine.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::PersistenceError;
use crate::models::SubscriberGeofence;

/// Source of the geofences evaluated each cycle.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Returns every active subscriber in a stable order.
    async fn list_active_subscribers(&self) -> Result<Vec<SubscriberGeofence>, PersistenceError>;
}
