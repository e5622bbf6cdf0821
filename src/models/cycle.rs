//! Monitoring cycle states and result summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subscriber::SubscriberGeofence;

/// Phases of one monitoring cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    /// No cycle is running.
    #[default]
    Idle,
    /// Fetching subscribers from the store.
    LoadingSubscribers,
    /// Grouping subscribers into batches.
    Batching,
    /// Querying the feed batch by batch.
    Scanning,
    /// Building the result and evicting stale dedup entries.
    Aggregating,
}

/// Geofence echo included in each per-subscriber result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceSummary {
    /// Center latitude.
    pub lat: f64,
    /// Center longitude.
    pub lon: f64,
    /// Radius in km.
    pub radius_km: f64,
}

/// Outcome of one cycle for one subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberResult {
    /// The subscriber identifier.
    pub subscriber_id: String,
    /// The subscriber's geofence.
    pub location: GeofenceSummary,
    /// Airborne aircraft within the radius.
    pub planes_found: usize,
    /// Sightings that were not suppressed by the dedup cache.
    pub new_planes: usize,
    /// Notifications the sink failed to deliver.
    pub notification_failures: usize,
    /// Error that prevented evaluating this subscriber, if any.
    pub error: Option<String>,
}

impl SubscriberResult {
    /// An empty result for a subscriber.
    pub fn empty(subscriber: &SubscriberGeofence) -> Self {
        Self {
            subscriber_id: subscriber.id.clone(),
            location: GeofenceSummary {
                lat: subscriber.latitude,
                lon: subscriber.longitude,
                radius_km: subscriber.radius_km,
            },
            planes_found: 0,
            new_planes: 0,
            notification_failures: 0,
            error: None,
        }
    }

    /// An empty result carrying an error annotation.
    pub fn failed(subscriber: &SubscriberGeofence, error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::empty(subscriber) }
    }
}

/// Summary of one monitoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the cycle.
    pub duration_ms: u64,
    /// Subscribers loaded from the store.
    pub total_subscribers: usize,
    /// Batches formed from those subscribers.
    pub total_batches: usize,
    /// Feed queries issued (one per scanned batch, retries excluded).
    pub feed_queries: usize,
    /// Sum of `planes_found` over all subscribers.
    pub total_planes: usize,
    /// Sum of `new_planes` over all subscribers.
    pub new_planes: usize,
    /// Dedup cache size after eviction.
    pub tracked_sightings: usize,
    /// Dedup entries evicted at the end of the cycle.
    pub evicted: usize,
    /// The cycle was cancelled before scanning every batch.
    pub cancelled: bool,
    /// The cycle took longer than the configured cycle interval.
    pub overran: bool,
    /// Subscriber store failure that turned this cycle into a no-op.
    pub store_error: Option<String>,
    /// Per-subscriber breakdown.
    pub subscriber_results: Vec<SubscriberResult>,
}

impl CycleResult {
    /// A cycle result with zero totals.
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration_ms: 0,
            total_subscribers: 0,
            total_batches: 0,
            feed_queries: 0,
            total_planes: 0,
            new_planes: 0,
            tracked_sightings: 0,
            evicted: 0,
            cancelled: false,
            overran: false,
            store_error: None,
            subscriber_results: Vec::new(),
        }
    }

    /// Looks up the result for one subscriber.
    pub fn for_subscriber(&self, subscriber_id: &str) -> Option<&SubscriberResult> {
        self.subscriber_results.iter().find(|r| r.subscriber_id == subscriber_id)
    }
}
