use chrono::{TimeZone, Utc};

use crate::models::{BatchContext, Sighting};

/// A builder for creating `Sighting` instances in tests.
pub struct SightingBuilder {
    sighting: Sighting,
}

impl Default for SightingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SightingBuilder {
    /// A sighting of `48ae21` 8 km from a Warsaw subscriber.
    pub fn new() -> Self {
        Self {
            sighting: Sighting {
                subscriber_id: "a@example.com".to_string(),
                icao24: "48ae21".to_string(),
                callsign: None,
                airline: None,
                latitude: 52.2297,
                longitude: 21.1297,
                altitude_m: Some(10_668.0),
                velocity_ms: Some(230.0),
                track_deg: Some(90.0),
                direction: Some("E (90°)".to_string()),
                distance_km: 8.0,
                observed_at: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
                batch: BatchContext { batch_index: 0, batch_size: 1, query_radius_km: 20.0 },
            },
        }
    }

    /// Sets the subscriber id.
    pub fn subscriber(mut self, id: &str) -> Self {
        self.sighting.subscriber_id = id.to_string();
        self
    }

    /// Sets the callsign.
    pub fn callsign(mut self, callsign: &str) -> Self {
        self.sighting.callsign = Some(callsign.to_string());
        self
    }

    /// Sets the distance from the geofence center.
    pub fn distance_km(mut self, distance_km: f64) -> Self {
        self.sighting.distance_km = distance_km;
        self
    }

    /// Builds the `Sighting` instance.
    pub fn build(self) -> Sighting {
        self.sighting
    }
}
