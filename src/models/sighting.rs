//! Sightings: an aircraft found inside a subscriber's geofence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{aircraft::AircraftState, airline::airline_for_callsign, subscriber::SubscriberGeofence};
use crate::geo::compass_direction;

/// Dedup key for one (subscriber, aircraft) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SightingKey {
    /// The subscriber identifier.
    pub subscriber_id: String,
    /// The aircraft's ICAO24 address.
    pub icao24: String,
}

impl SightingKey {
    /// Creates a new key.
    pub fn new(subscriber_id: impl Into<String>, icao24: impl Into<String>) -> Self {
        Self { subscriber_id: subscriber_id.into(), icao24: icao24.into() }
    }
}

impl fmt::Display for SightingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subscriber_id, self.icao24)
    }
}

/// Context about the batch query that produced a sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchContext {
    /// Position of the batch within the cycle.
    pub batch_index: usize,
    /// Number of subscribers sharing the query.
    pub batch_size: usize,
    /// Radius the query box was built from, in km.
    pub query_radius_km: f64,
}

/// The structured payload handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Subscriber to notify.
    pub subscriber_id: String,
    /// Aircraft ICAO24 address.
    pub icao24: String,
    /// Trimmed callsign, if any.
    pub callsign: Option<String>,
    /// Operator name derived from the callsign.
    pub airline: Option<String>,
    /// Aircraft latitude in degrees.
    pub latitude: f64,
    /// Aircraft longitude in degrees.
    pub longitude: f64,
    /// Barometric altitude in meters.
    pub altitude_m: Option<f64>,
    /// Ground speed in m/s.
    pub velocity_ms: Option<f64>,
    /// True track in degrees.
    pub track_deg: Option<f64>,
    /// Compass rendering of the track, e.g. `NE (45°)`.
    pub direction: Option<String>,
    /// Distance from the geofence center in km.
    pub distance_km: f64,
    /// When the sighting was made.
    pub observed_at: DateTime<Utc>,
    /// Batch query context.
    pub batch: BatchContext,
}

impl Sighting {
    /// Builds a sighting for an airborne aircraft inside a geofence.
    pub fn new(
        subscriber: &SubscriberGeofence,
        aircraft: &AircraftState,
        position: (f64, f64),
        distance_km: f64,
        observed_at: DateTime<Utc>,
        batch: BatchContext,
    ) -> Self {
        let (latitude, longitude) = position;
        Self {
            subscriber_id: subscriber.id.clone(),
            icao24: aircraft.icao24.clone(),
            callsign: aircraft.callsign.clone(),
            airline: aircraft
                .callsign
                .as_deref()
                .and_then(airline_for_callsign)
                .map(str::to_string),
            latitude,
            longitude,
            altitude_m: aircraft.baro_altitude_m,
            velocity_ms: aircraft.velocity_ms,
            track_deg: aircraft.true_track_deg,
            direction: aircraft.true_track_deg.map(compass_direction),
            distance_km,
            observed_at,
            batch,
        }
    }
}
