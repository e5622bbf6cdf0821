//! The subscriber geofence model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::geo::{self, BoundingBox};

/// Largest geofence radius a subscriber may register.
pub const MAX_RADIUS_KM: f64 = 100.0;

/// A subscriber's circular geofence.
///
/// Loaded fresh from the subscriber store at the start of every cycle and
/// never mutated by the monitoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SubscriberGeofence {
    /// Unique subscriber identifier (typically an email address).
    pub id: String,
    /// Center latitude in degrees (WGS84).
    pub latitude: f64,
    /// Center longitude in degrees (WGS84).
    pub longitude: f64,
    /// Geofence radius in kilometers.
    pub radius_km: f64,
}

/// Reasons a geofence cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceError {
    /// Latitude is not finite or outside [-90, 90].
    #[error("latitude {0} is out of range")]
    InvalidLatitude(f64),

    /// Longitude is not finite or outside [-180, 180].
    #[error("longitude {0} is out of range")]
    InvalidLongitude(f64),

    /// Radius is not finite, not positive, or above [`MAX_RADIUS_KM`].
    #[error("radius {0} km must be above 0 and at most 100 km")]
    InvalidRadius(f64),
}

impl SubscriberGeofence {
    /// Creates a new geofence.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self { id: id.into(), latitude, longitude, radius_km }
    }

    /// Checks that the coordinates and radius can be used for distance math.
    pub fn validate(&self) -> Result<(), GeofenceError> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(GeofenceError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(GeofenceError::InvalidLongitude(self.longitude));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 || self.radius_km > MAX_RADIUS_KM {
            return Err(GeofenceError::InvalidRadius(self.radius_km));
        }
        Ok(())
    }

    /// Great-circle distance from the geofence center to a point.
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        geo::distance_km(self.latitude, self.longitude, latitude, longitude)
    }

    /// Bounding box of this geofence widened by `buffer_km`.
    pub fn bounding_box(&self, buffer_km: f64) -> BoundingBox {
        geo::bounding_box(self.latitude, self.longitude, self.radius_km + buffer_km)
    }
}
