use crate::models::SubscriberGeofence;

/// A builder for creating `SubscriberGeofence` instances in tests.
pub struct SubscriberBuilder {
    id: String,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
}

impl SubscriberBuilder {
    /// A 10 km geofence centered on Warsaw.
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), latitude: 52.2297, longitude: 21.0122, radius_km: 10.0 }
    }

    /// Sets the center.
    pub fn center(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Sets the radius.
    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Builds the `SubscriberGeofence` instance.
    pub fn build(self) -> SubscriberGeofence {
        SubscriberGeofence::new(self.id, self.latitude, self.longitude, self.radius_km)
    }
}
