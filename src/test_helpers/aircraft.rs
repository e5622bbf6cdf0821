//! Builders for aircraft states and feed responses.

use serde_json::{Value, json};

use crate::models::AircraftState;

/// A builder for creating `AircraftState` instances in tests.
pub struct AircraftStateBuilder {
    state: AircraftState,
}

impl AircraftStateBuilder {
    /// Starts an airborne aircraft with no position.
    pub fn new(icao24: &str) -> Self {
        Self {
            state: AircraftState {
                icao24: icao24.to_lowercase(),
                callsign: None,
                origin_country: None,
                longitude: None,
                latitude: None,
                baro_altitude_m: None,
                on_ground: false,
                velocity_ms: None,
                true_track_deg: None,
                vertical_rate_ms: None,
            },
        }
    }

    /// Sets the position.
    pub fn position(mut self, latitude: f64, longitude: f64) -> Self {
        self.state.latitude = Some(latitude);
        self.state.longitude = Some(longitude);
        self
    }

    /// Sets the callsign.
    pub fn callsign(mut self, callsign: &str) -> Self {
        self.state.callsign = Some(callsign.to_string());
        self
    }

    /// Sets the barometric altitude in meters.
    pub fn altitude(mut self, meters: f64) -> Self {
        self.state.baro_altitude_m = Some(meters);
        self
    }

    /// Sets the true track in degrees.
    pub fn track(mut self, degrees: f64) -> Self {
        self.state.true_track_deg = Some(degrees);
        self
    }

    /// Marks the aircraft as on the ground.
    pub fn on_ground(mut self) -> Self {
        self.state.on_ground = true;
        self
    }

    /// Builds the `AircraftState` instance.
    pub fn build(self) -> AircraftState {
        self.state
    }
}

/// Encodes a state as the positional row the feed sends.
pub fn state_row(state: &AircraftState) -> Value {
    json!([
        state.icao24,
        state.callsign.as_ref().map(|c| format!("{c:<8}")),
        state.origin_country,
        null,
        null,
        state.longitude,
        state.latitude,
        state.baro_altitude_m,
        state.on_ground,
        state.velocity_ms,
        state.true_track_deg,
        state.vertical_rate_ms,
        null,
        null,
        null,
        false,
        0
    ])
}

/// A full feed response body for `states`.
pub fn feed_body(states: &[AircraftState]) -> String {
    let rows: Vec<Value> = states.iter().map(state_row).collect();
    json!({ "time": 1_700_000_000, "states": rows }).to_string()
}
