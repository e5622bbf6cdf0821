//! Aircraft state reports as delivered by the position feed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Positions of the fields inside one feed state row. The feed encodes each
/// aircraft as a fixed-position array, so the order here is part of the wire
/// format.
mod field {
    pub const ICAO24: usize = 0;
    pub const CALLSIGN: usize = 1;
    pub const ORIGIN_COUNTRY: usize = 2;
    pub const LONGITUDE: usize = 5;
    pub const LATITUDE: usize = 6;
    pub const BARO_ALTITUDE: usize = 7;
    pub const ON_GROUND: usize = 8;
    pub const VELOCITY: usize = 9;
    pub const TRUE_TRACK: usize = 10;
    pub const VERTICAL_RATE: usize = 11;
}

/// Errors raised while decoding a single state row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AircraftStateError {
    /// The row has no usable transponder identifier.
    #[error("state row has no icao24 identifier")]
    MissingIcao24,
}

/// One aircraft state vector.
///
/// Ephemeral: it only lives for the duration of one feed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    /// ICAO24 transponder address (hex string); the stable aircraft key.
    pub icao24: String,
    /// Callsign, trimmed. Absent when the feed sends none or a blank one.
    pub callsign: Option<String>,
    /// Country of registration reported by the feed.
    pub origin_country: Option<String>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Barometric altitude in meters.
    pub baro_altitude_m: Option<f64>,
    /// Whether the aircraft reports surface contact.
    pub on_ground: bool,
    /// Ground speed in m/s.
    pub velocity_ms: Option<f64>,
    /// True track in degrees clockwise from north.
    pub true_track_deg: Option<f64>,
    /// Vertical rate in m/s.
    pub vertical_rate_ms: Option<f64>,
}

impl AircraftState {
    /// Decodes a positional state row.
    pub fn from_row(row: &[Value]) -> Result<Self, AircraftStateError> {
        let icao24 = row
            .get(field::ICAO24)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AircraftStateError::MissingIcao24)?
            .to_lowercase();

        Ok(Self {
            icao24,
            callsign: string_at(row, field::CALLSIGN),
            origin_country: string_at(row, field::ORIGIN_COUNTRY),
            longitude: number_at(row, field::LONGITUDE),
            latitude: number_at(row, field::LATITUDE),
            baro_altitude_m: number_at(row, field::BARO_ALTITUDE),
            on_ground: row.get(field::ON_GROUND).and_then(Value::as_bool).unwrap_or(false),
            velocity_ms: number_at(row, field::VELOCITY),
            true_track_deg: number_at(row, field::TRUE_TRACK),
            vertical_rate_ms: number_at(row, field::VERTICAL_RATE),
        })
    }

    /// Returns `(latitude, longitude)` for an airborne aircraft with a known
    /// position, `None` otherwise.
    pub fn airborne_position(&self) -> Option<(f64, f64)> {
        if self.on_ground {
            return None;
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

fn string_at(row: &[Value], index: usize) -> Option<String> {
    row.get(index)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_at(row: &[Value], index: usize) -> Option<f64> {
    row.get(index).and_then(Value::as_f64)
}
