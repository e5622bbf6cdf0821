//! Geofence math: great-circle distance and query bounding boxes.
//!
//! Inputs are WGS84 degrees and are not validated here; callers that accept
//! coordinates from outside (the subscriber store) validate them first.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Local approximation of kilometers per degree of latitude.
pub const KM_PER_DEGREE_LAT: f64 = 111.32;

/// Relative margin added to both spans of a bounding box.
///
/// 111.32 km/deg is slightly longer than a haversine degree (~111.195 km), so
/// an unpadded box would miss points right on the circle.
const BOX_MARGIN: f64 = 1.01;

/// Great-circle distance between two points, in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards against a > 1.0 from rounding on antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// A latitude/longitude rectangle used to narrow an upstream feed query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge in degrees.
    pub lat_min: f64,
    /// Northern edge in degrees.
    pub lat_max: f64,
    /// Western edge in degrees.
    pub lon_min: f64,
    /// Eastern edge in degrees.
    pub lon_max: f64,
}

impl BoundingBox {
    /// Returns true if the point lies inside the box (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            lat_min: self.lat_min.min(other.lat_min),
            lat_max: self.lat_max.max(other.lat_max),
            lon_min: self.lon_min.min(other.lon_min),
            lon_max: self.lon_max.max(other.lon_max),
        }
    }

    /// Whether the longitude range covers the whole globe.
    pub fn is_full_width(&self) -> bool {
        self.lon_min <= -180.0 && self.lon_max >= 180.0
    }
}

/// Computes a rectangle enclosing the circle of `radius_km` around a center.
///
/// Uses the degrees-per-km approximation, with the longitude span scaled by
/// the cosine of the box's poleward edge. Close to a pole, or when the span
/// would cross the antimeridian, the longitude range widens to the full
/// [-180, 180] so the box never leaves valid coordinates.
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let deg_lat = radius_km / KM_PER_DEGREE_LAT * BOX_MARGIN;
    let lat_min = (lat - deg_lat).max(-90.0);
    let lat_max = (lat + deg_lat).min(90.0);

    let poleward = (lat.abs() + deg_lat).min(90.0);
    let cos_edge = poleward.to_radians().cos();
    let deg_lon = radius_km / (KM_PER_DEGREE_LAT * cos_edge) * BOX_MARGIN;

    let (lon_min, lon_max) = (lon - deg_lon, lon + deg_lon);
    if poleward >= 90.0 || !deg_lon.is_finite() || lon_min < -180.0 || lon_max > 180.0 {
        return BoundingBox { lat_min, lat_max, lon_min: -180.0, lon_max: 180.0 };
    }

    BoundingBox { lat_min, lat_max, lon_min, lon_max }
}

/// Maps a track angle in degrees onto an 8-point compass rose, e.g. `NE (45°)`.
pub fn compass_direction(track_deg: f64) -> String {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = track_deg.rem_euclid(360.0);
    let index = (normalized / 45.0).round() as usize % DIRECTIONS.len();
    format!("{} ({}°)", DIRECTIONS[index], normalized.round() as i64 % 360)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Destination point at `distance_km` along `bearing_deg` from a center.
    fn destination(lat: f64, lon: f64, bearing_deg: f64, distance_km: f64) -> (f64, f64) {
        let delta = distance_km / EARTH_RADIUS_KM;
        let theta = bearing_deg.to_radians();
        let phi1 = lat.to_radians();
        let lambda1 = lon.to_radians();
        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
        let lon2 = (lambda2.to_degrees() + 180.0).rem_euclid(360.0) - 180.0;
        (phi2.to_degrees(), lon2)
    }

    #[test]
    fn test_distance_known_city_pair() {
        // Warsaw -> Krakow, roughly 252 km.
        let d = distance_km(52.2297, 21.0122, 50.0647, 19.9450);
        assert!((d - 252.0).abs() < 2.0, "unexpected distance {d}");
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_distance_antipodal_is_half_circumference() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_destination_helper_matches_distance() {
        let (lat, lon) = destination(52.2297, 21.0122, 90.0, 8.0);
        let d = distance_km(52.2297, 21.0122, lat, lon);
        assert!((d - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_near_pole_is_full_width() {
        let bbox = bounding_box(89.95, 10.0, 25.0);
        assert!(bbox.is_full_width());
        assert_eq!(bbox.lat_max, 90.0);
        assert!(bbox.lat_min < 89.95);
    }

    #[test]
    fn test_bounding_box_at_pole_does_not_panic() {
        let bbox = bounding_box(-90.0, 0.0, 5.0);
        assert!(bbox.is_full_width());
        assert_eq!(bbox.lat_min, -90.0);
    }

    #[test]
    fn test_bounding_box_across_antimeridian_is_full_width() {
        let east = bounding_box(10.0, 179.9, 50.0);
        assert!(east.is_full_width());
        assert_eq!((east.lon_min, east.lon_max), (-180.0, 180.0));

        let west = bounding_box(-35.0, -179.5, 80.0);
        assert!(west.is_full_width());
        assert!(west.contains(-35.0, 179.8));
    }

    #[test]
    fn test_bounding_box_near_antimeridian_stays_narrow() {
        let bbox = bounding_box(0.0, 179.0, 50.0);
        assert!(!bbox.is_full_width());
        assert!(bbox.lon_max <= 180.0);
    }

    #[test]
    fn test_bounding_box_is_centered() {
        let bbox = bounding_box(52.0, 21.0, 30.0);
        assert!(((bbox.lat_min + bbox.lat_max) / 2.0 - 52.0).abs() < 1e-9);
        assert!(((bbox.lon_min + bbox.lon_max) / 2.0 - 21.0).abs() < 1e-9);
        assert!(bbox.lon_max - bbox.lon_min > bbox.lat_max - bbox.lat_min);
    }

    #[test]
    fn test_union_covers_both_boxes() {
        let a = bounding_box(52.0, 21.0, 10.0);
        let b = bounding_box(52.1, 21.2, 10.0);
        let u = a.union(&b);
        assert_eq!(u.lat_min, a.lat_min);
        assert_eq!(u.lat_max, b.lat_max);
        assert_eq!(u.lon_min, a.lon_min);
        assert_eq!(u.lon_max, b.lon_max);
    }

    #[test]
    fn test_compass_direction() {
        assert_eq!(compass_direction(0.0), "N (0°)");
        assert_eq!(compass_direction(44.6), "NE (45°)");
        assert_eq!(compass_direction(180.0), "S (180°)");
        assert_eq!(compass_direction(350.0), "N (350°)");
        assert_eq!(compass_direction(-90.0), "W (270°)");
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let ab = distance_km(lat1, lon1, lat2, lon2);
            let ba = distance_km(lat2, lon2, lat1, lon1);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
        }

        #[test]
        fn prop_bounding_box_encloses_circle(
            lat in -80.0f64..=80.0,
            lon in -180.0f64..=180.0,
            radius_km in 0.5f64..=250.0,
            bearing in 0.0f64..360.0,
        ) {
            let bbox = bounding_box(lat, lon, radius_km);
            let (p_lat, p_lon) = destination(lat, lon, bearing, radius_km);
            prop_assert!(
                bbox.contains(p_lat, p_lon),
                "point ({}, {}) on the {} km circle escapes {:?}", p_lat, p_lon, radius_km, bbox
            );
        }

        #[test]
        fn prop_bounding_box_stays_in_range(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
            radius_km in 0.5f64..=250.0,
        ) {
            let bbox = bounding_box(lat, lon, radius_km);
            prop_assert!(bbox.lon_min >= -180.0 && bbox.lon_max <= 180.0, "{:?}", bbox);
            prop_assert!(bbox.lat_min >= -90.0 && bbox.lat_max <= 90.0, "{:?}", bbox);
        }
    }
}
