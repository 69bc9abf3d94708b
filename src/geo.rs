//! Great-circle distance between customer and merchant coordinates

use crate::error::{Result, ScoringError};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two coordinate pairs,
/// using the haversine formula.
///
/// Pure and symmetric: `haversine_km(a, b) == haversine_km(b, a)`.
/// Latitudes must lie in [-90, 90] and longitudes in [-180, 180];
/// anything else is an `InvalidCoordinate` error.
pub fn haversine_km(lat1: f64, long1: f64, lat2: f64, long2: f64) -> Result<f64> {
    for &(lat, long) in &[(lat1, long1), (lat2, long2)] {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
            return Err(ScoringError::InvalidCoordinate { lat, long });
        }
    }

    let (lat1, long1, lat2, long2) = (
        lat1.to_radians(),
        long1.to_radians(),
        lat2.to_radians(),
        long2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlong = long2 - long1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlong / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    Ok(EARTH_RADIUS_KM * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let d = haversine_km(40.7128, -74.0060, 40.7128, -74.0060).unwrap();
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_known_distance_nyc_la() {
        // NYC to LA is roughly 3936 km great-circle
        let d = haversine_km(40.7128, -74.0060, 34.0522, -118.2437).unwrap();
        assert!((d - 3936.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (40.7128, -74.0060, 34.0522, -118.2437),
            (-33.8688, 151.2093, 51.5074, -0.1278),
            (0.0, 0.0, 0.0, 179.9),
            (89.9, 10.0, -89.9, -170.0),
        ];
        for (lat1, long1, lat2, long2) in pairs {
            let ab = haversine_km(lat1, long1, lat2, long2).unwrap();
            let ba = haversine_km(lat2, long2, lat1, long1).unwrap();
            assert!((ab - ba).abs() < 1e-6, "asymmetric: {ab} vs {ba}");
        }
    }

    #[test]
    fn test_invalid_latitude() {
        assert!(matches!(
            haversine_km(90.5, 0.0, 0.0, 0.0),
            Err(ScoringError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_invalid_longitude() {
        assert!(matches!(
            haversine_km(0.0, 0.0, 0.0, -180.5),
            Err(ScoringError::InvalidCoordinate { .. })
        ));
    }
}
