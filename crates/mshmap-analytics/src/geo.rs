//! Great-circle distance on a spherical Earth.

use mshmap_core::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
///
/// Symmetric in its arguments and zero for identical points. Non-finite
/// inputs propagate into the result rather than being rejected.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[must_use]
pub fn distance_between(a: Coordinates, b: Coordinates) -> f64 {
    distance_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS: &[(f64, f64)] = &[
        (51.4667, 11.3),
        (51.5275, 11.5481),
        (51.65, 11.5),
        (-33.8688, 151.2093),
        (0.0, 0.0),
        (89.9, -179.9),
    ];

    #[test]
    fn identical_points_are_zero() {
        for &(lat, lon) in POINTS {
            assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        for &(lat1, lon1) in POINTS {
            for &(lat2, lon2) in POINTS {
                let ab = distance_km(lat1, lon1, lat2, lon2);
                let ba = distance_km(lat2, lon2, lat1, lon1);
                assert!((ab - ba).abs() < 1e-9, "asymmetric: {ab} vs {ba}");
            }
        }
    }

    #[test]
    fn sangerhausen_to_eisleben_is_about_18_km() {
        let d = distance_km(51.4667, 11.3, 51.5275, 11.5481);
        assert!((d - 18.5).abs() < 1.0, "unexpected distance {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(50.0, 10.0, 51.0, 10.0);
        assert!((d - 111.19).abs() < 0.1, "unexpected distance {d}");
    }

    #[test]
    fn nan_propagates() {
        assert!(distance_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn coordinates_helper_matches_raw_call() {
        let a = Coordinates::new(51.4667, 11.3);
        let b = Coordinates::new(51.65, 11.5);
        assert_eq!(distance_between(a, b), distance_km(51.4667, 11.3, 51.65, 11.5));
    }
}
