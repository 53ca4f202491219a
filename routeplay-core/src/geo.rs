//! Great-circle distance between geographic coordinates

use crate::units::Meters;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the Earth's surface in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Linear interpolation of latitude and longitude.
    ///
    /// Not a great-circle slerp; good enough for the short segments of a
    /// recorded trajectory.
    pub fn lerp(self, other: Coordinate, fraction: f64) -> Coordinate {
        Coordinate {
            lat: self.lat + (other.lat - self.lat) * fraction,
            lng: self.lng + (other.lng - self.lng) * fraction,
        }
    }
}

/// Haversine distance between two coordinates.
///
/// Uses the `atan2` form, which stays well conditioned for coincident and
/// near-antipodal points.
pub fn distance(a: Coordinate, b: Coordinate) -> Meters {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlng = (dlng / 2.0).sin();

    // Rounding can push h a hair outside [0, 1] near antipodes
    let h = (sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng).clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    Meters(EARTH_RADIUS_M * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        let p = Coordinate::new(51.5074, -0.1278);
        assert_eq!(distance(p, p), Meters(0.0));
    }

    #[test]
    fn test_symmetry() {
        let a = Coordinate::new(48.8566, 2.3522);
        let b = Coordinate::new(52.5200, 13.4050);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let d = distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((d.0 - 111_195.0).abs() < 1.0, "got {}", d.0);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!(d.0.is_finite());
        assert!((d.0 - half).abs() < 1.0, "got {}", d.0);
    }

    #[test]
    fn test_lerp_midpoint() {
        let mid = Coordinate::new(0.0, 0.0).lerp(Coordinate::new(2.0, 4.0), 0.5);
        assert_eq!(mid, Coordinate::new(1.0, 2.0));
    }
}
