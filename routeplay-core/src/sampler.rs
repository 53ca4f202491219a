//! Position sampler
//!
//! Maps a simulated instant onto the route: interpolated coordinate,
//! instantaneous speed, distance traveled and elapsed time.

use crate::geo::Coordinate;
use crate::route::Route;
use crate::units::{KilometersPerHour, Meters, MetersPerSecond};
use serde::Serialize;

/// Shortest segment duration used when deriving speed (seconds)
const MIN_SPEED_WINDOW_SECS: f64 = 1.0;

/// The route's state at one simulated instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub coordinate: Coordinate,
    pub speed: KilometersPerHour,
    pub distance_traveled: Meters,
    pub elapsed_ms: i64,
    /// Index of the segment containing the instant, `None` at the final point
    pub segment: Option<usize>,
}

/// Locate the segment `i` with `time[i] <= t <= time[i + 1]`.
///
/// When consecutive waypoints share a timestamp, the earliest matching
/// segment is returned. `None` means `t` lies outside every segment: at or
/// past the final point, before the first, or on a single-point route.
pub fn locate_segment(route: &Route, t: f64) -> Option<usize> {
    let waypoints = route.waypoints();
    if waypoints.len() < 2 || t >= route.end_time() as f64 || t < route.start_time() as f64 {
        return None;
    }

    // First segment whose end is at or after t
    let i = waypoints[1..].partition_point(|w| (w.time as f64) < t);
    (i < waypoints.len() - 1).then_some(i)
}

/// Sample the route at simulated time `t` (epoch milliseconds).
///
/// Out-of-range times are clamped to the first/last waypoint.
pub fn sample_at(route: &Route, t: f64) -> Sample {
    let start = route.start_time() as f64;
    let end = route.end_time() as f64;
    let t = t.clamp(start, end);
    let elapsed_ms = (t - start).round() as i64;

    let Some(i) = locate_segment(route, t) else {
        let last = route.last();
        return Sample {
            coordinate: last.coordinate(),
            speed: KilometersPerHour::ZERO,
            distance_traveled: route.total_distance(),
            elapsed_ms,
            segment: None,
        };
    };

    let from = route.waypoints()[i];
    let to = route.waypoints()[i + 1];

    let fraction = if from.duration_to_next == 0 {
        1.0
    } else {
        ((t - from.time as f64) / from.duration_to_next as f64).clamp(0.0, 1.0)
    };

    let secs = (from.duration_to_next as f64 / 1000.0).max(MIN_SPEED_WINDOW_SECS);
    let speed = MetersPerSecond::from_distance(from.distance_to_next, secs).to_kmh();

    Sample {
        coordinate: from.coordinate().lerp(to.coordinate(), fraction),
        speed,
        distance_traveled: route.distance_to(i) + from.distance_to_next * fraction,
        elapsed_ms,
        segment: Some(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RawPoint;

    fn equator_route() -> Route {
        Route::build(vec![
            RawPoint::timed(0.0, 0.0, 0),
            RawPoint::timed(0.0, 1.0, 10_000),
        ])
        .unwrap()
    }

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_midpoint_interpolation() {
        let s = sample_at(&equator_route(), 5000.0);
        assert!(approx(s.coordinate.lat, 0.0, 1e-12));
        assert!(approx(s.coordinate.lng, 0.5, 1e-12));
        assert_eq!(s.elapsed_ms, 5000);
        assert_eq!(s.segment, Some(0));
        assert!(approx(s.distance_traveled.0, 111_195.0 / 2.0, 1.0));
    }

    #[test]
    fn test_end_of_route() {
        let route = equator_route();
        let s = sample_at(&route, 10_000.0);
        assert_eq!(s.coordinate, Coordinate::new(0.0, 1.0));
        assert_eq!(s.speed, KilometersPerHour::ZERO);
        assert_eq!(s.distance_traveled, route.total_distance());
        assert!(approx(s.distance_traveled.0, 111_195.0, 1.0));
        assert_eq!(s.segment, None);
    }

    #[test]
    fn test_start_of_route() {
        let s = sample_at(&equator_route(), 0.0);
        assert_eq!(s.coordinate, Coordinate::new(0.0, 0.0));
        assert_eq!(s.distance_traveled, Meters::ZERO);
        assert_eq!(s.elapsed_ms, 0);
    }

    #[test]
    fn test_speed_in_kmh() {
        // ~111.195 km in 10 s
        let s = sample_at(&equator_route(), 2500.0);
        let expected = 111_194.93 / 10.0 * 3.6;
        assert!(approx(s.speed.0, expected, 1.0), "got {}", s.speed.0);
    }

    #[test]
    fn test_short_segment_speed_uses_one_second_floor() {
        let route = Route::build(vec![
            RawPoint::timed(0.0, 0.0, 0),
            RawPoint::timed(0.0, 0.001, 200),
        ])
        .unwrap();
        let s = sample_at(&route, 100.0);
        let expected = route.first().distance_to_next.0 * 3.6;
        assert!(approx(s.speed.0, expected, 1e-9));
    }

    #[test]
    fn test_out_of_range_clamps() {
        let route = equator_route();
        let before = sample_at(&route, -5000.0);
        assert_eq!(before.coordinate, Coordinate::new(0.0, 0.0));
        assert_eq!(before.elapsed_ms, 0);

        let after = sample_at(&route, 99_999.0);
        assert_eq!(after.coordinate, Coordinate::new(0.0, 1.0));
        assert_eq!(after.elapsed_ms, 10_000);
        assert_eq!(after.speed, KilometersPerHour::ZERO);
    }

    #[test]
    fn test_single_point_route() {
        let route = Route::build(vec![RawPoint::timed(45.0, 7.0, 1000)]).unwrap();
        for t in [0.0, 1000.0, 5000.0] {
            let s = sample_at(&route, t);
            assert_eq!(s.coordinate, Coordinate::new(45.0, 7.0));
            assert_eq!(s.speed, KilometersPerHour::ZERO);
            assert_eq!(s.distance_traveled, Meters::ZERO);
            assert_eq!(s.elapsed_ms, 0);
        }
    }

    #[test]
    fn test_shared_boundary_resolves_to_earlier_segment() {
        let route = Route::build(vec![
            RawPoint::timed(0.0, 0.0, 0),
            RawPoint::timed(0.0, 1.0, 1000),
            RawPoint::timed(0.0, 2.0, 2000),
        ])
        .unwrap();
        assert_eq!(locate_segment(&route, 1000.0), Some(0));
        let s = sample_at(&route, 1000.0);
        assert_eq!(s.coordinate, Coordinate::new(0.0, 1.0));
        assert!(approx(s.distance_traveled.0, route.distance_to(1).0, 1e-6));
    }

    #[test]
    fn test_zero_duration_segment_uses_full_fraction() {
        let route = Route::build(vec![
            RawPoint::timed(0.0, 0.0, 0),
            RawPoint::timed(0.0, 1.0, 1000),
            RawPoint::timed(0.0, 2.0, 1000),
            RawPoint::timed(0.0, 3.0, 2000),
        ])
        .unwrap();
        // Segment 0 wins the tie at t=1000
        assert_eq!(locate_segment(&route, 1000.0), Some(0));

        // Duplicate timestamps at the start land in the zero-length segment
        let dup_start = Route::build(vec![
            RawPoint::timed(0.0, 0.0, 0),
            RawPoint::timed(0.0, 1.0, 0),
            RawPoint::timed(0.0, 2.0, 1000),
        ])
        .unwrap();
        let s = sample_at(&dup_start, 0.0);
        assert_eq!(s.segment, Some(0));
        assert_eq!(s.coordinate, Coordinate::new(0.0, 1.0));
        assert!(approx(s.distance_traveled.0, dup_start.distance_to(1).0, 1e-6));
        assert!(s.speed.0.is_finite());
    }

    #[test]
    fn test_locate_matches_linear_scan() {
        let times = [0, 500, 500, 1200, 3000, 3000, 3000, 4000];
        let route = Route::build(
            times
                .iter()
                .enumerate()
                .map(|(i, &t)| RawPoint::timed(0.0, i as f64 * 0.01, t))
                .collect(),
        )
        .unwrap();
        let wps = route.waypoints();

        for t in (0..4000).step_by(50) {
            let t = t as f64;
            let linear = (0..wps.len() - 1)
                .find(|&i| wps[i].time as f64 <= t && t <= wps[i + 1].time as f64);
            assert_eq!(locate_segment(&route, t), linear, "t = {}", t);
        }
    }

    #[test]
    fn test_distance_is_monotonic() {
        let route = Route::build(vec![
            RawPoint::timed(51.50, -0.12, 0),
            RawPoint::timed(51.51, -0.11, 30_000),
            RawPoint::timed(51.52, -0.13, 30_000),
            RawPoint::timed(51.53, -0.10, 90_000),
        ])
        .unwrap();
        let mut previous = Meters::ZERO;
        for t in (0..=90_000).step_by(1000) {
            let s = sample_at(&route, t as f64);
            assert!(s.distance_traveled >= previous);
            previous = s.distance_traveled;
        }
        assert_eq!(previous, route.total_distance());
    }
}
