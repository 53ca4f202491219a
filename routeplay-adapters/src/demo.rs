//! Demo source that generates a synthetic drive for testing
//!
//! Dead-reckons a short city loop made of straights, turns and stops from a
//! configurable origin, emitting a recorded waypoint every few seconds. No
//! route file is needed.

use chrono::{DateTime, TimeZone, Utc};
use routeplay_core::error::RouteLoadError;
use routeplay_core::geo::{Coordinate, EARTH_RADIUS_M};
use routeplay_core::route::RawPoint;
use routeplay_core::source::RouteSource;

// =============================================================================
// Drive definition — a sequence of legs that form the loop
// =============================================================================

#[derive(Clone, Copy)]
enum LegKind {
    Cruise, // Steady heading and speed
    Turn,   // Heading sweeps toward the target
    Stop,   // Stationary (traffic light)
}

#[derive(Clone, Copy)]
struct Leg {
    kind: LegKind,
    duration: f64, // seconds
    speed: f64,    // m/s
    heading: f64,  // degrees at end of leg, 0 = north
}

/// A simple loop: ~6 min, roughly returns to the origin
fn demo_drive() -> Vec<Leg> {
    vec![
        Leg { kind: LegKind::Cruise, duration: 60.0, speed: 13.9, heading: 90.0 },
        Leg { kind: LegKind::Turn,   duration: 10.0, speed: 6.0,  heading: 180.0 },
        Leg { kind: LegKind::Cruise, duration: 45.0, speed: 11.1, heading: 180.0 },
        Leg { kind: LegKind::Stop,   duration: 20.0, speed: 0.0,  heading: 180.0 },
        Leg { kind: LegKind::Cruise, duration: 15.0, speed: 11.1, heading: 180.0 },
        Leg { kind: LegKind::Turn,   duration: 10.0, speed: 6.0,  heading: 270.0 },
        Leg { kind: LegKind::Cruise, duration: 60.0, speed: 13.9, heading: 270.0 },
        Leg { kind: LegKind::Turn,   duration: 10.0, speed: 6.0,  heading: 360.0 },
        Leg { kind: LegKind::Cruise, duration: 50.0, speed: 11.1, heading: 360.0 },
        Leg { kind: LegKind::Stop,   duration: 15.0, speed: 0.0,  heading: 360.0 },
        Leg { kind: LegKind::Cruise, duration: 10.0, speed: 8.0,  heading: 360.0 },
    ]
}

/// Simple deterministic noise from a seed
fn noise(seed: f64) -> f64 {
    let x = (seed * 12.9898 + 78.233).sin() * 43_758.547;
    x - x.floor()
}

/// Small jitter centered around 0
fn jitter(seed: f64, amplitude: f64) -> f64 {
    (noise(seed) - 0.5) * 2.0 * amplitude
}

/// Move `distance` meters from `from` along `heading` degrees (flat-earth step)
fn offset(from: Coordinate, heading: f64, distance: f64) -> Coordinate {
    let heading = heading.to_radians();
    let dlat = distance * heading.cos() / EARTH_RADIUS_M;
    let dlng = distance * heading.sin() / (EARTH_RADIUS_M * from.lat.to_radians().cos());
    Coordinate::new(from.lat + dlat.to_degrees(), from.lng + dlng.to_degrees())
}

// =============================================================================
// DemoSource
// =============================================================================

pub struct DemoSource {
    origin: Coordinate,
    start: DateTime<Utc>,
    sample_interval: f64,
    drive: Vec<Leg>,
}

impl DemoSource {
    /// Default origin: Amsterdam Centraal
    pub fn new() -> Self {
        Self::with_origin(Coordinate::new(52.3791, 4.9003))
    }

    pub fn with_origin(origin: Coordinate) -> Self {
        Self {
            origin,
            start: Utc
                .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            sample_interval: 5.0,
            drive: demo_drive(),
        }
    }

    /// Seconds between emitted waypoints (clamped to at least 0.1 s)
    pub fn sample_interval(mut self, secs: f64) -> Self {
        self.sample_interval = secs.max(0.1);
        self
    }

    /// Total simulated drive time in seconds
    pub fn duration_secs(&self) -> f64 {
        self.drive.iter().map(|l| l.duration).sum()
    }

    fn generate(&self) -> Vec<RawPoint> {
        let mut points = Vec::new();
        let mut position = self.origin;
        let mut heading = self.drive.first().map(|l| l.heading).unwrap_or_default();
        let mut elapsed = 0.0_f64;
        let mut n = 0.0_f64; // noise seed

        let start_ms = self.start.timestamp_millis();
        points.push(RawPoint::timed(position.lat, position.lng, start_ms));

        for leg in &self.drive {
            let steps = (leg.duration / self.sample_interval).ceil().max(1.0) as usize;
            let dt = leg.duration / steps as f64;
            let heading_step = (leg.heading - heading) / steps as f64;

            for _ in 0..steps {
                n += 1.0;
                if let LegKind::Turn = leg.kind {
                    heading += heading_step;
                }
                let speed = match leg.kind {
                    LegKind::Stop => 0.0,
                    LegKind::Cruise | LegKind::Turn => (leg.speed + jitter(n, 0.8)).max(0.0),
                };
                position = offset(position, heading + jitter(n * 1.7, 1.5), speed * dt);
                elapsed += dt;

                let time = start_ms + (elapsed * 1000.0).round() as i64;
                points.push(RawPoint::timed(position.lat, position.lng, time));
            }
            heading = leg.heading;
        }

        points
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSource for DemoSource {
    fn name(&self) -> &str {
        "Demo"
    }

    fn load(&self) -> Result<Vec<RawPoint>, RouteLoadError> {
        Ok(self.generate())
    }
}
