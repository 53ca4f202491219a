//! Route model
//!
//! A [`Route`] is the immutable, fully-derived form of a recorded trajectory:
//! every waypoint knows the distance and duration to its successor, and the
//! route carries cumulative distances so that sampling never rescans it.

use crate::error::RouteError;
use crate::geo::{self, Coordinate};
use crate::units::Meters;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Spacing between synthesized timestamps when the source has no timing
pub const SYNTHETIC_INTERVAL_MS: i64 = 5000;

/// A point as delivered by a route source, before timestamp resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub lat: f64,
    pub lng: f64,
    /// Epoch milliseconds, if the source recorded one
    pub time: Option<i64>,
}

impl RawPoint {
    pub fn timed(lat: f64, lng: f64, time: i64) -> Self {
        Self {
            lat,
            lng,
            time: Some(time),
        }
    }

    pub fn untimed(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            time: None,
        }
    }
}

/// Where a route's timestamps came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    /// Every point carried a timestamp from the source
    Recorded,
    /// At least one point lacked a timestamp; fixed 5 s spacing was applied
    Synthetic,
}

/// A single timestamped waypoint with derived segment data
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    /// Epoch milliseconds
    pub time: i64,
    /// Great-circle distance to the next waypoint (zero for the last one)
    pub distance_to_next: Meters,
    /// Milliseconds until the next waypoint (zero for the last one)
    pub duration_to_next: i64,
}

impl Waypoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Immutable trajectory with precomputed distances and durations
#[derive(Debug, Clone)]
pub struct Route {
    waypoints: Vec<Waypoint>,
    /// Distance from the first waypoint to waypoint `i`
    cumulative: Vec<Meters>,
    path: Arc<[Coordinate]>,
    total_distance: Meters,
    timing: TimingSource,
}

impl Route {
    /// Build a route, synthesizing timestamps from the current wall clock if
    /// any point lacks one.
    pub fn build(raw: Vec<RawPoint>) -> Result<Self, RouteError> {
        Self::build_with_epoch(raw, Utc::now().timestamp_millis())
    }

    /// Build a route, using `epoch_ms` as the first synthetic timestamp if
    /// the timing fallback applies.
    pub fn build_with_epoch(raw: Vec<RawPoint>, epoch_ms: i64) -> Result<Self, RouteError> {
        if raw.is_empty() {
            return Err(RouteError::Empty);
        }

        if let Some(index) = raw
            .iter()
            .position(|p| !p.lat.is_finite() || !p.lng.is_finite())
        {
            return Err(RouteError::InvalidCoordinate { index });
        }

        let timing = if raw.iter().all(|p| p.time.is_some()) {
            TimingSource::Recorded
        } else {
            TimingSource::Synthetic
        };

        let mut waypoints: Vec<Waypoint> = raw
            .iter()
            .enumerate()
            .map(|(i, p)| Waypoint {
                lat: p.lat,
                lng: p.lng,
                time: match timing {
                    TimingSource::Recorded => p.time.unwrap_or_default(),
                    TimingSource::Synthetic => epoch_ms + i as i64 * SYNTHETIC_INTERVAL_MS,
                },
                distance_to_next: Meters::ZERO,
                duration_to_next: 0,
            })
            .collect();

        for i in 1..waypoints.len() {
            let (previous, current) = (waypoints[i - 1].time, waypoints[i].time);
            if current < previous {
                return Err(RouteError::OutOfOrder {
                    index: i,
                    previous,
                    current,
                });
            }
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut total_distance = Meters::ZERO;
        cumulative.push(Meters::ZERO);
        for i in 0..waypoints.len() - 1 {
            let next = waypoints[i + 1];
            let wp = &mut waypoints[i];
            wp.distance_to_next = geo::distance(wp.coordinate(), next.coordinate());
            wp.duration_to_next = next.time - wp.time;
            total_distance = total_distance + wp.distance_to_next;
            cumulative.push(total_distance);
        }

        let path = waypoints.iter().map(Waypoint::coordinate).collect();

        Ok(Self {
            waypoints,
            cumulative,
            path,
            total_distance,
            timing,
        })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; a route has at least one waypoint by construction
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    pub fn last(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    pub fn start_time(&self) -> i64 {
        self.first().time
    }

    pub fn end_time(&self) -> i64 {
        self.last().time
    }

    pub fn total_distance(&self) -> Meters {
        self.total_distance
    }

    pub fn total_duration(&self) -> i64 {
        self.end_time() - self.start_time()
    }

    /// Distance from the first waypoint to waypoint `index`
    pub fn distance_to(&self, index: usize) -> Meters {
        self.cumulative[index]
    }

    /// The whole route as coordinates, shared with render sinks
    pub fn path(&self) -> Arc<[Coordinate]> {
        Arc::clone(&self.path)
    }

    pub fn timing(&self) -> TimingSource {
        self.timing
    }

    pub fn is_synthetic(&self) -> bool {
        self.timing == TimingSource::Synthetic
    }
}
