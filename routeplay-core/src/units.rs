//! Type-safe wrappers for physical units
//!
//! Distances and speeds travel through the engine as newtypes so that meters
//! never get mixed up with kilometers, or m/s with km/h.
//!
//! All unit types serialize with 4 decimal places to keep NDJSON frame logs compact.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Mul};

/// Round f64 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((*val * 10000.0).round() / 10000.0)
}

/// Meters
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Meters(#[serde(serialize_with = "round4")] pub f64);

impl Meters {
    pub const ZERO: Meters = Meters(0.0);
}

impl Add for Meters {
    type Output = Meters;

    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;

    fn mul(self, rhs: f64) -> Meters {
        Meters(self.0 * rhs)
    }
}

impl Sum for Meters {
    fn sum<I: Iterator<Item = Meters>>(iter: I) -> Meters {
        iter.fold(Meters::ZERO, Add::add)
    }
}

/// Meters per second
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MetersPerSecond(#[serde(serialize_with = "round4")] pub f64);

impl MetersPerSecond {
    /// Average speed over `distance` covered in `secs` seconds
    pub fn from_distance(distance: Meters, secs: f64) -> Self {
        Self(distance.0 / secs)
    }

    pub fn to_kmh(self) -> KilometersPerHour {
        KilometersPerHour(self.0 * 3.6)
    }
}

/// Kilometers per hour
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct KilometersPerHour(#[serde(serialize_with = "round4")] pub f64);

impl KilometersPerHour {
    pub const ZERO: KilometersPerHour = KilometersPerHour(0.0);
}
