//! Display strings for the UI sink

use crate::sampler::Sample;
use serde::Serialize;

/// Preformatted readouts for one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiFields {
    /// `HH:MM:SS`
    pub elapsed: String,
    /// `lat, lng` with 6 decimals each
    pub coordinate: String,
    /// e.g. `42.17 km/h`
    pub speed: String,
    /// e.g. `1520.4 m`
    pub distance: String,
    pub playing: bool,
}

impl UiFields {
    pub fn from_sample(sample: &Sample, playing: bool) -> Self {
        Self {
            elapsed: format_elapsed(sample.elapsed_ms),
            coordinate: format!(
                "{:.6}, {:.6}",
                sample.coordinate.lat, sample.coordinate.lng
            ),
            speed: format!("{:.2} km/h", sample.speed.0),
            distance: format!("{:.1} m", sample.distance_traveled.0),
            playing,
        }
    }
}

/// Format milliseconds as zero-padded `HH:MM:SS`. Hours are not wrapped.
pub fn format_elapsed(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
