//! Error taxonomy
//!
//! Everything that can fail does so at load time or at the control boundary.
//! Once a [`Route`](crate::route::Route) exists, the clock and sampler are total.

use std::path::PathBuf;
use thiserror::Error;

/// Route construction failures
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route contains no points; check that the route source provides at least one waypoint")]
    Empty,

    #[error("waypoint {index} has timestamp {current} ms, earlier than the previous waypoint ({previous} ms)")]
    OutOfOrder {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("waypoint {index} has a non-finite latitude or longitude")]
    InvalidCoordinate { index: usize },
}

/// Route source failures (I/O, malformed JSON, bad timestamps)
#[derive(Debug, Error)]
pub enum RouteLoadError {
    #[error("failed to read route file {}: {source}; check the path and file permissions", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed route JSON: {source}; expected an array of {{latitude, longitude, timestamp}} records")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("waypoint {index} has unparseable timestamp {value:?}: {source}; use ISO-8601 (e.g. 2024-01-01T12:00:00Z) or null")]
    Timestamp {
        index: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Rejections at the control boundary
#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("invalid speed multiplier {0}: must be a finite number greater than zero")]
    InvalidSpeed(f64),

    #[error("unknown command {0:?}; expected toggle-play, play, pause, set-speed <n> or restart")]
    UnknownCommand(String),

    #[error("command {0} requires an argument")]
    MissingArgument(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_route_message_has_guidance() {
        let msg = RouteError::Empty.to_string();
        assert!(msg.contains("check that the route source"));
    }

    #[test]
    fn test_route_error_converts_into_load_error() {
        let err: RouteLoadError = RouteError::Empty.into();
        assert!(matches!(err, RouteLoadError::Route(RouteError::Empty)));
    }
}
