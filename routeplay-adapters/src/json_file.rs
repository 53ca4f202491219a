//! JSON route file source
//!
//! Reads an array of `{ "latitude", "longitude", "timestamp" }` records.
//! Timestamps are ISO-8601 strings or `null`/absent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use routeplay_core::error::RouteLoadError;
use routeplay_core::route::RawPoint;
use routeplay_core::source::RouteSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One record as it appears in a route file
#[derive(Debug, Deserialize)]
struct RouteRecord {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Route source backed by a JSON file on disk
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<RawPoint>, RouteLoadError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| RouteLoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_route_json(&contents)
    }
}

/// Parse route JSON text into raw points
pub fn parse_route_json(json: &str) -> Result<Vec<RawPoint>, RouteLoadError> {
    let records: Vec<RouteRecord> =
        serde_json::from_str(json).map_err(|source| RouteLoadError::Parse { source })?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let time = match record.timestamp.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(value) => Some(parse_timestamp(value).map_err(|source| {
                    RouteLoadError::Timestamp {
                        index,
                        value: value.to_string(),
                        source,
                    }
                })?),
            };
            Ok(RawPoint {
                lat: record.latitude,
                lng: record.longitude,
                time,
            })
        })
        .collect()
}

/// ISO-8601 date-times carrying an offset, beyond what RFC 3339 covers
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// ISO-8601 date-times without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp to epoch milliseconds.
///
/// Accepts RFC 3339, minute precision, basic offsets (`+0000`) and bare
/// dates (midnight UTC). A timestamp without an offset is read as UTC.
pub fn parse_timestamp(value: &str) -> Result<i64, chrono::ParseError> {
    let rfc_err = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => return Ok(dt.timestamp_millis()),
        Err(e) => e,
    };

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    {
        return Ok(dt.timestamp_millis());
    }

    // A trailing Z is UTC, same as no offset
    let local = value.strip_suffix(|c: char| c == 'Z' || c == 'z').unwrap_or(value);
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(local, fmt).ok())
    {
        return Ok(naive.and_utc().timestamp_millis());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
        .map_err(|_| rfc_err)
}
