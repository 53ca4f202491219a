//! Output sink implementations
//!
//! Render sinks draw the vehicle and its trail; UI sinks show the formatted
//! readouts. Both receive one call per emitted frame.

use crate::config::Config;
use anyhow::{Context, Result};
use routeplay_core::format::UiFields;
use routeplay_core::geo::Coordinate;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Per-frame drawing instructions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// Current vehicle position
    pub coordinate: Coordinate,
    /// The whole route, for the static backdrop
    #[serde(skip)]
    pub full_path: Arc<[Coordinate]>,
    /// Point to append to the traveled trail, if it moved since the last frame
    pub traveled_append: Option<Coordinate>,
}

/// Trait for anything that can draw a point and a path
pub trait RenderSink: Send {
    fn render(&mut self, frame: &RenderFrame) -> Result<()>;

    /// Clear the traveled trail back to a single point
    fn reset_trail(&mut self, origin: Coordinate) -> Result<()> {
        let _ = origin;
        Ok(())
    }
}

/// Trait for anything that can display the readouts
pub trait UiSink: Send {
    fn update(&mut self, fields: &UiFields) -> Result<()>;
}

/// Tracing sink: frames at `trace`, readouts at `debug`
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn render(&mut self, frame: &RenderFrame) -> Result<()> {
        trace!(
            lat = frame.coordinate.lat,
            lng = frame.coordinate.lng,
            appended = frame.traveled_append.is_some(),
            "render"
        );
        Ok(())
    }

    fn reset_trail(&mut self, origin: Coordinate) -> Result<()> {
        debug!(lat = origin.lat, lng = origin.lng, "Trail reset");
        Ok(())
    }
}

impl UiSink for LogSink {
    fn update(&mut self, fields: &UiFields) -> Result<()> {
        debug!(
            elapsed = %fields.elapsed,
            coordinate = %fields.coordinate,
            speed = %fields.speed,
            distance = %fields.distance,
            "ui"
        );
        Ok(())
    }
}

/// Single-line status display that rewrites itself in place
pub struct TerminalUi<W: Write + Send> {
    out: W,
}

impl TerminalUi<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> TerminalUi<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> UiSink for TerminalUi<W> {
    fn update(&mut self, fields: &UiFields) -> Result<()> {
        let state = if fields.playing { "Playing" } else { "Paused " };
        write!(
            self.out,
            "\r{} | {} | {} | {} | {}   ",
            state, fields.elapsed, fields.coordinate, fields.speed, fields.distance
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Render log written as NDJSON, one record per frame or trail reset
pub struct NdjsonSink {
    out: BufWriter<File>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NdjsonRecord<'a> {
    Frame(&'a RenderFrame),
    Reset { origin: Coordinate },
}

impl NdjsonSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open frame log {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    fn write_record(&mut self, record: &NdjsonRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl RenderSink for NdjsonSink {
    fn render(&mut self, frame: &RenderFrame) -> Result<()> {
        self.write_record(&NdjsonRecord::Frame(frame))
    }

    fn reset_trail(&mut self, origin: Coordinate) -> Result<()> {
        self.write_record(&NdjsonRecord::Reset { origin })?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for NdjsonSink {
    fn drop(&mut self) {
        let _ = self.out.flush();
    }
}

/// Sinks selected by configuration
pub struct SinkSet {
    pub render: Vec<Box<dyn RenderSink>>,
    pub ui: Vec<Box<dyn UiSink>>,
}

/// Create the configured sinks
pub fn create_sinks(config: &Config) -> Result<SinkSet> {
    let mut render: Vec<Box<dyn RenderSink>> = vec![Box::new(LogSink)];
    let mut ui: Vec<Box<dyn UiSink>> = vec![Box::new(LogSink)];

    if let Some(path) = &config.ndjson_out {
        render.push(Box::new(NdjsonSink::create(path)?));
    }
    if config.status_line {
        ui.push(Box::new(TerminalUi::stdout()));
    }

    Ok(SinkSet { render, ui })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> UiFields {
        UiFields {
            elapsed: "00:00:05".to_string(),
            coordinate: "0.000000, 0.500000".to_string(),
            speed: "40030.17 km/h".to_string(),
            distance: "55597.5 m".to_string(),
            playing: true,
        }
    }

    #[test]
    fn test_terminal_ui_writes_status_line() {
        let mut ui = TerminalUi::new(Vec::new());
        ui.update(&fields()).unwrap();
        let text = String::from_utf8(ui.into_inner()).unwrap();
        assert!(text.starts_with("\rPlaying | 00:00:05 | 0.000000, 0.500000"));
        assert!(text.contains("55597.5 m"));
    }

    #[test]
    fn test_ndjson_sink_writes_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.ndjson");
        let path_arc: Arc<[Coordinate]> = Arc::from(vec![Coordinate::new(0.0, 0.0)]);

        {
            let mut sink = NdjsonSink::create(&path).unwrap();
            sink.render(&RenderFrame {
                coordinate: Coordinate::new(0.0, 0.5),
                full_path: path_arc,
                traveled_append: Some(Coordinate::new(0.0, 0.5)),
            })
            .unwrap();
            sink.reset_trail(Coordinate::new(0.0, 0.0)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "frame");
        assert_eq!(lines[0]["coordinate"]["lng"], 0.5);
        assert!(lines[0].get("full_path").is_none());
        assert_eq!(lines[1]["kind"], "reset");
        assert_eq!(lines[1]["origin"]["lat"], 0.0);
    }
}
