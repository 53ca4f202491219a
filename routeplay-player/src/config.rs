//! Player configuration
//!
//! Layers, lowest precedence first: built-in defaults, an optional JSON
//! config file, then command-line flags.

use crate::driver::{LoopConfig, FRAME_INTERVAL};
use anyhow::{Context, Result};
use clap::Parser;
use routeplay_core::SpeedMultiplier;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("frame_interval_ms must be at least 1")]
    ZeroFrameInterval,
}

/// Command-line flags
#[derive(Debug, Default, Parser)]
#[command(name = "routeplay", version, about = "Replay a recorded route as a time-scaled animation")]
pub struct Cli {
    /// Route JSON file; the built-in demo drive is used when omitted
    pub route: Option<PathBuf>,

    /// JSON config file (default: <config dir>/routeplay/config.json if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial speed multiplier (> 0)
    #[arg(long, value_parser = parse_speed)]
    pub speed: Option<SpeedMultiplier>,

    /// Milliseconds between frames
    #[arg(long)]
    pub frame_interval_ms: Option<u64>,

    /// Start playing immediately
    #[arg(long)]
    pub autoplay: bool,

    /// Exit when the end of the route is reached
    #[arg(long)]
    pub exit_on_finish: bool,

    /// Write a render log as NDJSON
    #[arg(long)]
    pub ndjson_out: Option<PathBuf>,

    /// Disable the terminal status line
    #[arg(long)]
    pub quiet: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

fn parse_speed(s: &str) -> Result<SpeedMultiplier, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    SpeedMultiplier::new(value).map_err(|e| e.to_string())
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub route: Option<PathBuf>,
    pub speed: SpeedMultiplier,
    pub frame_interval_ms: u64,
    pub autoplay: bool,
    pub exit_on_finish: bool,
    pub ndjson_out: Option<PathBuf>,
    pub status_line: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            route: None,
            speed: SpeedMultiplier::NORMAL,
            frame_interval_ms: FRAME_INTERVAL.as_millis() as u64,
            autoplay: false,
            exit_on_finish: false,
            ndjson_out: None,
            status_line: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Resolve the effective configuration for `cli`
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let base = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        let config = base.merge_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Apply command-line overrides
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(route) = &cli.route {
            self.route = Some(route.clone());
        }
        if let Some(speed) = cli.speed {
            self.speed = speed;
        }
        if let Some(ms) = cli.frame_interval_ms {
            self.frame_interval_ms = ms;
        }
        if let Some(path) = &cli.ndjson_out {
            self.ndjson_out = Some(path.clone());
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        self.autoplay |= cli.autoplay;
        self.exit_on_finish |= cli.exit_on_finish;
        if cli.quiet {
            self.status_line = false;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        Ok(())
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            exit_on_finish: self.exit_on_finish,
        }
    }
}

/// `<config dir>/routeplay/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("routeplay").join("config.json"))
}
