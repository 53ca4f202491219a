//! Playback session state

use crate::config::Config;
use crate::driver::{Driver, Frame};
use crate::sinks::{self, SinkSet};
use anyhow::Result;
use routeplay_core::{Command, Route, RouteLoadError, RouteSource, TimingSource};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Capacity of the frame broadcast channel
const FRAME_CHANNEL_CAPACITY: usize = 100;

/// One loaded route plus the channel its frames are published on
pub struct Session {
    route: Arc<Route>,

    /// Broadcast channel for emitted frames
    /// Multiple consumers can subscribe to receive frames
    frames_tx: broadcast::Sender<Frame>,
}

impl Session {
    /// Load and build the route from `source`
    pub fn load(source: &dyn RouteSource) -> Result<Self, RouteLoadError> {
        info!("Loading route from {}", source.name());
        let route = source.load_route()?;

        if route.timing() == TimingSource::Synthetic {
            warn!("Timestamps not found for all points, using fixed 5s intervals");
        }
        info!(
            waypoints = route.len(),
            distance_m = route.total_distance().0,
            duration_ms = route.total_duration(),
            "Route loaded"
        );

        Ok(Self::from_route(route))
    }

    pub fn from_route(route: Route) -> Self {
        let (frames_tx, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self {
            route: Arc::new(route),
            frames_tx,
        }
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Subscribe to emitted frames
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames_tx.subscribe()
    }

    /// Build a driver wired to `sinks` and this session's broadcast channel
    pub fn driver_with(&self, sinks: SinkSet) -> Driver {
        let mut driver = Driver::new(Arc::clone(&self.route)).with_broadcast(self.frames_tx.clone());
        for sink in sinks.render {
            driver = driver.with_render_sink(sink);
        }
        for sink in sinks.ui {
            driver = driver.with_ui_sink(sink);
        }
        driver
    }

    /// Build a driver from configuration: sinks, initial speed and autoplay
    pub fn driver(&self, config: &Config) -> Result<Driver> {
        let mut driver = self.driver_with(sinks::create_sinks(config)?);
        driver.apply(Command::SetSpeed(config.speed));
        // Initial frame so observers show the starting point
        driver.emit();
        if config.autoplay {
            driver.apply(Command::Play);
        }
        Ok(driver)
    }
}
