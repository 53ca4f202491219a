//! Animation driver
//!
//! Sequences one frame at a time: measure the real delta since the previous
//! frame, advance the playback clock, sample the route, and forward the
//! result to the sinks. Control commands are applied between frames.
//!
//! [`Driver`] is the synchronous core; [`spawn`] runs it on a tokio task with
//! a frame timer, a command channel and a cancellation token.

use crate::sinks::{RenderFrame, RenderSink, UiSink};
use anyhow::Result;
use routeplay_core::clock::{ClockSnapshot, PlaybackClock};
use routeplay_core::format::UiFields;
use routeplay_core::geo::Coordinate;
use routeplay_core::sampler::{sample_at, Sample};
use routeplay_core::{Command, Route};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Default frame interval (~60Hz)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const COMMAND_BUFFER: usize = 32;

/// Everything produced by one emitted frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub sample: Sample,
    pub ui: UiFields,
    pub render: RenderFrame,
    pub clock: ClockSnapshot,
}

/// Append-only traveled path, deduplicated against the last point
#[derive(Debug, Clone)]
pub struct TraveledTrail {
    points: Vec<Coordinate>,
}

impl TraveledTrail {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            points: vec![origin],
        }
    }

    pub fn reset(&mut self, origin: Coordinate) {
        self.points.clear();
        self.points.push(origin);
    }

    /// Append `point` unless it equals the last one. Returns the appended point.
    pub fn push(&mut self, point: Coordinate) -> Option<Coordinate> {
        if self.points.last() == Some(&point) {
            return None;
        }
        self.points.push(point);
        Some(point)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }
}

/// Frame sequencer for one playback session
pub struct Driver {
    route: Arc<Route>,
    clock: PlaybackClock,
    trail: TraveledTrail,
    render_sinks: Vec<Box<dyn RenderSink>>,
    ui_sinks: Vec<Box<dyn UiSink>>,
    frames_tx: Option<broadcast::Sender<Frame>>,
    last_frame: Option<Instant>,
}

impl Driver {
    pub fn new(route: Arc<Route>) -> Self {
        let clock = PlaybackClock::new(&route);
        let trail = TraveledTrail::new(route.first().coordinate());
        Self {
            route,
            clock,
            trail,
            render_sinks: Vec::new(),
            ui_sinks: Vec::new(),
            frames_tx: None,
            last_frame: None,
        }
    }

    pub fn with_render_sink(mut self, sink: Box<dyn RenderSink>) -> Self {
        self.render_sinks.push(sink);
        self
    }

    pub fn with_ui_sink(mut self, sink: Box<dyn UiSink>) -> Self {
        self.ui_sinks.push(sink);
        self
    }

    /// Also publish every emitted frame on a broadcast channel
    pub fn with_broadcast(mut self, tx: broadcast::Sender<Frame>) -> Self {
        self.frames_tx = Some(tx);
        self
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn trail(&self) -> &TraveledTrail {
        &self.trail
    }

    /// Run one frame at real time `now`.
    ///
    /// Returns the emitted frame, or `None` if playback was paused for the
    /// whole frame. The frame that reaches the end of the route is emitted.
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        let real_delta_ms = self
            .last_frame
            .replace(now)
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64() * 1000.0)
            .unwrap_or(0.0);

        if !self.clock.is_playing() {
            return None;
        }

        self.clock.advance(real_delta_ms);
        let frame = self.emit();

        if !self.clock.is_playing() {
            info!(
                distance_m = frame.sample.distance_traveled.0,
                elapsed = %frame.ui.elapsed,
                "Reached end of route"
            );
        }

        Some(frame)
    }

    /// Apply a control command between frames.
    ///
    /// Returns a frame if the command required observers to be refreshed
    /// immediately (restart while paused).
    pub fn apply(&mut self, command: Command) -> Option<Frame> {
        debug!(?command, "Applying command");
        match command {
            Command::TogglePlay => {
                self.clock.toggle_play();
                None
            }
            Command::Play => {
                self.clock.play();
                None
            }
            Command::Pause => {
                self.clock.pause();
                None
            }
            Command::SetSpeed(speed) => {
                self.clock.set_speed(speed);
                info!(%speed, "Playback speed changed");
                None
            }
            Command::Restart => {
                self.clock.restart();
                let origin = self.route.first().coordinate();
                self.trail.reset(origin);
                for sink in &mut self.render_sinks {
                    if let Err(e) = sink.reset_trail(origin) {
                        warn!("Render sink error on reset: {}", e);
                    }
                }
                if self.clock.is_playing() {
                    None
                } else {
                    Some(self.emit())
                }
            }
        }
    }

    /// Sample the current simulated time and forward it to every sink
    pub fn emit(&mut self) -> Frame {
        let sample = sample_at(&self.route, self.clock.simulated_time());
        let ui = UiFields::from_sample(&sample, self.clock.is_playing());
        let render = RenderFrame {
            coordinate: sample.coordinate,
            full_path: self.route.path(),
            traveled_append: self.trail.push(sample.coordinate),
        };

        for sink in &mut self.render_sinks {
            if let Err(e) = sink.render(&render) {
                warn!("Render sink error: {}", e);
            }
        }
        for sink in &mut self.ui_sinks {
            if let Err(e) = sink.update(&ui) {
                warn!("UI sink error: {}", e);
            }
        }

        let frame = Frame {
            sample,
            ui,
            render,
            clock: self.clock.snapshot(),
        };

        if let Some(tx) = &self.frames_tx {
            // Ignore error if no receivers
            let _ = tx.send(frame.clone());
        }

        frame
    }
}

/// Settings for the background frame loop
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub frame_interval: Duration,
    /// Stop the loop once playback reaches the end of the route
    pub exit_on_finish: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_interval: FRAME_INTERVAL,
            exit_on_finish: false,
        }
    }
}

/// Handle to a running frame loop.
///
/// Dropping the handle cancels the loop; no frame fires after cancellation.
pub struct DriverHandle {
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
    task: JoinHandle<Driver>,
    _guard: DropGuard,
}

impl DriverHandle {
    /// Queue a command for the next gap between frames
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow::anyhow!("playback loop has stopped"))
    }

    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end on its own (finish or external cancel)
    pub async fn join(self) -> Result<Driver> {
        let DriverHandle { task, _guard, .. } = self;
        let driver = task.await?;
        Ok(driver)
    }

    /// Cancel the loop and wait for it to stop
    pub async fn shutdown(self) -> Result<Driver> {
        self.cancel.cancel();
        self.join().await
    }
}

/// Run `driver` on a tokio task
pub fn spawn(driver: Driver, config: LoopConfig) -> DriverHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run_loop(driver, rx, cancel.clone(), config));

    DriverHandle {
        commands: tx,
        _guard: cancel.clone().drop_guard(),
        cancel,
        task,
    }
}

async fn run_loop(
    mut driver: Driver,
    mut commands: mpsc::Receiver<Command>,
    cancel: CancellationToken,
    config: LoopConfig,
) -> Driver {
    let mut ticker = tokio::time::interval(config.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut commands_open = true;
    // exit_on_finish only counts once a frame has actually played
    let mut started = false;

    info!(
        interval_ms = config.frame_interval.as_millis() as u64,
        "Playback loop started"
    );

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            command = commands.recv(), if commands_open => match command {
                Some(command) => {
                    driver.apply(command);
                }
                None => commands_open = false,
            },

            now = ticker.tick() => {
                started |= driver.tick(now.into_std()).is_some();
                if config.exit_on_finish && started && driver.clock().is_finished() && !driver.clock().is_playing() {
                    break;
                }
            }
        }
    }

    info!("Playback loop ended");
    driver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_dedupes_consecutive_points() {
        let mut trail = TraveledTrail::new(Coordinate::new(0.0, 0.0));
        assert_eq!(trail.push(Coordinate::new(0.0, 0.0)), None);
        assert_eq!(
            trail.push(Coordinate::new(0.0, 0.1)),
            Some(Coordinate::new(0.0, 0.1))
        );
        assert_eq!(trail.push(Coordinate::new(0.0, 0.1)), None);
        assert_eq!(trail.points().len(), 2);
    }

    #[test]
    fn test_trail_reset() {
        let mut trail = TraveledTrail::new(Coordinate::new(0.0, 0.0));
        trail.push(Coordinate::new(1.0, 1.0));
        trail.reset(Coordinate::new(0.0, 0.0));
        assert_eq!(trail.points(), &[Coordinate::new(0.0, 0.0)]);
    }
}
