//! Playback clock
//!
//! Tracks simulated time, play/pause state and the speed multiplier. The
//! clock is bounded by the route's time span: it never reports a time
//! outside `[start, end]`, and stops itself when it reaches the end.

use crate::control::SpeedMultiplier;
use crate::route::Route;
use serde::Serialize;

/// Simulated-time state machine for one playback session
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    start: i64,
    end: i64,
    /// Milliseconds; fractional so slow multipliers accumulate
    simulated_time: f64,
    playing: bool,
    speed: SpeedMultiplier,
    /// Next advance treats its real delta as zero
    resync_pending: bool,
}

/// Serializable view of the clock state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClockSnapshot {
    pub simulated_time: f64,
    pub playing: bool,
    pub speed: SpeedMultiplier,
}

impl PlaybackClock {
    pub fn new(route: &Route) -> Self {
        Self::with_bounds(route.start_time(), route.end_time())
    }

    pub fn with_bounds(start: i64, end: i64) -> Self {
        Self {
            start,
            end: end.max(start),
            simulated_time: start as f64,
            playing: false,
            speed: SpeedMultiplier::NORMAL,
            resync_pending: false,
        }
    }

    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    /// Simulated time rounded to whole milliseconds
    pub fn simulated_time_ms(&self) -> i64 {
        self.simulated_time.round() as i64
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> SpeedMultiplier {
        self.speed
    }

    /// True once simulated time sits at the end of the route
    pub fn is_finished(&self) -> bool {
        self.simulated_time >= self.end as f64
    }

    /// Flip play/pause. Returns the new playing state.
    pub fn toggle_play(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    pub fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.resync_pending = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Takes effect on the next advance
    pub fn set_speed(&mut self, speed: SpeedMultiplier) {
        self.speed = speed;
    }

    pub fn restart(&mut self) {
        self.simulated_time = self.start as f64;
    }

    /// Advance simulated time by a real-time delta.
    ///
    /// No-op while paused. The first advance after resuming ignores its
    /// delta, since it spans the paused interval. Reaching the end clamps to
    /// it and stops playback.
    pub fn advance(&mut self, real_delta_ms: f64) {
        if !self.playing {
            return;
        }

        let delta = if std::mem::take(&mut self.resync_pending) {
            0.0
        } else {
            real_delta_ms.max(0.0)
        };

        self.simulated_time += delta * self.speed.get();

        if self.simulated_time >= self.end as f64 {
            self.simulated_time = self.end as f64;
            self.playing = false;
        }
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            simulated_time: self.simulated_time,
            playing: self.playing,
            speed: self.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed(v: f64) -> SpeedMultiplier {
        SpeedMultiplier::new(v).unwrap()
    }

    fn playing_clock(start: i64, end: i64) -> PlaybackClock {
        let mut clock = PlaybackClock::with_bounds(start, end);
        clock.play();
        // Consume the resync frame
        clock.advance(0.0);
        clock
    }

    #[test]
    fn test_initial_state() {
        let clock = PlaybackClock::with_bounds(100, 900);
        assert_eq!(clock.simulated_time(), 100.0);
        assert!(!clock.is_playing());
        assert_eq!(clock.speed(), SpeedMultiplier::NORMAL);
    }

    #[test]
    fn test_advance_noop_when_paused() {
        let mut clock = PlaybackClock::with_bounds(0, 10_000);
        clock.advance(500.0);
        assert_eq!(clock.simulated_time(), 0.0);
    }

    #[test]
    fn test_first_advance_after_play_is_zero() {
        let mut clock = PlaybackClock::with_bounds(0, 10_000);
        assert!(clock.toggle_play());
        clock.advance(5000.0);
        assert_eq!(clock.simulated_time(), 0.0);
        clock.advance(100.0);
        assert_eq!(clock.simulated_time(), 100.0);
    }

    #[test]
    fn test_resume_after_pause_resyncs() {
        let mut clock = playing_clock(0, 100_000);
        clock.advance(1000.0);
        assert!(!clock.toggle_play());
        assert!(clock.toggle_play());
        // Stale delta spanning the pause is discarded
        clock.advance(60_000.0);
        assert_eq!(clock.simulated_time(), 1000.0);
    }

    #[test]
    fn test_speed_multiplier_scales_delta() {
        let mut clock = playing_clock(0, 10_000);
        clock.set_speed(speed(4.0));
        clock.advance(250.0);
        assert_eq!(clock.simulated_time(), 1000.0);
    }

    #[test]
    fn test_fractional_advance_accumulates() {
        let mut clock = playing_clock(0, 10_000);
        clock.set_speed(speed(0.25));
        for _ in 0..4 {
            clock.advance(1.0);
        }
        assert_eq!(clock.simulated_time(), 1.0);
    }

    #[test]
    fn test_clamps_at_end_and_stops() {
        let mut clock = playing_clock(0, 500);
        clock.set_speed(speed(2.0));
        clock.advance(1000.0);
        assert_eq!(clock.simulated_time(), 500.0);
        assert!(!clock.is_playing());
        assert!(clock.is_finished());
    }

    #[test]
    fn test_reaching_end_exactly_stops() {
        let mut clock = playing_clock(0, 500);
        clock.advance(500.0);
        assert_eq!(clock.simulated_time(), 500.0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut clock = playing_clock(1000, 5000);
        clock.advance(2000.0);
        clock.restart();
        let once = clock.snapshot();
        clock.restart();
        assert_eq!(clock.snapshot(), once);
        assert_eq!(clock.simulated_time(), 1000.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_time_stays_in_bounds_and_monotonic() {
        let mut clock = playing_clock(1000, 4000);
        clock.set_speed(speed(3.0));
        let mut previous = clock.simulated_time();
        for delta in [16.0, 33.0, 0.0, 250.0, 17.0, 1000.0, 16.0] {
            clock.advance(delta);
            let now = clock.simulated_time();
            assert!(now >= previous);
            assert!((1000.0..=4000.0).contains(&now));
            previous = now;
        }
    }

    #[test]
    fn test_zero_length_route() {
        let mut clock = PlaybackClock::with_bounds(42, 42);
        clock.play();
        clock.advance(0.0);
        assert_eq!(clock.simulated_time(), 42.0);
        assert!(!clock.is_playing());
    }
}
