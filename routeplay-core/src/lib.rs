//! RoutePlay Core Library
//!
//! This crate provides the route playback engine: the route model, the
//! playback clock, the position sampler and the source trait that feeds them.

pub mod clock;
pub mod control;
pub mod error;
pub mod format;
pub mod geo;
pub mod route;
pub mod sampler;
pub mod source;
pub mod units;

pub use clock::PlaybackClock;
pub use control::{Command, SpeedMultiplier};
pub use error::{ControlError, RouteError, RouteLoadError};
pub use geo::Coordinate;
pub use route::{RawPoint, Route, TimingSource, Waypoint};
pub use sampler::{sample_at, Sample};
pub use source::RouteSource;
