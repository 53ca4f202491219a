//! Route source trait definition

use crate::error::RouteLoadError;
use crate::route::{RawPoint, Route};

/// Trait for anything that can supply a trajectory
///
/// Each source is responsible for:
/// - Fetching the raw records (file, generator, ...)
/// - Converting timestamps to epoch milliseconds, leaving absent ones as `None`
///
/// Sources are consumed once at load time; there is no retry.
pub trait RouteSource: Send + Sync {
    /// Human-readable name of this source (e.g. a file path, "Demo")
    fn name(&self) -> &str;

    /// Read the ordered raw points
    fn load(&self) -> Result<Vec<RawPoint>, RouteLoadError>;

    /// Load and build the route in one step
    fn load_route(&self) -> Result<Route, RouteLoadError> {
        let raw = self.load()?;
        Ok(Route::build(raw)?)
    }
}
