//! RoutePlay Player Library
//!
//! Exposes player components for integration testing.

pub mod config;
pub mod controls;
pub mod driver;
pub mod session;
pub mod sinks;
