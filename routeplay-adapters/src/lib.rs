//! Route sources for RoutePlay

pub mod demo;
pub mod json_file;

pub use demo::DemoSource;
pub use json_file::JsonFileSource;
