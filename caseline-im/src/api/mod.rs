//! HTTP API handlers for caseline-im

pub mod health;
pub mod imports;

pub use health::health_routes;
pub use imports::import_routes;
