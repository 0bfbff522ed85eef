//! HTTP API handlers for unm-server

pub mod engines;
pub mod health;
pub mod retrieve;
pub mod search;

pub use engines::list_engines;
pub use health::health_routes;
pub use retrieve::retrieve;
pub use search::search;
