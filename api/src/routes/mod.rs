//! API route definitions.
//!
//! This module organizes all HTTP routes for the Hostwatch API server.

mod health;
mod logs;
mod metrics;
mod pages;

pub use health::health_routes;
pub use logs::{logs_routes, AppendLogResponse, LogQueryParams};
pub use metrics::metrics_routes;
pub use pages::pages_routes;
