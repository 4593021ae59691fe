//! Data models for the Hostwatch dashboard.
//!
//! This module contains the log record shape shared by the live and persisted
//! log pipelines, and the host snapshot value types.

pub mod log;
pub mod snapshot;

pub use log::{AppendLogRequest, LogRecord, PriorityFilter, Tier, UnknownTierError};
pub use snapshot::{DiskInfo, MetricsSnapshot, NetInfo};
