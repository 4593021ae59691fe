//! Hostwatch Shared Library
//!
//! This crate contains the log classification and retrieval pipeline and the
//! host snapshot types used across the Hostwatch dashboard.
//!
//! # Modules
//!
//! - [`models`] - Log records, severity tiers and snapshot value types
//! - [`classify`] - Keyword-based severity classification
//! - [`live`] - Reading and normalizing operating-system log files
//! - [`storage`] - Severity-partitioned, append-only log storage
//! - [`query`] - Filtering, ordering and capping of log records
//! - [`snapshot`] - Point-in-time host metrics sampling
//!
//! # Example
//!
//! ```
//! use shared::classify::classify;
//! use shared::models::Tier;
//!
//! assert_eq!(classify("kernel: CRITICAL temperature reached"), Tier::High);
//! assert_eq!(classify("sshd: warn: slow response"), Tier::Medium);
//! assert_eq!(classify("cron: job finished"), Tier::Low);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod classify;
pub mod live;
pub mod models;
pub mod query;
pub mod snapshot;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
