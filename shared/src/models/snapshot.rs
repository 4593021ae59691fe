//! Host metrics snapshot model.
//!
//! A [`MetricsSnapshot`] is a value object rebuilt from scratch for every
//! request. Field names serialize in camelCase to match the dashboard's JSON
//! contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Usage of a single mounted filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    /// Mount point.
    pub path: String,
    /// Total capacity, human formatted.
    pub total: String,
    /// Used capacity, human formatted.
    pub used: String,
    /// Used capacity as a percentage of total.
    pub used_percent: f64,
}

/// Counters for a single network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetInfo {
    /// Bytes transmitted, human formatted.
    pub bytes_sent: String,
    /// Bytes received, human formatted.
    pub bytes_recv: String,
    /// Packets transmitted.
    pub packets_sent: u64,
    /// Packets received.
    pub packets_recv: u64,
}

/// Point-in-time view of host resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Used memory percentage.
    pub memory_usage: f64,
    /// CPU load percentage, the mean of `cpu_cores`.
    pub cpu_usage: f64,
    /// Total memory, human formatted.
    pub formatted_total: String,
    /// Free memory, human formatted.
    pub formatted_free: String,
    /// Whole hours of uptime.
    pub uptime_hours: u64,
    /// Minutes of uptime past the last whole hour.
    pub uptime_minutes: u64,
    /// Seconds of uptime past the last whole minute.
    pub uptime_seconds: u64,
    /// Host name.
    pub hostname: String,
    /// Distribution or platform identifier.
    pub platform: String,
    /// Operating system family.
    pub os: String,
    /// Kernel architecture.
    pub kernel_arch: String,
    /// Load percentage per logical core.
    pub cpu_cores: Vec<f64>,
    /// Disk usage keyed by mount point.
    pub disk_usage: BTreeMap<String, DiskInfo>,
    /// Network counters keyed by interface name.
    #[serde(rename = "networkIO")]
    pub network_io: BTreeMap<String, NetInfo>,
}

impl MetricsSnapshot {
    /// Sets the three uptime fields from a total number of seconds.
    #[must_use]
    pub fn with_uptime(mut self, uptime_secs: u64) -> Self {
        self.uptime_hours = uptime_secs / 3600;
        self.uptime_minutes = (uptime_secs % 3600) / 60;
        self.uptime_seconds = uptime_secs % 60;
        self
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            memory_usage: 0.0,
            cpu_usage: 0.0,
            formatted_total: "0 B".to_string(),
            formatted_free: "0 B".to_string(),
            uptime_hours: 0,
            uptime_minutes: 0,
            uptime_seconds: 0,
            hostname: String::new(),
            platform: String::new(),
            os: std::env::consts::OS.to_string(),
            kernel_arch: std::env::consts::ARCH.to_string(),
            cpu_cores: Vec::new(),
            disk_usage: BTreeMap::new(),
            network_io: BTreeMap::new(),
        }
    }
}
