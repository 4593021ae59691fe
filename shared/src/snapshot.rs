//! Point-in-time host metrics sampling.
//!
//! Every call to [`SnapshotProvider::snapshot`] builds a fresh
//! [`MetricsSnapshot`]; nothing is cached or averaged across calls.

use crate::models::{DiskInfo, MetricsSnapshot, NetInfo};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};
use tracing::debug;

/// Window over which CPU load is measured.
pub const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// A source of host metrics snapshots.
///
/// Implementations may block; callers on an async runtime should run them on
/// the blocking thread pool.
pub trait SnapshotProvider: Send + Sync {
    /// Samples the host.
    fn snapshot(&self) -> MetricsSnapshot;
}

/// Snapshot provider backed by the `sysinfo` crate.
///
/// Each snapshot blocks the calling thread for the CPU sample window.
#[derive(Debug, Clone)]
pub struct SysinfoSnapshotProvider {
    sample_window: Duration,
}

impl SysinfoSnapshotProvider {
    /// Creates a provider sampling CPU load over [`CPU_SAMPLE_WINDOW`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            sample_window: CPU_SAMPLE_WINDOW,
        }
    }

    /// Overrides the CPU sample window. It is never shorter than the minimum
    /// interval `sysinfo` needs between two CPU refreshes.
    #[must_use]
    pub fn with_sample_window(mut self, window: Duration) -> Self {
        self.sample_window = window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self
    }
}

impl Default for SysinfoSnapshotProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for SysinfoSnapshotProvider {
    fn snapshot(&self) -> MetricsSnapshot {
        let mut sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::everything()),
        );
        std::thread::sleep(self.sample_window);
        sys.refresh_cpu_usage();

        let cpu_cores: Vec<f64> = sys
            .cpus()
            .iter()
            .map(|cpu| f64::from(cpu.cpu_usage()))
            .collect();
        let cpu_usage = mean_load(&cpu_cores);

        let total_memory = sys.total_memory();
        let memory_usage = percent(sys.used_memory(), total_memory);

        let disks = Disks::new_with_refreshed_list();
        let disk_usage = disks
            .list()
            .iter()
            .map(|disk| {
                let path = disk.mount_point().to_string_lossy().into_owned();
                let total = disk.total_space();
                let used = total.saturating_sub(disk.available_space());
                let info = DiskInfo {
                    path: path.clone(),
                    total: format_bytes(total),
                    used: format_bytes(used),
                    used_percent: percent(used, total),
                };
                (path, info)
            })
            .collect();

        let networks = Networks::new_with_refreshed_list();
        let network_io = networks
            .list()
            .iter()
            .map(|(name, data)| {
                let info = NetInfo {
                    bytes_sent: format_bytes(data.total_transmitted()),
                    bytes_recv: format_bytes(data.total_received()),
                    packets_sent: data.total_packets_transmitted(),
                    packets_recv: data.total_packets_received(),
                };
                (name.clone(), info)
            })
            .collect();

        debug!(cores = cpu_cores.len(), "Sampled host metrics");

        MetricsSnapshot {
            memory_usage,
            cpu_usage,
            formatted_total: format_bytes(total_memory),
            formatted_free: format_bytes(sys.free_memory()),
            hostname: System::host_name().unwrap_or_default(),
            platform: System::distribution_id(),
            os: std::env::consts::OS.to_string(),
            kernel_arch: std::env::consts::ARCH.to_string(),
            cpu_cores,
            disk_usage,
            network_io,
            ..MetricsSnapshot::default()
        }
        .with_uptime(System::uptime())
    }
}

/// Averages per-core loads. No cores reads as idle.
#[allow(clippy::cast_precision_loss)]
fn mean_load(cores: &[f64]) -> f64 {
    if cores.is_empty() {
        0.0
    } else {
        cores.iter().sum::<f64>() / cores.len() as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

const SI_UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count with SI (base 1000) units.
///
/// Values below 10 bytes are printed exactly. Larger values are rounded to
/// one decimal, which is only shown while the scaled value is below 10.
///
/// # Example
///
/// ```
/// use shared::snapshot::format_bytes;
///
/// assert_eq!(format_bytes(7), "7 B");
/// assert_eq!(format_bytes(82_854_982), "83 MB");
/// assert_eq!(format_bytes(1_500_000_000), "1.5 GB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{bytes} B");
    }

    let mut exponent = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1000.0 && exponent < SI_UNITS.len() - 1 {
        scaled /= 1000.0;
        exponent += 1;
    }

    let rounded = (scaled * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{rounded:.1} {}", SI_UNITS[exponent])
    } else {
        format!("{rounded:.0} {}", SI_UNITS[exponent])
    }
}
