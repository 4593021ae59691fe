//! Hostwatch CLI
//!
//! Command-line access to the Hostwatch log pipelines and host snapshots,
//! without a running server.
//!
//! # Usage
//!
//! ```bash
//! hostwatch --help
//! hostwatch classify "kernel: disk error"
//! hostwatch logs high
//! hostwatch logs all --persisted --log-dir ./logs
//! hostwatch logs medium --log-sources /var/log/syslog:/tmp/app.log
//! hostwatch append medium "fan speed high"
//! hostwatch metrics
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::classify::classify;
use shared::live::LiveLogReader;
use shared::models::{PriorityFilter, Tier};
use shared::query::{LogQueryService, LogSource};
use shared::snapshot::{SnapshotProvider, SysinfoSnapshotProvider};
use shared::storage::FilePartitionStore;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Hostwatch CLI - host metrics and classified OS logs
#[derive(Parser)]
#[command(name = "hostwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the persisted partitions
    #[arg(long, env = "HOSTWATCH_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Live log files joined with the platform path separator, replacing the
    /// platform defaults
    #[arg(long, env = "HOSTWATCH_LOG_SOURCES")]
    log_sources: Option<OsString>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the severity tier of a log line
    Classify {
        /// The raw log line
        line: String,
    },
    /// Query classified logs as JSON
    Logs {
        /// all, high, medium or low
        #[arg(default_value = "all")]
        priority: String,
        /// Read the persisted partitions instead of live OS logs
        #[arg(long)]
        persisted: bool,
    },
    /// Append a message to a persisted partition
    Append {
        /// high, medium or low
        tier: Tier,
        /// The message to persist
        message: String,
    },
    /// Print a host metrics snapshot as JSON
    Metrics,
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let live = match &cli.log_sources {
        Some(paths) => LiveLogReader::from_paths(std::env::split_paths(paths)),
        None => LiveLogReader::for_current_platform(),
    };
    let service = LogQueryService::new(
        Arc::new(live),
        FilePartitionStore::new_shared(&cli.log_dir),
    );

    match cli.command {
        Some(Commands::Classify { line }) => {
            writeln!(out, "{}", classify(&line))?;
        }
        Some(Commands::Logs {
            priority,
            persisted,
        }) => {
            let source = if persisted {
                LogSource::Persisted
            } else {
                LogSource::Live
            };
            let records = service.query(&PriorityFilter::parse(&priority), source)?;
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
        Some(Commands::Append { tier, message }) => {
            anyhow::ensure!(
                !message.contains(['\n', '\r']),
                "Message must not contain line breaks"
            );
            service
                .append(tier, &message)
                .with_context(|| format!("Failed to append to {}", cli.log_dir.display()))?;
            writeln!(out, "log written")?;
        }
        Some(Commands::Metrics) => {
            let snapshot = SysinfoSnapshotProvider::new().snapshot();
            serde_json::to_writer_pretty(&mut *out, &snapshot)?;
            writeln!(out)?;
        }
        None => {
            writeln!(out, "Hostwatch CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Use --help for usage information")?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock())
}
