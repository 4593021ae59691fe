//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Output format of the server's own tracing logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `HOSTWATCH_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `HOSTWATCH_PORT`: The port to listen on (default: 8080)
/// - `HOSTWATCH_LOG_DIR`: Directory of the persisted partitions (default: "logs")
/// - `HOSTWATCH_LOG_SOURCES`: live log files joined with the platform path
///   separator (`:` on unix), replacing the platform defaults
/// - `HOSTWATCH_LOG_FORMAT`: `text` or `json` (default: "text")
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Directory holding `<tier>.log` partition files.
    pub log_dir: PathBuf,
    /// Live log files to read instead of the platform table.
    pub log_sources: Option<Vec<PathBuf>>,
    /// Format of the server's own logs.
    pub log_format: LogFormat,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `HOSTWATCH_PORT` is set but cannot be parsed as a valid port number
    /// - `HOSTWATCH_LOG_FORMAT` is set to an unknown format
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOSTWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("HOSTWATCH_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("HOSTWATCH_PORT is not a valid port")?
            .unwrap_or(8080);

        let log_dir = std::env::var("HOSTWATCH_LOG_DIR")
            .map_or_else(|_| PathBuf::from("logs"), PathBuf::from);

        let log_sources = std::env::var_os("HOSTWATCH_LOG_SOURCES")
            .map(|paths| std::env::split_paths(&paths).collect());

        let log_format = match std::env::var("HOSTWATCH_LOG_FORMAT").as_deref() {
            Err(_) | Ok("text") => LogFormat::Text,
            Ok("json") => LogFormat::Json,
            Ok(other) => bail!("Unknown HOSTWATCH_LOG_FORMAT: {other}"),
        };

        Ok(Self {
            host,
            port,
            log_dir,
            log_sources,
            log_format,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port cannot form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_dir: PathBuf::from("logs"),
            log_sources: None,
            log_format: LogFormat::Text,
        }
    }
}
