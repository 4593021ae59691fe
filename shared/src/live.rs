//! Live operating-system log reading.
//!
//! Log sources are read fresh on every call and never persisted. Each line is
//! classified on the full raw text, then split into a two-token timestamp and
//! a message. Parsing is lenient: sources that cannot be opened are skipped
//! and lines with fewer than three whitespace-delimited tokens are dropped.

use crate::classify::classify;
use crate::models::LogRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Log files read on Linux hosts.
pub const LINUX_SOURCES: &[&str] = &[
    "/var/log/syslog",
    "/var/log/auth.log",
    "/var/log/kern.log",
    "/var/log/dmesg",
];

/// Log files read on macOS hosts.
pub const MACOS_SOURCES: &[&str] = &[
    "/var/log/system.log",
    "/var/log/install.log",
    "/var/log/wifi.log",
];

/// Windows event log channels. These are not files and are never read.
pub const WINDOWS_CHANNELS: &[&str] = &["Application", "System", "Security"];

/// The kind of log facility an OS family exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSet {
    /// Plain text files, one log line per text line.
    Files(&'static [&'static str]),
    /// Named channels of a non file-based facility.
    Channels(&'static [&'static str]),
}

const PLATFORM_SOURCES: &[(&str, SourceSet)] = &[
    ("linux", SourceSet::Files(LINUX_SOURCES)),
    ("macos", SourceSet::Files(MACOS_SOURCES)),
    ("windows", SourceSet::Channels(WINDOWS_CHANNELS)),
];

/// Returns the log sources configured for an OS family, as named by
/// [`std::env::consts::OS`].
#[must_use]
pub fn sources_for(os: &str) -> Option<SourceSet> {
    PLATFORM_SOURCES
        .iter()
        .find(|(name, _)| *name == os)
        .map(|(_, set)| *set)
}

/// Errors that can occur while reading live logs.
#[derive(Debug, Error)]
pub enum LiveLogError {
    /// A source was opened but reading from it failed.
    #[error("Failed to read log source {path}: {source}")]
    Io {
        /// The source being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A provider of live, classified log records.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait LiveLogSource: Send + Sync {
    /// Reads every available record, across all tiers, in source order.
    ///
    /// # Errors
    ///
    /// Returns an error if an opened source fails mid-read. Sources that
    /// cannot be opened at all are skipped.
    fn read_records(&self) -> Result<Vec<LogRecord>, LiveLogError>;
}

/// Reads plain-text log files.
#[derive(Debug, Clone, Default)]
pub struct LiveLogReader {
    paths: Vec<PathBuf>,
}

impl LiveLogReader {
    /// Creates a reader over the given files, read in order.
    #[must_use]
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a reader for the given OS family.
    ///
    /// Families without file-based sources get a reader that yields nothing.
    #[must_use]
    pub fn for_platform(os: &str) -> Self {
        match sources_for(os) {
            Some(SourceSet::Files(files)) => Self::from_paths(files.iter().copied()),
            Some(SourceSet::Channels(channels)) => {
                debug!(os, ?channels, "Log facility is not file-based, no live sources");
                Self::default()
            }
            None => {
                debug!(os, "No live log sources defined for platform");
                Self::default()
            }
        }
    }

    /// Creates a reader for the OS this binary was built for.
    #[must_use]
    pub fn for_current_platform() -> Self {
        Self::for_platform(std::env::consts::OS)
    }

    /// Returns the files this reader consults.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn read_file(path: &Path, records: &mut Vec<LogRecord>) -> Result<(), LiveLogError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unavailable log source");
                return Ok(());
            }
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| LiveLogError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(record) = normalize_line(line.trim_end_matches(['\n', '\r'])) {
                records.push(record);
            }
        }
        Ok(())
    }
}

impl LiveLogSource for LiveLogReader {
    fn read_records(&self) -> Result<Vec<LogRecord>, LiveLogError> {
        let mut records = Vec::new();
        for path in &self.paths {
            Self::read_file(path, &mut records)?;
        }
        debug!(count = records.len(), "Read live log records");
        Ok(records)
    }
}

/// Normalizes one raw line into a record.
///
/// The tier is taken from the whole line. The first two whitespace-delimited
/// tokens, joined by a single space, form the timestamp and the remainder is
/// the message. Returns `None` when the line has fewer than three tokens.
///
/// # Example
///
/// ```
/// use shared::live::normalize_line;
/// use shared::models::Tier;
///
/// let record = normalize_line("Jan 15 10:30:00 host kernel: error on sda").unwrap();
/// assert_eq!(record.timestamp, "Jan 15");
/// assert_eq!(record.message, "10:30:00 host kernel: error on sda");
/// assert_eq!(record.level, Tier::High);
///
/// assert!(normalize_line("Jan 15").is_none());
/// ```
#[must_use]
pub fn normalize_line(line: &str) -> Option<LogRecord> {
    let (first, second, message) = split_fields(line)?;
    Some(LogRecord::new(
        format!("{first} {second}"),
        classify(line),
        message,
    ))
}

/// Normalizes a sequence of raw lines, dropping malformed ones.
pub fn normalize_lines<I, S>(lines: I) -> Vec<LogRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| normalize_line(line.as_ref()))
        .collect()
}

/// Splits a line into at most three whitespace-delimited fields.
///
/// Whitespace runs between fields count as one delimiter, so whitespace
/// leading the message is not preserved. Whitespace inside the message is.
fn split_fields(line: &str) -> Option<(&str, &str, &str)> {
    let mut rest = line;
    let first = next_token(&mut rest)?;
    let second = next_token(&mut rest)?;
    let message = rest.trim_start();
    if message.is_empty() {
        return None;
    }
    Some((first, second, message))
}

fn next_token<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (token, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(token)
}
