//! Partition store trait and implementations.
//!
//! Persisted logs live in one append-only partition per [`Tier`]. Each record
//! is one line of the form `<RFC 3339 timestamp> | <tier> | <message>`.
//! Partitions are created on first use and are never truncated here.

use crate::models::{LogRecord, Tier};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

/// Delimiter between the fields of a partition line.
pub const FIELD_DELIMITER: &str = " | ";

/// Errors that can occur during partition store operations.
#[derive(Debug, Error)]
pub enum PartitionStoreError {
    /// The partition could not be opened, read or written.
    #[error("I/O failure on {tier} partition: {source}")]
    Io {
        /// The addressed partition.
        tier: Tier,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on partition store")]
    LockError,
}

/// Formats one partition line, including the trailing newline.
///
/// # Example
///
/// ```
/// use shared::models::Tier;
/// use shared::storage::format_line;
///
/// let ts = "2024-01-15T10:30:00Z".parse().unwrap();
/// assert_eq!(
///     format_line(ts, Tier::High, "disk full"),
///     "2024-01-15T10:30:00Z | high | disk full\n"
/// );
/// ```
#[must_use]
pub fn format_line(timestamp: DateTime<Utc>, tier: Tier, message: &str) -> String {
    format!(
        "{}{FIELD_DELIMITER}{tier}{FIELD_DELIMITER}{message}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Parses one partition line back into a record.
///
/// Returns `None` unless the line splits into exactly three fields and the
/// middle field names a tier. The message may itself contain the delimiter.
#[must_use]
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let mut parts = line.splitn(3, FIELD_DELIMITER);
    let timestamp = parts.next()?;
    let level = parts.next()?.parse::<Tier>().ok()?;
    let message = parts.next()?;
    Some(LogRecord::new(timestamp, level, message))
}

/// Trait for partition storage implementations.
///
/// Implementations must be thread-safe (Send + Sync). No handle to a
/// partition outlives a single call.
pub trait PartitionStore: Send + Sync {
    /// Appends a message to the partition for `tier`, stamped with `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition cannot be opened or written.
    fn append_at(
        &self,
        tier: Tier,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), PartitionStoreError>;

    /// Appends a message to the partition for `tier`, stamped with the
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition cannot be opened or written.
    fn append(&self, tier: Tier, message: &str) -> Result<(), PartitionStoreError> {
        self.append_at(tier, Utc::now(), message)
    }

    /// Reads every well-formed record of the partition, oldest first.
    ///
    /// A partition that was never written reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition cannot be opened or read.
    fn read_all(&self, tier: Tier) -> Result<Vec<LogRecord>, PartitionStoreError>;
}

/// File-backed partition store.
///
/// Each tier maps to `<dir>/<tier>.log`. Appends open the file in append
/// mode and issue one write per line, so concurrent writers interleave at
/// line granularity. Reads rescan the whole file every time.
///
/// # Example
///
/// ```
/// use shared::models::Tier;
/// use shared::storage::{FilePartitionStore, PartitionStore};
///
/// let dir = std::env::temp_dir().join("hostwatch-doc-partitions");
/// let store = FilePartitionStore::new(&dir);
///
/// store.append(Tier::Medium, "fan speed high").unwrap();
/// let records = store.read_all(Tier::Medium).unwrap();
/// assert_eq!(records.last().unwrap().message, "fan speed high");
/// # std::fs::remove_dir_all(&dir).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FilePartitionStore {
    dir: PathBuf,
}

impl FilePartitionStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a new file partition store wrapped in an Arc.
    #[must_use]
    pub fn new_shared(dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self::new(dir))
    }

    /// Returns the directory holding the partition files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing the partition for `tier`.
    #[must_use]
    pub fn partition_path(&self, tier: Tier) -> PathBuf {
        self.dir.join(format!("{tier}.log"))
    }

    fn open(&self, tier: Tier, options: &OpenOptions) -> Result<fs::File, PartitionStoreError> {
        let io_err = |source| PartitionStoreError::Io { tier, source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        options.open(self.partition_path(tier)).map_err(io_err)
    }
}

impl PartitionStore for FilePartitionStore {
    fn append_at(
        &self,
        tier: Tier,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), PartitionStoreError> {
        let mut file = self.open(tier, OpenOptions::new().append(true).create(true))?;
        let line = format_line(timestamp, tier, message);
        file.write_all(line.as_bytes())
            .map_err(|source| PartitionStoreError::Io { tier, source })?;
        debug!(%tier, "Appended record to partition");
        Ok(())
    }

    fn read_all(&self, tier: Tier) -> Result<Vec<LogRecord>, PartitionStoreError> {
        let file = self.open(
            tier,
            OpenOptions::new().read(true).append(true).create(true),
        )?;

        // Invalid UTF-8 is decoded lossily; only the field split decides
        // whether a line is kept.
        let mut reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| PartitionStoreError::Io { tier, source })?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(record) = parse_line(line.trim_end_matches(['\n', '\r'])) {
                records.push(record);
            }
        }
        debug!(%tier, count = records.len(), "Read partition");
        Ok(records)
    }
}

/// In-memory partition store implementation.
///
/// Keeps the formatted partition lines in memory and parses them on read, so
/// it behaves like the file store without touching disk. Suitable for tests.
///
/// **Note:** Data is not persisted across restarts.
#[derive(Debug, Default)]
pub struct InMemoryPartitionStore {
    partitions: Arc<RwLock<HashMap<Tier, Vec<String>>>>,
}

impl InMemoryPartitionStore {
    /// Creates a new empty in-memory partition store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory partition store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl PartitionStore for InMemoryPartitionStore {
    fn append_at(
        &self,
        tier: Tier,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), PartitionStoreError> {
        let mut partitions = self
            .partitions
            .write()
            .map_err(|_| PartitionStoreError::LockError)?;
        let line = format_line(timestamp, tier, message);
        partitions
            .entry(tier)
            .or_default()
            .push(line.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn read_all(&self, tier: Tier) -> Result<Vec<LogRecord>, PartitionStoreError> {
        let partitions = self
            .partitions
            .read()
            .map_err(|_| PartitionStoreError::LockError)?;
        Ok(partitions
            .get(&tier)
            .map(|lines| lines.iter().filter_map(|line| parse_line(line)).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tokio_test::{assert_err, assert_ok};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_line_exactly_three_fields() {
        let record = parse_line("2024-01-15T10:30:00Z | medium | fan | speed").unwrap();
        assert_eq!(record.timestamp, "2024-01-15T10:30:00Z");
        assert_eq!(record.level, Tier::Medium);
        assert_eq!(record.message, "fan | speed");

        assert!(parse_line("").is_none());
        assert!(parse_line("2024-01-15T10:30:00Z | high").is_none());
        assert!(parse_line("garbage line").is_none());
        assert!(parse_line("2024-01-15T10:30:00Z | urgent | msg").is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new(dir.path());

        assert_ok!(store.append_at(Tier::High, ts("2024-01-01T00:00:00Z"), "first"));
        assert_ok!(store.append(Tier::High, "disk full"));

        let records = assert_ok!(store.read_all(Tier::High));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        let last = records.last().unwrap();
        assert_eq!(last.message, "disk full");
        assert_eq!(last.level, Tier::High);
        assert!(last.timestamp.parse::<DateTime<Utc>>().is_ok());
    }

    #[test]
    fn test_file_store_on_disk_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new(dir.path());

        assert_ok!(store.append_at(Tier::Low, ts("2024-03-02T08:09:10Z"), "boot ok"));

        let contents = fs::read_to_string(dir.path().join("low.log")).unwrap();
        assert_eq!(contents, "2024-03-02T08:09:10Z | low | boot ok\n");
    }

    #[test]
    fn test_read_unwritten_partition_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new(dir.path().join("nested").join("logs"));

        let records = assert_ok!(store.read_all(Tier::Medium));
        assert!(records.is_empty());
        assert!(store.partition_path(Tier::Medium).exists());
    }

    #[test]
    fn test_partitions_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new(dir.path());

        assert_ok!(store.append(Tier::High, "a"));
        assert_ok!(store.append(Tier::Low, "b"));

        assert_eq!(assert_ok!(store.read_all(Tier::High)).len(), 1);
        assert_eq!(assert_ok!(store.read_all(Tier::Low)).len(), 1);
        assert!(assert_ok!(store.read_all(Tier::Medium)).is_empty());
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new(dir.path());
        fs::write(
            store.partition_path(Tier::High),
            "not a record\n2024-01-01T00:00:00Z | high | kept\n\n",
        )
        .unwrap();

        let records = assert_ok!(store.read_all(Tier::High));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
    }

    #[test]
    fn test_invalid_utf8_line_does_not_fail_partition() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new(dir.path());

        assert_ok!(store.append_at(Tier::High, ts("2024-01-01T00:00:00Z"), "good one"));
        let mut file = OpenOptions::new()
            .append(true)
            .open(store.partition_path(Tier::High))
            .unwrap();
        file.write_all(b"2024-01-01T00:00:01Z | high | bad \xff byte\n")
            .unwrap();
        assert_ok!(store.append_at(Tier::High, ts("2024-01-01T00:00:02Z"), "good two"));

        let records = assert_ok!(store.read_all(Tier::High));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].message, "good one");
        assert_eq!(records[1].message, "bad \u{fffd} byte");
        assert_eq!(records[2].message, "good two");
    }

    #[test]
    fn test_unwritable_dir_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = FilePartitionStore::new(&blocker);

        let err = assert_err!(store.append(Tier::High, "x"));
        assert!(matches!(err, PartitionStoreError::Io { tier: Tier::High, .. }));
        assert!(store.read_all(Tier::Low).is_err());
    }

    #[test]
    fn test_concurrent_appends_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePartitionStore::new_shared(dir.path());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..25 {
                        store.append(Tier::Medium, &format!("writer {i} entry {j}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = assert_ok!(store.read_all(Tier::Medium));
        assert_eq!(records.len(), 200);
        assert!(records.iter().all(|r| r.message.starts_with("writer ")));
    }

    #[test]
    fn test_in_memory_store_matches_file_semantics() {
        let store = InMemoryPartitionStore::new();

        assert!(assert_ok!(store.read_all(Tier::High)).is_empty());
        assert_ok!(store.append_at(Tier::High, ts("2024-01-01T00:00:00Z"), "a | b"));

        let records = assert_ok!(store.read_all(Tier::High));
        assert_eq!(
            records,
            vec![LogRecord::new("2024-01-01T00:00:00Z", Tier::High, "a | b")]
        );
    }
}
