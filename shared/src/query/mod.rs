//! Log query service.
//!
//! Combines a base sequence of records, taken either from live OS logs or from
//! the persisted partitions, with priority filtering, descending timestamp
//! ordering and a result cap.
//!
//! Ordering compares the raw timestamp text, not parsed dates. The cap is
//! applied as a tail slice of the descending sequence, so when more than
//! [`MAX_RESULTS`] records pass the filter the lexicographically *smallest*
//! ones are kept. Both behaviours are relied on by existing dashboards and
//! are kept as they are.

use crate::live::{LiveLogError, LiveLogSource};
use crate::models::{LogRecord, PriorityFilter, Tier};
use crate::storage::{PartitionStore, PartitionStoreError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Maximum number of records returned by a query.
pub const MAX_RESULTS: usize = 1000;

/// Errors that can occur while running a query.
///
/// Failures are propagated unchanged from the underlying source; there is no
/// retry anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Reading live OS logs failed.
    #[error(transparent)]
    Live(#[from] LiveLogError),

    /// Reading a persisted partition failed.
    #[error(transparent)]
    Store(#[from] PartitionStoreError),
}

/// Which of the two independent log surfaces a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    /// OS log files, read fresh.
    #[default]
    Live,
    /// Records appended through this service.
    Persisted,
}

impl FromStr for LogSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "persisted" => Ok(Self::Persisted),
            other => Err(format!("Unknown log source: {other}")),
        }
    }
}

/// Filters, sorts and caps a sequence of records.
///
/// # Example
///
/// ```
/// use shared::models::{LogRecord, PriorityFilter, Tier};
/// use shared::query::apply;
///
/// let records = vec![
///     LogRecord::new("2024-01-01", Tier::High, "a"),
///     LogRecord::new("2024-01-03", Tier::Low, "b"),
///     LogRecord::new("2024-01-02", Tier::High, "c"),
/// ];
///
/// let result = apply(records, &PriorityFilter::Tier(Tier::High));
/// let stamps: Vec<_> = result.iter().map(|r| r.timestamp.as_str()).collect();
/// assert_eq!(stamps, ["2024-01-02", "2024-01-01"]);
/// ```
#[must_use]
pub fn apply(records: Vec<LogRecord>, filter: &PriorityFilter) -> Vec<LogRecord> {
    let mut retained: Vec<LogRecord> = records
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect();

    retained.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    if retained.len() > MAX_RESULTS {
        let excess = retained.len() - MAX_RESULTS;
        retained.drain(..excess);
    }
    retained
}

/// Query service over the live and persisted log surfaces.
///
/// The two surfaces share only the record shape. Appends go to the partition
/// store; the live path never sees them.
#[derive(Clone)]
pub struct LogQueryService {
    live: Arc<dyn LiveLogSource>,
    store: Arc<dyn PartitionStore>,
}

impl LogQueryService {
    /// Creates a query service over the given sources.
    pub fn new(live: Arc<dyn LiveLogSource>, store: Arc<dyn PartitionStore>) -> Self {
        Self { live, store }
    }

    /// Runs a query against the selected surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails.
    pub fn query(
        &self,
        filter: &PriorityFilter,
        source: LogSource,
    ) -> Result<Vec<LogRecord>, QueryError> {
        match source {
            LogSource::Live => self.live(filter),
            LogSource::Persisted => self.persisted(filter),
        }
    }

    /// Queries live OS logs.
    ///
    /// # Errors
    ///
    /// Returns an error if an opened log source fails mid-read.
    pub fn live(&self, filter: &PriorityFilter) -> Result<Vec<LogRecord>, QueryError> {
        let records = self.live.read_records()?;
        let result = apply(records, filter);
        debug!(%filter, count = result.len(), "Live log query");
        Ok(result)
    }

    /// Queries persisted partitions.
    ///
    /// `all` reads the three partitions, highest tier first. A filter that
    /// names no tier reads nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if an addressed partition cannot be read.
    pub fn persisted(&self, filter: &PriorityFilter) -> Result<Vec<LogRecord>, QueryError> {
        let records = match filter {
            PriorityFilter::All => {
                let mut all = Vec::new();
                for tier in Tier::ALL {
                    all.extend(self.store.read_all(tier)?);
                }
                all
            }
            PriorityFilter::Tier(tier) => self.store.read_all(*tier)?,
            PriorityFilter::Unmatched(_) => Vec::new(),
        };
        let result = apply(records, filter);
        debug!(%filter, count = result.len(), "Persisted log query");
        Ok(result)
    }

    /// Appends a message to a persisted partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition cannot be opened or written.
    pub fn append(&self, tier: Tier, message: &str) -> Result<(), QueryError> {
        self.store.append(tier, message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveLogReader;
    use crate::storage::InMemoryPartitionStore;
    use tokio_test::assert_ok;

    struct FixedLive(Vec<LogRecord>);

    impl LiveLogSource for FixedLive {
        fn read_records(&self) -> Result<Vec<LogRecord>, LiveLogError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLive;

    impl LiveLogSource for FailingLive {
        fn read_records(&self) -> Result<Vec<LogRecord>, LiveLogError> {
            Err(LiveLogError::Io {
                path: "/var/log/syslog".into(),
                source: std::io::Error::other("device gone"),
            })
        }
    }

    fn service(live: impl LiveLogSource + 'static) -> LogQueryService {
        LogQueryService::new(Arc::new(live), InMemoryPartitionStore::new_shared())
    }

    fn day(n: usize) -> String {
        format!("2024-01-{n:02}")
    }

    #[test]
    fn test_apply_sorts_descending_lexicographically() {
        let records = vec![
            LogRecord::new("Jan 9", Tier::Low, "a"),
            LogRecord::new("2024-01-01T00:00:00Z", Tier::Low, "b"),
            LogRecord::new("Jan 10", Tier::Low, "c"),
        ];

        let result = apply(records, &PriorityFilter::All);
        let stamps: Vec<_> = result.iter().map(|r| r.timestamp.as_str()).collect();

        // Plain string order: "Jan 9" > "Jan 10" > "2024-..."
        assert_eq!(stamps, ["Jan 9", "Jan 10", "2024-01-01T00:00:00Z"]);
    }

    #[test]
    fn test_apply_filters_exact_tier() {
        let records = vec![
            LogRecord::new("1", Tier::High, "h"),
            LogRecord::new("2", Tier::Medium, "m"),
            LogRecord::new("3", Tier::Low, "l"),
        ];

        let result = apply(records.clone(), &PriorityFilter::Tier(Tier::Medium));
        assert_eq!(result, vec![LogRecord::new("2", Tier::Medium, "m")]);

        assert!(apply(records, &PriorityFilter::parse("critical")).is_empty());
    }

    #[test]
    fn test_apply_cap_keeps_smallest_after_descending_sort() {
        // 15 distinct days, 100 records each.
        let records: Vec<LogRecord> = (0..1500)
            .map(|i| LogRecord::new(day(i % 15 + 1), Tier::High, format!("r{i}")))
            .collect();

        let result = apply(records, &PriorityFilter::All);

        assert_eq!(result.len(), MAX_RESULTS);
        // Sorted 15..01, the tail slice drops days 15..11 and keeps 10..01.
        assert_eq!(result.first().unwrap().timestamp, day(10));
        assert_eq!(result.last().unwrap().timestamp, day(1));
        assert!(result.iter().all(|r| r.timestamp.as_str() <= "2024-01-10"));
        assert!(result.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_apply_under_cap_is_untouched() {
        let records: Vec<LogRecord> = (1..=15)
            .map(|n| LogRecord::new(day(n), Tier::Low, "x"))
            .collect();

        let result = apply(records, &PriorityFilter::All);
        assert_eq!(result.len(), 15);
        assert_eq!(result[0].timestamp, day(15));
    }

    #[test]
    fn test_live_query_filters_live_records() {
        let svc = service(FixedLive(vec![
            LogRecord::new("Jan 15", Tier::High, "a"),
            LogRecord::new("Jan 16", Tier::Low, "b"),
        ]));

        let high = assert_ok!(svc.live(&PriorityFilter::Tier(Tier::High)));
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].message, "a");

        let all = assert_ok!(svc.query(&PriorityFilter::All, LogSource::Live));
        assert_eq!(all[0].timestamp, "Jan 16");
    }

    #[test]
    fn test_live_failure_propagates() {
        let svc = service(FailingLive);
        let err = svc.live(&PriorityFilter::All).unwrap_err();
        assert!(matches!(err, QueryError::Live(_)));
        assert!(err.to_string().contains("device gone"));
    }

    #[test]
    fn test_appends_do_not_reach_live_surface() {
        let svc = service(LiveLogReader::default());

        assert_ok!(svc.append(Tier::High, "disk full"));

        assert!(assert_ok!(svc.live(&PriorityFilter::All)).is_empty());
        let persisted = assert_ok!(svc.persisted(&PriorityFilter::Tier(Tier::High)));
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].message, "disk full");
        assert_eq!(persisted[0].level, Tier::High);
    }

    #[test]
    fn test_persisted_all_reads_every_partition() {
        let svc = service(LiveLogReader::default());
        assert_ok!(svc.append(Tier::High, "h"));
        assert_ok!(svc.append(Tier::Medium, "m"));
        assert_ok!(svc.append(Tier::Low, "l"));

        let all = assert_ok!(svc.query(&PriorityFilter::All, LogSource::Persisted));
        assert_eq!(all.len(), 3);

        let none = assert_ok!(svc.persisted(&PriorityFilter::parse("critical")));
        assert!(none.is_empty());
    }

    #[test]
    fn test_log_source_from_str() {
        assert_eq!("live".parse::<LogSource>(), Ok(LogSource::Live));
        assert_eq!("persisted".parse::<LogSource>(), Ok(LogSource::Persisted));
        assert!("archive".parse::<LogSource>().is_err());
        assert_eq!(LogSource::default(), LogSource::Live);
    }
}
