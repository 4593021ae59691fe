//! Log record data model.
//!
//! Defines the severity [`Tier`], the [`LogRecord`] shape produced by both the
//! live OS log reader and the persisted partition store, and the
//! [`PriorityFilter`] used when querying.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Severity tier of a log record.
///
/// Every record carries exactly one tier. Tiers also name the persisted
/// partitions (`high.log`, `medium.log`, `low.log`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Errors, emergencies, alerts and critical conditions.
    High,
    /// Warnings.
    Medium,
    /// Everything else.
    Low,
}

impl Tier {
    /// All tiers, highest severity first.
    pub const ALL: [Tier; 3] = [Tier::High, Tier::Medium, Tier::Low];

    /// Returns the lowercase name of the tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tier: {0}")]
pub struct UnknownTierError(pub String);

impl FromStr for Tier {
    type Err = UnknownTierError;

    /// Parses a tier name. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(UnknownTierError(other.to_string())),
        }
    }
}

/// A single classified log line.
///
/// `timestamp` is kept as the raw text found in the source. Live OS lines
/// carry syslog-style stamps (`"Jan 15 10:30:00"`-ish), persisted lines carry
/// RFC 3339 stamps, and the two are never reconciled.
///
/// # Example
///
/// ```
/// use shared::models::{LogRecord, Tier};
///
/// let record = LogRecord::new("2024-01-15T10:30:00Z", Tier::High, "disk full");
/// let json = serde_json::to_value(&record).unwrap();
///
/// assert_eq!(json["level"], "high");
/// assert_eq!(json["message"], "disk full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp text as found in the source.
    pub timestamp: String,
    /// Severity tier.
    pub level: Tier,
    /// Message content.
    pub message: String,
}

impl LogRecord {
    /// Creates a new log record.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, level: Tier, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            level,
            message: message.into(),
        }
    }
}

/// Priority filter accepted by the log query routes.
///
/// Parsing never fails: values other than `all` and the three tier names
/// become [`PriorityFilter::Unmatched`], which retains no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Keep every record.
    All,
    /// Keep records of exactly this tier.
    Tier(Tier),
    /// An unrecognized filter value. Matches nothing.
    Unmatched(String),
}

impl PriorityFilter {
    /// Parses a filter value from a route segment.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            return Self::All;
        }
        match value.parse::<Tier>() {
            Ok(tier) => Self::Tier(tier),
            Err(UnknownTierError(other)) => Self::Unmatched(other),
        }
    }

    /// Returns true if the record passes this filter.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        match self {
            Self::All => true,
            Self::Tier(tier) => record.level == *tier,
            Self::Unmatched(_) => false,
        }
    }
}

impl std::fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Tier(tier) => write!(f, "{tier}"),
            Self::Unmatched(value) => f.write_str(value),
        }
    }
}

/// Request body for appending a message to a persisted partition.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppendLogRequest {
    /// The message to persist. Must fit on one partition line.
    #[validate(custom(function = "validate_single_line"))]
    pub message: String,
}

/// Rejects messages containing line breaks, which would split one record
/// across several partition lines.
fn validate_single_line(message: &str) -> Result<(), ValidationError> {
    if message.contains(['\n', '\r']) {
        let mut err = ValidationError::new("single_line");
        err.message = Some("Message must not contain line breaks".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::High.to_string(), "high");
        assert_eq!(Tier::Medium.to_string(), "medium");
        assert_eq!(Tier::Low.to_string(), "low");
    }

    #[test]
    fn test_tier_from_str_is_case_sensitive() {
        assert_eq!("high".parse::<Tier>(), Ok(Tier::High));
        assert_eq!("low".parse::<Tier>(), Ok(Tier::Low));
        assert_eq!(
            "HIGH".parse::<Tier>(),
            Err(UnknownTierError("HIGH".to_string()))
        );
        assert!("critical".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(serde_json::to_string(&Tier::Medium).unwrap(), "\"medium\"");
        let tier: Tier = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(tier, Tier::Low);
    }

    #[test]
    fn test_log_record_serialization_shape() {
        let record = LogRecord::new("Jan 15", Tier::Medium, "10:30:00 host warn: x");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["timestamp"], "Jan 15");
        assert_eq!(json["level"], "medium");
        assert_eq!(json["message"], "10:30:00 host warn: x");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_priority_filter_parse() {
        assert_eq!(PriorityFilter::parse("all"), PriorityFilter::All);
        assert_eq!(PriorityFilter::parse("high"), PriorityFilter::Tier(Tier::High));
        assert_eq!(
            PriorityFilter::parse("critical"),
            PriorityFilter::Unmatched("critical".to_string())
        );
        assert_eq!(
            PriorityFilter::parse("ALL"),
            PriorityFilter::Unmatched("ALL".to_string())
        );
    }

    #[test]
    fn test_priority_filter_matches() {
        let high = LogRecord::new("t", Tier::High, "m");
        let low = LogRecord::new("t", Tier::Low, "m");

        assert!(PriorityFilter::All.matches(&high));
        assert!(PriorityFilter::All.matches(&low));
        assert!(PriorityFilter::Tier(Tier::High).matches(&high));
        assert!(!PriorityFilter::Tier(Tier::High).matches(&low));
        assert!(!PriorityFilter::parse("critical").matches(&high));
    }

    #[test]
    fn test_append_request_validation() {
        let ok = AppendLogRequest {
            message: "disk full".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = AppendLogRequest {
            message: String::new(),
        };
        assert!(empty.validate().is_ok());

        let multi = AppendLogRequest {
            message: "line one\nline two".to_string(),
        };
        assert!(multi.validate().is_err());
    }
}
