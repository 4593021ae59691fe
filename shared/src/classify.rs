//! Keyword-based severity classification.
//!
//! A line is checked against the high tier keywords first, then the medium
//! tier keywords. Matching is an ASCII case-insensitive substring search.

use crate::models::Tier;

/// Keywords that put a line in the high tier.
pub const HIGH_KEYWORDS: &[&str] = &["error", "emergency", "alert", "critical"];

/// Keywords that put a line in the medium tier.
pub const MEDIUM_KEYWORDS: &[&str] = &["warning", "warn"];

/// Classifies a raw log line into a severity tier.
///
/// The first matching tier wins, so a line mentioning both `error` and
/// `warning` is [`Tier::High`]. Lines without any keyword, including empty
/// ones, are [`Tier::Low`].
///
/// # Example
///
/// ```
/// use shared::classify::classify;
/// use shared::models::Tier;
///
/// assert_eq!(classify("Disk ERROR on sda"), Tier::High);
/// assert_eq!(classify(""), Tier::Low);
/// ```
#[must_use]
pub fn classify(line: &str) -> Tier {
    let lower = line.to_ascii_lowercase();
    if contains_any(&lower, HIGH_KEYWORDS) {
        Tier::High
    } else if contains_any(&lower, MEDIUM_KEYWORDS) {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}
