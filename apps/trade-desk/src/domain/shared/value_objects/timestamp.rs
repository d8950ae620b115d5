//! Timestamp value object for temporal data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC instant used for quote freshness, preview expiry, and
/// ordering order-status snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a `DateTime<Utc>`.
    #[must_use]
    pub const fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not a valid RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let dt = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Format as RFC 3339.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// This instant shifted forward by `secs` seconds.
    #[must_use]
    pub fn plus_seconds(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// This instant shifted forward by `millis` milliseconds.
    #[must_use]
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// This instant shifted back by `days` days.
    #[must_use]
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Signed duration from `other` to `self`.
    #[must_use]
    pub fn duration_since(&self, other: Self) -> Duration {
        self.0 - other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn timestamp_parse_normalizes_offset() {
        let ts = at("2026-03-02T09:30:00-05:00");
        assert_eq!(ts.to_rfc3339(), "2026-03-02T14:30:00+00:00");
    }

    #[test]
    fn timestamp_parse_invalid() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn timestamp_ordering() {
        assert!(at("2026-03-02T14:30:00Z") < at("2026-03-02T14:30:01Z"));
    }

    #[test]
    fn timestamp_plus_seconds() {
        let ts = at("2026-03-02T14:30:00Z").plus_seconds(60);
        assert_eq!(ts, at("2026-03-02T14:31:00Z"));
    }

    #[test]
    fn timestamp_minus_days() {
        let ts = at("2026-03-09T00:00:00Z").minus_days(7);
        assert_eq!(ts, at("2026-03-02T00:00:00Z"));
    }

    #[test]
    fn timestamp_duration_since() {
        let dur = at("2026-03-02T15:00:00Z").duration_since(at("2026-03-02T14:00:00Z"));
        assert_eq!(dur.num_minutes(), 60);
    }

    #[test]
    fn timestamp_serializes_as_string() {
        let json = serde_json::to_string(&at("2026-03-02T14:30:00Z")).unwrap();
        assert!(json.starts_with('"'));
        assert!(json.contains("2026-03-02T14:30:00"));
    }
}
