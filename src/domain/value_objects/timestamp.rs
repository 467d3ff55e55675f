//! # Timestamp Value Object
//!
//! DateTime wrapper with domain-specific methods.
//!
//! This module provides the [`Timestamp`] type used for quote validity
//! windows and tracking event times.
//!
//! # Examples
//!
//! ```
//! use shipping_engine::domain::value_objects::timestamp::Timestamp;
//!
//! let now = Timestamp::now();
//! let later = now.add_hours(24);
//!
//! assert!(later.is_after(&now));
//! ```

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp with millisecond wire precision.
///
/// Wraps `chrono::DateTime<Utc>`. Serializes as an RFC 3339 string.
///
/// # Invariants
///
/// - Always in UTC timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment, truncated to milliseconds.
    ///
    /// Truncation keeps wire round-trips exact.
    #[must_use]
    pub fn now() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self::from_millis(millis).unwrap_or_else(|| Self(Utc::now()))
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use shipping_engine::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_millis(1704067200000).unwrap();
    /// assert_eq!(ts.timestamp_millis(), 1704067200000);
    /// ```
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Creates a timestamp from Unix seconds.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Wraps an existing `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the Unix timestamp in milliseconds.
    #[inline]
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds seconds to the timestamp (can be negative).
    ///
    /// # Examples
    ///
    /// ```
    /// use shipping_engine::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_secs(1000).unwrap();
    /// assert_eq!(ts.add_secs(60).timestamp_secs(), 1060);
    /// ```
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        self.shifted(Duration::try_seconds(secs), secs >= 0)
    }

    /// Adds hours to the timestamp (can be negative).
    #[must_use]
    pub fn add_hours(&self, hours: i64) -> Self {
        self.shifted(Duration::try_hours(hours), hours >= 0)
    }

    /// Adds milliseconds to the timestamp (can be negative).
    #[must_use]
    pub fn add_millis(&self, millis: i64) -> Self {
        self.shifted(Duration::try_milliseconds(millis), millis >= 0)
    }

    /// Subtracts seconds from the timestamp.
    #[must_use]
    pub fn sub_secs(&self, secs: i64) -> Self {
        self.shifted(Duration::try_seconds(secs).map(|d| -d), secs <= 0)
    }

    /// Saturates at the representable range instead of overflowing.
    fn shifted(&self, delta: Option<Duration>, forward: bool) -> Self {
        match delta.and_then(|d| self.0.checked_add_signed(d)) {
            Some(dt) => Self(dt),
            None if forward => Self(DateTime::<Utc>::MAX_UTC),
            None => Self(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Returns true if this timestamp is strictly before another.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is strictly after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Returns the elapsed seconds from `earlier` to `self`.
    ///
    /// Negative when `earlier` is actually later.
    #[must_use]
    pub fn secs_since(&self, earlier: &Self) -> i64 {
        (self.0 - earlier.0).num_seconds()
    }

    /// Returns the calendar date (UTC).
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Returns the inner `DateTime<Utc>`.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Formats the timestamp as RFC 3339 with millisecond precision.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn now_is_millisecond_aligned() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn arithmetic() {
        let ts = Timestamp::from_secs(3_600).unwrap();
        assert_eq!(ts.add_hours(1).timestamp_secs(), 7_200);
        assert_eq!(ts.sub_secs(600).timestamp_secs(), 3_000);
        assert_eq!(ts.add_millis(1_500).timestamp_millis(), 3_601_500);
        assert_eq!(ts.add_hours(2).secs_since(&ts), 7_200);
    }

    #[test]
    fn ordering() {
        let a = Timestamp::from_secs(10).unwrap();
        let b = Timestamp::from_secs(20).unwrap();
        assert!(a.is_before(&b));
        assert!(b.is_after(&a));
        assert!(!a.is_after(&a));
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let ts = Timestamp::from_secs(1_000).unwrap();
        assert_eq!(ts.add_secs(i64::MAX), Timestamp(DateTime::<Utc>::MAX_UTC));
        assert_eq!(ts.add_hours(i64::MAX), Timestamp(DateTime::<Utc>::MAX_UTC));
        assert_eq!(ts.add_millis(i64::MIN), Timestamp(DateTime::<Utc>::MIN_UTC));
        assert_eq!(ts.sub_secs(i64::MAX), Timestamp(DateTime::<Utc>::MIN_UTC));
        assert_eq!(ts.sub_secs(60).timestamp_secs(), 940);
    }

    #[test]
    fn serde_round_trip() {
        let ts = Timestamp::from_millis(1_704_067_200_123).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn display_is_rfc3339() {
        let ts = Timestamp::from_secs(1_704_067_200).unwrap();
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00.000Z");
    }
}
