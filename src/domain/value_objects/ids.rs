//! # Identifiers
//!
//! Identifier value objects.
//!
//! - [`RequestId`]: time-ordered quote request identifier (UUID v7)
//! - [`SubscriptionId`]: tracking subscription acknowledgement identifier
//! - [`TrackingNumber`]: validated carrier tracking number

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum accepted tracking number length.
pub const MAX_TRACKING_NUMBER_LEN: usize = 64;

/// Identifier attached to each quote aggregation response.
///
/// Backed by a UUID v7, so identifiers sort by generation time and are
/// unique within (and across) processes.
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::value_objects::ids::RequestId;
///
/// let a = RequestId::generate();
/// let b = RequestId::generate();
/// assert_ne!(a, b);
/// assert!(a.to_string().starts_with("REQ_"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Wire prefix.
    pub const PREFIX: &'static str = "REQ_";

    /// Generates a new time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0.simple())
    }
}

impl Serialize for RequestId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifier returned when a client subscribes to tracking updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Wire prefix.
    pub const PREFIX: &'static str = "SUB_";

    /// Generates a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0.simple())
    }
}

impl Serialize for SubscriptionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A carrier tracking number.
///
/// # Invariants
///
/// - Trimmed and non-empty
/// - At most [`MAX_TRACKING_NUMBER_LEN`] characters
/// - ASCII alphanumerics and `-` only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Parses and validates a tracking number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the value is empty, too
    /// long, or contains unsupported characters.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::ValidationError(
                "tracking number is required".to_string(),
            ));
        }
        if value.len() > MAX_TRACKING_NUMBER_LEN {
            return Err(DomainError::ValidationError(format!(
                "tracking number must be at most {MAX_TRACKING_NUMBER_LEN} characters"
            )));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomainError::ValidationError(
                "tracking number may only contain letters, digits and '-'".to_string(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the tracking number as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TrackingNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrackingNumber> for String {
    fn from(value: TrackingNumber) -> Self {
        value.0
    }
}
