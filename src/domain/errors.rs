//! # Domain Errors
//!
//! Error types for business rule violations.

use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::tracking_status::TrackingStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Domain layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Generic validation failure with a field-level message.
    #[error("{0}")]
    ValidationError(String),

    /// A package dimension or weight is not positive.
    #[error("{field} must be positive")]
    NonPositiveMeasure {
        /// Field path, e.g. `packages[0].dimensions.weight`.
        field: String,
    },

    /// A package dimension or weight exceeds the supported maximum.
    #[error("{field} must not exceed {max}")]
    MeasureTooLarge {
        /// Field path, e.g. `packages[0].dimensions.length`.
        field: String,
        /// Largest accepted value.
        max: Decimal,
    },

    /// A computed amount does not fit in a decimal.
    #[error("{0} is out of range")]
    Overflow(String),

    /// Invalid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A quote request carried no packages.
    #[error("packages must contain at least one package")]
    EmptyPackages,

    /// Tracking status transition not allowed by the state machine.
    #[error("invalid tracking transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current state.
        from: TrackingStatus,
        /// Requested state.
        to: TrackingStatus,
    },

    /// Tracking event older than the last recorded one.
    #[error("tracking event at {next} precedes last event at {previous}")]
    EventOutOfOrder {
        /// Timestamp of the last recorded event.
        previous: Timestamp,
        /// Timestamp of the rejected event.
        next: Timestamp,
    },

    /// Append attempted after a terminal status.
    #[error("tracking history already terminal ({0})")]
    HistoryTerminated(TrackingStatus),

    /// History must open with a CREATED event.
    #[error("tracking history must start with CREATED, got {0}")]
    MissingCreatedEvent(TrackingStatus),
}

impl DomainError {
    /// Creates a non-positive measure error for the given field path.
    #[must_use]
    pub fn non_positive(field: impl Into<String>) -> Self {
        Self::NonPositiveMeasure {
            field: field.into(),
        }
    }

    /// Creates an overflow error naming the computed quantity.
    #[must_use]
    pub fn overflow(what: impl Into<String>) -> Self {
        Self::Overflow(what.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
