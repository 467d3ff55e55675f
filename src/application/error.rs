//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(String)           - Malformed or missing request fields
//! ├── NotFound { resource, id }    - No data anywhere
//! ├── Aggregation(AggregationError) - No carrier produced a quote
//! ├── Upstream(CarrierError)       - A real-data collaborator failed
//! ├── Domain(DomainError)          - Business rule violations
//! └── Internal(String)             - Anything else
//! ```
//!
//! # Examples
//!
//! ```
//! use shipping_engine::application::error::ApplicationError;
//!
//! let err = ApplicationError::validation("packages must not be empty");
//! assert!(err.is_validation());
//!
//! let err = ApplicationError::not_found("tracking", "UNKNOWN123");
//! assert!(err.is_not_found());
//! ```

use crate::application::services::quote_aggregation::AggregationError;
use crate::domain::errors::DomainError;
use crate::infrastructure::carriers::error::CarrierError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Quote aggregation failed as a whole.
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// Upstream carrier collaborator failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] CarrierError),

    /// Domain error from business logic.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a validation error.
    ///
    /// Domain errors raised while constructing request values count as
    /// validation failures: they describe bad input, not a server fault.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Domain(_))
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if retrying the operation might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream(e) => e.is_retryable(),
            Self::Aggregation(AggregationError::AllCarriersFailed(_)) => true,
            _ => false,
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error() {
        let err = ApplicationError::validation("origin is required");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "validation error: origin is required");
    }

    #[test]
    fn domain_errors_are_validation() {
        let err: ApplicationError = DomainError::EmptyPackages.into();
        assert!(err.is_validation());
    }

    #[test]
    fn not_found_error() {
        let err = ApplicationError::not_found("tracking", "ABC");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("ABC"));
    }

    #[test]
    fn aggregation_error_conversion() {
        let err: ApplicationError =
            AggregationError::AllCarriersFailed(vec!["UPS: timeout".into()]).into();
        assert!(!err.is_validation());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("UPS: timeout"));
    }

    #[test]
    fn upstream_error_conversion() {
        let err: ApplicationError = CarrierError::timeout("slow").into();
        assert!(err.is_retryable());
        let err: ApplicationError = CarrierError::protocol("garbled").into();
        assert!(!err.is_retryable());
    }
}
