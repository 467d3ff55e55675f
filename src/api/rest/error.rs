//! # REST Errors
//!
//! Maps application errors onto HTTP status codes and the JSON error
//! envelope:
//!
//! ```json
//! { "success": false, "error": { "code": "...", "message": "...", "type": "..." } }
//! ```
//!
//! Client errors carry the detailed message. Server errors carry a generic
//! message; the cause is logged and never sent to the client.

use crate::application::error::ApplicationError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

/// Error code for malformed or missing request fields.
pub const VALIDATION_ERROR: &str = "validation_error";
/// Error code when no data exists for the requested resource.
pub const NOT_FOUND: &str = "not_found";
/// Error code when no carrier produced a quote.
pub const AGGREGATION_FAILED: &str = "aggregation_failed";
/// Error code for any other server-side failure.
pub const PROCESSING_ERROR: &str = "processing_error";

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Error class.
    #[serde(rename = "type")]
    pub error_type: &'static str,
}

/// Error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// The error.
    pub error: ErrorDetail,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: ErrorDetail,
}

impl ApiError {
    /// 400 with a field-level message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: ErrorDetail {
                code: VALIDATION_ERROR,
                message: message.into(),
                error_type: "invalid_request_error",
            },
        }
    }

    /// 404.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: ErrorDetail {
                code: NOT_FOUND,
                message: message.into(),
                error_type: "invalid_request_error",
            },
        }
    }

    /// 500 with a generic message.
    #[must_use]
    pub fn server(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: ErrorDetail {
                code,
                message: message.into(),
                error_type: "api_error",
            },
        }
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Error body.
    #[must_use]
    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Validation(message) => Self::validation(message),
            ApplicationError::Domain(e) => Self::validation(e.to_string()),
            ApplicationError::NotFound { resource_type, id } => {
                if resource_type == "tracking" {
                    Self::not_found("No tracking information found")
                } else {
                    Self::not_found(format!("{resource_type} {id} not found"))
                }
            }
            ApplicationError::Aggregation(e) => {
                warn!(error = %e, "Quote aggregation failed");
                Self::server(AGGREGATION_FAILED, "Failed to get quotes")
            }
            ApplicationError::Upstream(e) => {
                error!(error = %e, "Upstream collaborator failed");
                Self::server(PROCESSING_ERROR, "Internal server error")
            }
            ApplicationError::Internal(message) => {
                error!(error = %message, "Internal error");
                Self::server(PROCESSING_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
