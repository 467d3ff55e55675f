//! # HTTP Client Utilities
//!
//! Thin reqwest wrapper used by HTTP-backed carrier integrations.
//!
//! - Per-request timeout
//! - JSON deserialization
//! - Status and transport errors mapped onto [`CarrierError`]

use crate::infrastructure::carriers::error::{CarrierError, CarrierResult};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client wrapper for carrier integrations.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> CarrierResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| CarrierError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Timeout`/`Connection` on transport failure,
    /// `CarrierError::Upstream` on a non-success status and
    /// `CarrierError::Protocol` if the body cannot be parsed.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> CarrierResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Like [`HttpClient::get`] but maps `404 Not Found` to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`] for every other failure.
    pub async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> CarrierResult<Option<T>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> CarrierResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| CarrierError::protocol(format!("Failed to parse response: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::map_status_error(status, &body))
        }
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> CarrierError {
        if error.is_timeout() {
            CarrierError::timeout_with_duration("Request timed out", self.timeout_ms)
        } else if error.is_connect() {
            CarrierError::connection(format!("Connection failed: {error}"))
        } else {
            CarrierError::connection(format!("HTTP request failed: {error}"))
        }
    }

    fn map_status_error(status: StatusCode, body: &str) -> CarrierError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                CarrierError::invalid_request(format!("Bad request: {body}"))
            }
            _ => CarrierError::upstream(status.as_u16(), body.to_string()),
        }
    }
}
