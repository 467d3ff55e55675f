//! # HTTP Tracking Source
//!
//! Fetches authoritative tracking histories from a carrier gateway over
//! HTTP:
//!
//! ```text
//! GET {base_url}/carriers/{carrier}/track/{tracking_number}
//! ```
//!
//! `404` means the carrier has no record. When the number's format does not
//! identify a carrier, every known carrier is asked in order and the first
//! history wins.

use crate::domain::entities::tracking::TrackingHistory;
use crate::domain::value_objects::TrackingNumber;
use crate::infrastructure::carriers::detection::{KnownCarrier, detect_carrier};
use crate::infrastructure::carriers::error::{CarrierError, CarrierResult};
use crate::infrastructure::carriers::http_client::HttpClient;
use crate::infrastructure::carriers::traits::TrackingSource;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Tracking source backed by a carrier gateway.
#[derive(Debug, Clone)]
pub struct HttpTrackingSource {
    client: HttpClient,
    base_url: String,
}

impl HttpTrackingSource {
    /// Creates a source for the given gateway.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> CarrierResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CarrierError::internal("tracking source base URL is empty"));
        }
        Ok(Self {
            client: HttpClient::new(timeout_ms)?,
            base_url,
        })
    }

    /// Returns the gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, carrier: KnownCarrier, tracking_number: &TrackingNumber) -> String {
        format!(
            "{}/carriers/{}/track/{}",
            self.base_url,
            carrier.slug(),
            tracking_number.as_str()
        )
    }

    async fn fetch_from(
        &self,
        carrier: KnownCarrier,
        tracking_number: &TrackingNumber,
    ) -> CarrierResult<Option<TrackingHistory>> {
        let url = self.url_for(carrier, tracking_number);
        debug!(carrier = %carrier, url = %url, "Fetching tracking history");
        self.client.get_optional(&url).await
    }
}

#[async_trait]
impl TrackingSource for HttpTrackingSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_history(
        &self,
        tracking_number: &TrackingNumber,
    ) -> CarrierResult<Option<TrackingHistory>> {
        if let Some(carrier) = detect_carrier(tracking_number.as_str()) {
            return self.fetch_from(carrier, tracking_number).await;
        }

        let mut last_error = None;
        for carrier in KnownCarrier::ALL {
            match self.fetch_from(carrier, tracking_number).await {
                Ok(Some(history)) => return Ok(Some(history)),
                Ok(None) => {}
                Err(e) => {
                    warn!(carrier = %carrier, error = %e, "Carrier tracking lookup failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
