//! # Carrier Ports
//!
//! Port definitions for carrier integrations.
//!
//! - [`CarrierAdapter`]: produce zero or more quotes for a request
//! - [`TrackingSource`]: fetch an authoritative tracking history
//!
//! # Examples
//!
//! ```ignore
//! use shipping_engine::infrastructure::carriers::traits::CarrierAdapter;
//!
//! struct MyCarrier { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl CarrierAdapter for MyCarrier {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::entities::quote::Quote;
use crate::domain::entities::quote_request::QuoteRequest;
use crate::domain::entities::tracking::TrackingHistory;
use crate::domain::value_objects::TrackingNumber;
use crate::infrastructure::carriers::error::CarrierResult;
use async_trait::async_trait;
use std::fmt;

/// Quote capability of one carrier.
///
/// Implementations must be side-effect free (quoting, not purchasing) and
/// must not share mutable state with other adapters. The aggregation
/// engine enforces the timeout; adapters may drop work when cancelled.
#[async_trait]
pub trait CarrierAdapter: Send + Sync + fmt::Debug {
    /// Display name of the carrier, e.g. `"UPS"`.
    fn name(&self) -> &str;

    /// Adapter-specific timeout in milliseconds, overriding the engine
    /// default when set.
    fn timeout_ms(&self) -> Option<u64> {
        None
    }

    /// Produces quotes for the request.
    ///
    /// Service levels the carrier does not support are skipped silently;
    /// an empty vector is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns a `CarrierError` on any failure; the engine treats it as a
    /// soft failure of this carrier only.
    async fn quote(&self, request: &QuoteRequest) -> CarrierResult<Vec<Quote>>;
}

/// Authoritative tracking data from a carrier.
#[async_trait]
pub trait TrackingSource: Send + Sync + fmt::Debug {
    /// Name of the source, for logs.
    fn name(&self) -> &str;

    /// Fetches the tracking history.
    ///
    /// Returns `Ok(None)` when the carrier has no record of the number;
    /// an unknown number is not an error.
    ///
    /// # Errors
    ///
    /// Returns a `CarrierError` when the upstream call itself fails.
    async fn fetch_history(
        &self,
        tracking_number: &TrackingNumber,
    ) -> CarrierResult<Option<TrackingHistory>>;
}
