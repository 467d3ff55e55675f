//! # REST API
//!
//! JSON endpoints using axum.
//!
//! Every response carries a `success` flag; failures use the envelope
//! described in [`error`].
//!
//! # Endpoints
//!
//! ## Quotes
//! - `POST /api/shipping/quotes` - Aggregate quotes for a full shipment description
//! - `GET /api/shipping/quotes?origin=&destination=&weight=&service=` - Quick quote for a default parcel
//!
//! ## Tracking
//! - `GET /api/shipping/tracking/{trackingNumber}` - Current history (real data, else simulated)
//! - `POST /api/shipping/tracking/{trackingNumber}` - `subscribe`, `unsubscribe` or `refresh`
//!
//! ## Health
//! - `GET /api/health` - Health check with the configured carriers
//!
//! # Usage
//!
//! ```ignore
//! use shipping_engine::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState {
//!     quote_engine: /* ... */,
//!     tracking_engine: /* ... */,
//!     clock: Arc::new(SystemClock),
//! });
//!
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult, ErrorDetail, ErrorResponse};
pub use handlers::{
    AddressBody, AddressInput, AppState, DimensionsBody, HealthResponse, PackageBody,
    QuickQuoteQuery, QuoteRequestBody, QuotesResponse, SubscriptionResponse,
    TrackingActionBody, TrackingActionResponse, TrackingResponse,
};
pub use routes::create_router;
