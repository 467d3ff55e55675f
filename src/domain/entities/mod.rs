//! # Domain Entities
//!
//! - [`Address`], [`Package`]: shipment endpoints and items
//! - [`QuoteRequest`]: immutable input to quote aggregation
//! - [`Quote`]: one priced option from a carrier
//! - [`TrackingHistory`], [`TrackingEvent`]: append-only status history

pub mod address;
pub mod package;
pub mod quote;
pub mod quote_request;
pub mod tracking;

pub use address::Address;
pub use package::{Dimensions, Package};
pub use quote::{Quote, QuoteBuilder};
pub use quote_request::{QuoteRequest, QuoteRequestBuilder};
pub use tracking::{TrackingEvent, TrackingHistory};
