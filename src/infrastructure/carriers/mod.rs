//! # Carrier Integrations
//!
//! Carrier adapters, tracking sources and the shared plumbing they use.
//!
//! - [`traits`]: [`CarrierAdapter`] and [`TrackingSource`] ports
//! - [`rate_table`]: demo carriers priced from a rate table
//! - [`registry`]: ordered adapter set built from configuration
//! - [`detection`]: carrier detection from tracking-number formats
//! - [`http_tracking`]: tracking histories from a carrier gateway

pub mod detection;
pub mod error;
pub mod http_client;
pub mod http_tracking;
pub mod rate_table;
pub mod registry;
pub mod traits;

pub use detection::{KnownCarrier, detect_carrier};
pub use error::{CarrierError, CarrierResult};
pub use http_tracking::HttpTrackingSource;
pub use rate_table::{RateTable, RateTableCarrier};
pub use registry::CarrierRegistry;
pub use traits::{CarrierAdapter, TrackingSource};
