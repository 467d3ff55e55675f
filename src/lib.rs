//! # Shipping Engine
//!
//! Carrier quote aggregation and shipment tracking behind a JSON REST API.
//!
//! # Architecture
//!
//! ```text
//! api/rest        axum router, DTOs, error envelope
//!     │
//! application     QuoteAggregationEngine, TrackingEngine, ranking, simulation
//!     │
//! domain          Address, Package, QuoteRequest, Quote, TrackingHistory, ...
//!     │
//! infrastructure  carrier adapters, registry, HTTP tracking source, cache
//! ```
//!
//! Quote aggregation fans a request out to every registered carrier
//! adapter concurrently, each under its own timeout, and merges whatever
//! arrives into one cheapest-first list. A single carrier failing never
//! fails the request.
//!
//! Tracking serves real carrier data when a tracking source has it and
//! otherwise a deterministic simulated history that advances with time.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
