//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`QuoteAggregationEngine`]: concurrent quote collection and ordering
//! - [`RankingStrategy`]: ordering of merged quotes
//! - [`TrackingEngine`]: real tracking data with simulated fallback
//! - [`tracking_simulation`]: pure, deterministic history synthesis

pub mod quote_aggregation;
pub mod ranking_strategy;
pub mod tracking_engine;
pub mod tracking_simulation;

pub use quote_aggregation::{
    AggregationConfig, AggregationError, AggregationOutcome, CarrierFailure,
    QuoteAggregationEngine,
};
pub use ranking_strategy::{CheapestFirstStrategy, RankingStrategy};
pub use tracking_engine::{TrackingConfig, TrackingEngine};
