//! # Infrastructure Layer
//!
//! Adapters to the outside world: carrier integrations and caches.

pub mod cache;
pub mod carriers;
