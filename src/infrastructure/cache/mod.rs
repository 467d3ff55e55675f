//! # Caches
//!
//! In-memory caches used by the application services.

pub mod synthesis_cache;

pub use synthesis_cache::InMemorySynthesisCache;
