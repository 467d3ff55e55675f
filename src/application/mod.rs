//! # Application Layer
//!
//! Use-case orchestration: quote aggregation and tracking lookups.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
