//! # Domain Layer
//!
//! Shipment requests, carrier quotes, and tracking histories together with
//! the invariants that govern them. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
