//! # API Layer
//!
//! Outer HTTP surface over the application services.

pub mod rest;
