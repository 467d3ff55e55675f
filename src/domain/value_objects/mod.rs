//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`RequestId`], [`SubscriptionId`]: UUID-based identifiers
//! - [`TrackingNumber`]: validated carrier tracking number
//!
//! ## Numeric Types
//!
//! - [`Money`]: currency-qualified decimal amount
//!
//! ## Domain Enums
//!
//! - [`PackageType`], [`ServiceLevel`], [`LengthUnit`], [`WeightUnit`]
//! - [`TrackingStatus`]: shipment lifecycle state machine

pub mod enums;
pub mod ids;
pub mod money;
pub mod timestamp;
pub mod tracking_status;

pub use enums::{LengthUnit, PackageType, ParseEnumError, ServiceLevel, WeightUnit};
pub use ids::{RequestId, SubscriptionId, TrackingNumber};
pub use money::Money;
pub use timestamp::Timestamp;
pub use tracking_status::TrackingStatus;
