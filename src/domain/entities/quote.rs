//! # Quote Entity
//!
//! One priced shipping option offered by a carrier.
//!
//! Quotes are value objects: within one aggregation result they have no
//! identity beyond `(carrier, service)`, and they are never persisted.
//!
//! # Examples
//!
//! ```
//! use shipping_engine::domain::entities::quote::QuoteBuilder;
//! use shipping_engine::domain::value_objects::{Money, ServiceLevel};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let quote = QuoteBuilder::new(
//!     "UPS",
//!     "Ground",
//!     Money::usd(Decimal::new(2499, 2)).unwrap(),
//!     3,
//!     ServiceLevel::Ground,
//! )
//! .service_code("GND")
//! .estimated_delivery(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
//! .build()
//! .unwrap();
//!
//! assert_eq!(quote.delivery_time(), "3 business days");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::ServiceLevel;
use crate::domain::value_objects::money::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest reliability rating.
pub const MAX_RELIABILITY: u8 = 5;

/// A priced shipping option.
///
/// # Invariants
///
/// - `price` is strictly positive
/// - `transit_days` is at least 1
/// - `reliability` is in `1..=5`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    carrier: String,
    service: String,
    service_code: String,
    price: Money,
    transit_days: u32,
    delivery_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimated_delivery: Option<NaiveDate>,
    category: ServiceLevel,
    #[serde(default)]
    features: Vec<String>,
    reliability: u8,
    #[serde(default)]
    guaranteed_delivery: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fuel_surcharge: Option<Money>,
}

impl Quote {
    /// Returns the carrier name.
    #[inline]
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Returns the service name.
    #[inline]
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the carrier's service code.
    #[must_use]
    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    /// Returns the price.
    #[inline]
    #[must_use]
    pub fn price(&self) -> &Money {
        &self.price
    }

    /// Returns the estimated transit time in business days.
    #[inline]
    #[must_use]
    pub fn transit_days(&self) -> u32 {
        self.transit_days
    }

    /// Returns the human-readable delivery-time label.
    #[must_use]
    pub fn delivery_time(&self) -> &str {
        &self.delivery_time
    }

    /// Returns the estimated delivery date, if known.
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<NaiveDate> {
        self.estimated_delivery
    }

    /// Returns the display category.
    #[must_use]
    pub fn category(&self) -> ServiceLevel {
        self.category
    }

    /// Returns the feature list.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Returns the reliability rating (1-5).
    #[must_use]
    pub fn reliability(&self) -> u8 {
        self.reliability
    }

    /// Returns true if delivery is guaranteed.
    #[must_use]
    pub fn guaranteed_delivery(&self) -> bool {
        self.guaranteed_delivery
    }

    /// Returns the informational fuel surcharge.
    #[must_use]
    pub fn fuel_surcharge(&self) -> Option<&Money> {
        self.fuel_surcharge.as_ref()
    }

    /// Key under which two quotes count as exact duplicates.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, &str, Decimal, &str) {
        (
            &self.carrier,
            &self.service,
            self.price.amount(),
            self.price.currency(),
        )
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote({} {} {} {}d)",
            self.carrier, self.service, self.price, self.transit_days
        )
    }
}

/// Formats a transit estimate as a delivery-time label.
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::entities::quote::delivery_time_label;
///
/// assert_eq!(delivery_time_label(1), "Next business day");
/// assert_eq!(delivery_time_label(4), "4 business days");
/// ```
#[must_use]
pub fn delivery_time_label(transit_days: u32) -> String {
    match transit_days {
        0 | 1 => "Next business day".to_string(),
        n => format!("{n} business days"),
    }
}

/// Builder for [`Quote`].
#[derive(Debug, Clone)]
pub struct QuoteBuilder {
    carrier: String,
    service: String,
    service_code: Option<String>,
    price: Money,
    transit_days: u32,
    category: ServiceLevel,
    delivery_time: Option<String>,
    estimated_delivery: Option<NaiveDate>,
    features: Vec<String>,
    reliability: u8,
    guaranteed_delivery: bool,
    fuel_surcharge: Option<Money>,
}

impl QuoteBuilder {
    /// Starts a builder with the required fields.
    #[must_use]
    pub fn new(
        carrier: impl Into<String>,
        service: impl Into<String>,
        price: Money,
        transit_days: u32,
        category: ServiceLevel,
    ) -> Self {
        Self {
            carrier: carrier.into(),
            service: service.into(),
            service_code: None,
            price,
            transit_days,
            category,
            delivery_time: None,
            estimated_delivery: None,
            features: Vec::new(),
            reliability: 4,
            guaranteed_delivery: false,
            fuel_surcharge: None,
        }
    }

    /// Sets the carrier service code (defaults to the upper-cased service name).
    #[must_use]
    pub fn service_code(mut self, code: impl Into<String>) -> Self {
        self.service_code = Some(code.into());
        self
    }

    /// Overrides the delivery-time label.
    #[must_use]
    pub fn delivery_time(mut self, label: impl Into<String>) -> Self {
        self.delivery_time = Some(label.into());
        self
    }

    /// Sets the estimated delivery date.
    #[must_use]
    pub fn estimated_delivery(mut self, date: NaiveDate) -> Self {
        self.estimated_delivery = Some(date);
        self
    }

    /// Adds a feature.
    #[must_use]
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Sets the reliability rating.
    #[must_use]
    pub fn reliability(mut self, rating: u8) -> Self {
        self.reliability = rating;
        self
    }

    /// Marks delivery as guaranteed.
    #[must_use]
    pub fn guaranteed(mut self, guaranteed: bool) -> Self {
        self.guaranteed_delivery = guaranteed;
        self
    }

    /// Sets the fuel surcharge.
    #[must_use]
    pub fn fuel_surcharge(mut self, surcharge: Money) -> Self {
        self.fuel_surcharge = Some(surcharge);
        self
    }

    /// Builds the quote.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the carrier or service is
    /// blank, the price is not positive, transit days is zero, or the
    /// reliability is out of range.
    pub fn build(self) -> DomainResult<Quote> {
        if self.carrier.trim().is_empty() || self.service.trim().is_empty() {
            return Err(DomainError::validation("quote carrier and service are required"));
        }
        if !self.price.is_positive() {
            return Err(DomainError::validation("quote price must be positive"));
        }
        if self.transit_days == 0 {
            return Err(DomainError::validation("quote transit days must be at least 1"));
        }
        if !(1..=MAX_RELIABILITY).contains(&self.reliability) {
            return Err(DomainError::validation("quote reliability must be 1-5"));
        }

        let service_code = self
            .service_code
            .unwrap_or_else(|| self.service.to_uppercase().replace(' ', "_"));
        let delivery_time = self
            .delivery_time
            .unwrap_or_else(|| delivery_time_label(self.transit_days));

        Ok(Quote {
            carrier: self.carrier,
            service: self.service,
            service_code,
            price: self.price,
            transit_days: self.transit_days,
            delivery_time,
            estimated_delivery: self.estimated_delivery,
            category: self.category,
            features: self.features,
            reliability: self.reliability,
            guaranteed_delivery: self.guaranteed_delivery,
            fuel_surcharge: self.fuel_surcharge,
        })
    }
}
