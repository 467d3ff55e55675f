//! # Quote Request
//!
//! An immutable shipment description that one aggregation fans out to
//! every carrier adapter.
//!
//! # Examples
//!
//! ```
//! use shipping_engine::domain::entities::address::Address;
//! use shipping_engine::domain::entities::package::{Dimensions, Package};
//! use shipping_engine::domain::entities::quote_request::QuoteRequestBuilder;
//! use shipping_engine::domain::value_objects::enums::{PackageType, ServiceLevel};
//! use rust_decimal::Decimal;
//!
//! let parcel = Package::new(
//!     PackageType::Parcel,
//!     Dimensions::imperial(Decimal::new(12, 0), Decimal::new(12, 0), Decimal::new(12, 0), Decimal::new(5, 0)),
//!     Decimal::new(100, 0),
//!     "General merchandise",
//! ).unwrap();
//!
//! let request = QuoteRequestBuilder::new(
//!     Address::from_flat("New York, NY").unwrap(),
//!     Address::from_flat("Los Angeles, CA").unwrap(),
//! )
//! .package(parcel)
//! .service_level(ServiceLevel::Ground)
//! .build()
//! .unwrap();
//!
//! assert_eq!(request.packages().len(), 1);
//! ```

use crate::domain::entities::address::Address;
use crate::domain::entities::package::Package;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::ServiceLevel;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A request for shipping quotes.
///
/// # Invariants
///
/// - `packages` is non-empty and every package is valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    origin: Address,
    destination: Address,
    packages: Vec<Package>,
    service_level: ServiceLevel,
    pickup_date: NaiveDate,
}

impl QuoteRequest {
    /// Re-checks the request invariants.
    ///
    /// Requests built with [`QuoteRequestBuilder`] always pass; this guards
    /// requests that arrived through deserialization.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyPackages` or the first package violation.
    pub fn validate(&self) -> DomainResult<()> {
        if self.packages.is_empty() {
            return Err(DomainError::EmptyPackages);
        }
        for (index, package) in self.packages.iter().enumerate() {
            package.validate(index)?;
        }
        Ok(())
    }

    /// Returns the origin address.
    #[must_use]
    pub fn origin(&self) -> &Address {
        &self.origin
    }

    /// Returns the destination address.
    #[must_use]
    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// Returns the packages in request order.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Returns the requested service level.
    #[must_use]
    pub fn service_level(&self) -> ServiceLevel {
        self.service_level
    }

    /// Returns the pickup date.
    #[must_use]
    pub fn pickup_date(&self) -> NaiveDate {
        self.pickup_date
    }

    /// Sum of billable weights across all packages, in pounds.
    #[must_use]
    pub fn total_billable_weight_lb(&self) -> Decimal {
        self.packages.iter().map(Package::billable_weight_lb).sum()
    }

    /// Returns true if origin and destination are in different countries.
    #[must_use]
    pub fn is_international(&self) -> bool {
        self.origin.is_international_to(&self.destination)
    }

    /// Returns true if the shipment leaves the origin's state or country.
    #[must_use]
    pub fn crosses_regions(&self) -> bool {
        !self.origin.same_region_as(&self.destination)
    }
}

/// Builder for [`QuoteRequest`].
#[derive(Debug, Clone)]
pub struct QuoteRequestBuilder {
    origin: Address,
    destination: Address,
    packages: Vec<Package>,
    service_level: ServiceLevel,
    pickup_date: Option<NaiveDate>,
}

impl QuoteRequestBuilder {
    /// Starts a builder with the two endpoints.
    #[must_use]
    pub fn new(origin: Address, destination: Address) -> Self {
        Self {
            origin,
            destination,
            packages: Vec::new(),
            service_level: ServiceLevel::default(),
            pickup_date: None,
        }
    }

    /// Adds one package.
    #[must_use]
    pub fn package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    /// Replaces the package list.
    #[must_use]
    pub fn packages(mut self, packages: Vec<Package>) -> Self {
        self.packages = packages;
        self
    }

    /// Sets the service level (default GROUND).
    #[must_use]
    pub fn service_level(mut self, level: ServiceLevel) -> Self {
        self.service_level = level;
        self
    }

    /// Sets the pickup date (default today, UTC).
    #[must_use]
    pub fn pickup_date(mut self, date: NaiveDate) -> Self {
        self.pickup_date = Some(date);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyPackages` if no package was added.
    pub fn build(self) -> DomainResult<QuoteRequest> {
        if self.packages.is_empty() {
            return Err(DomainError::EmptyPackages);
        }
        Ok(QuoteRequest {
            origin: self.origin,
            destination: self.destination,
            packages: self.packages,
            service_level: self.service_level,
            pickup_date: self
                .pickup_date
                .unwrap_or_else(|| Utc::now().date_naive()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::package::Dimensions;
    use crate::domain::value_objects::enums::PackageType;

    fn parcel(weight: i64) -> Package {
        Package::new(
            PackageType::Parcel,
            Dimensions::imperial(
                Decimal::new(2, 0),
                Decimal::new(2, 0),
                Decimal::new(2, 0),
                Decimal::new(weight, 0),
            ),
            Decimal::ZERO,
            "",
        )
        .unwrap()
    }

    fn builder() -> QuoteRequestBuilder {
        QuoteRequestBuilder::new(
            Address::from_flat("New York, NY").unwrap(),
            Address::from_flat("Los Angeles, CA").unwrap(),
        )
    }

    #[test]
    fn build_requires_packages() {
        assert_eq!(builder().build().unwrap_err(), DomainError::EmptyPackages);
    }

    #[test]
    fn defaults() {
        let req = builder().package(parcel(1)).build().unwrap();
        assert_eq!(req.service_level(), ServiceLevel::Ground);
        assert_eq!(req.pickup_date(), Utc::now().date_naive());
    }

    #[test]
    fn total_weight_sums_packages() {
        let req = builder()
            .packages(vec![parcel(3), parcel(4)])
            .build()
            .unwrap();
        assert_eq!(req.total_billable_weight_lb(), Decimal::new(7, 0));
    }

    #[test]
    fn validate_catches_deserialized_requests() {
        let req = builder().package(parcel(1)).build().unwrap();
        assert!(req.validate().is_ok());

        let mut json = serde_json::to_value(&req).unwrap();
        json["packages"] = serde_json::json!([]);
        let empty: QuoteRequest = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(empty.validate().unwrap_err(), DomainError::EmptyPackages);

        let mut bad = serde_json::to_value(&req).unwrap();
        bad["packages"][0]["dimensions"]["weight"] = serde_json::json!("0");
        let bad: QuoteRequest = serde_json::from_value(bad).unwrap();
        assert!(
            bad.validate()
                .unwrap_err()
                .to_string()
                .contains("packages[0].dimensions.weight")
        );
    }

    #[test]
    fn region_flags() {
        let req = builder().package(parcel(1)).build().unwrap();
        assert!(req.crosses_regions());
        assert!(!req.is_international());
    }
}
