//! # Address Entity
//!
//! Postal address of a shipment origin or destination.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country used when none is supplied.
pub const DEFAULT_COUNTRY: &str = "US";

/// A postal address.
///
/// # Invariants
///
/// - `country` is an ISO 3166-1 alpha-2 code, uppercase
/// - at least one of `street` or `city` is non-empty
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::entities::address::Address;
///
/// let addr = Address::from_flat("New York, NY").unwrap();
/// assert_eq!(addr.city(), "New York");
/// assert_eq!(addr.state(), "NY");
/// assert_eq!(addr.country(), "US");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    street: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

impl Address {
    /// Creates a validated address.
    ///
    /// `country` falls back to [`DEFAULT_COUNTRY`] when `None` or blank.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAddress` if both street and city are
    /// blank or the country code is not two ASCII letters.
    pub fn new(
        name: Option<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: Option<String>,
    ) -> DomainResult<Self> {
        let street = street.into().trim().to_string();
        let city = city.into().trim().to_string();
        if street.is_empty() && city.is_empty() {
            return Err(DomainError::InvalidAddress(
                "street address or city is required".to_string(),
            ));
        }

        let country = country
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidAddress(format!(
                "country must be an ISO alpha-2 code, got '{country}'"
            )));
        }

        Ok(Self {
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            street,
            city,
            state: state.into().trim().to_string(),
            postal_code: postal_code.into().trim().to_string(),
            country,
        })
    }

    /// Builds an address from a single free-text string such as
    /// `"Los Angeles, CA"`.
    ///
    /// Best effort and lossy: the text before the first comma becomes the
    /// city, the next comma-separated segment becomes the state. The full
    /// text is kept as the street line. Without a comma the state is empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAddress` if the text is blank.
    pub fn from_flat(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        let (city, state) = split_city_state(raw);
        Self::new(None, raw, city, state, "", None)
    }

    /// Sets the contact name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the postal code.
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = postal_code.into();
        self
    }

    /// Returns the contact name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the street line.
    #[must_use]
    pub fn street(&self) -> &str {
        &self.street
    }

    /// Returns the city.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns the state or region.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the postal code.
    #[must_use]
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Returns the ISO alpha-2 country code.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Returns true if both addresses are in the same country and state.
    #[must_use]
    pub fn same_region_as(&self, other: &Self) -> bool {
        self.country == other.country && self.state.eq_ignore_ascii_case(&other.state)
    }

    /// Returns true if the addresses are in different countries.
    #[must_use]
    pub fn is_international_to(&self, other: &Self) -> bool {
        self.country != other.country
    }

    /// Short "City, ST" label used in tracking and logs.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.state),
            (false, true) => self.city.clone(),
            _ => self.street.clone(),
        }
    }
}

/// Splits `"City, ST, ..."` into `("City", "ST")`; without a comma the
/// whole text is the city.
#[must_use]
pub fn split_city_state(raw: &str) -> (&str, &str) {
    match raw.split_once(',') {
        Some((city, rest)) => (city.trim(), rest.split(',').next().unwrap_or_default().trim()),
        None => (raw.trim(), ""),
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.country)
    }
}
