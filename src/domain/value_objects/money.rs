//! # Money Value Object
//!
//! Currency-qualified decimal amount.
//!
//! # Examples
//!
//! ```
//! use shipping_engine::domain::value_objects::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::usd(Decimal::new(1999, 2)).unwrap();
//! assert_eq!(price.to_string(), "19.99 USD");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default currency for quotes.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A non-negative amount in a named ISO 4217 currency.
///
/// # Invariants
///
/// - Amount is never negative
/// - Currency is three uppercase ASCII letters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    /// Creates a new amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the amount is negative or the
    /// currency code is malformed.
    pub fn new(amount: Decimal, currency: impl Into<String>) -> DomainResult<Self> {
        let currency = currency.into().trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidAmount(format!(
                "currency must be a 3-letter code, got '{currency}'"
            )));
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::InvalidAmount(format!(
                "amount must not be negative, got {amount}"
            )));
        }
        Ok(Self { amount, currency })
    }

    /// Creates a USD amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the amount is negative.
    pub fn usd(amount: Decimal) -> DomainResult<Self> {
        Self::new(amount, DEFAULT_CURRENCY)
    }

    /// Returns the amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency code.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns a copy rounded half-away-from-zero to whole cents.
    #[must_use]
    pub fn rounded_to_cents(&self) -> Self {
        Self {
            amount: round_cents(self.amount),
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Rounds a decimal to two places, half away from zero.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
