//! # Rate Table Carrier
//!
//! Demo carrier adapter that prices shipments from a per-carrier rate
//! table instead of calling an external API.
//!
//! Pricing is a pure function of the request:
//!
//! ```text
//! billable  = Σ max(actual_lb, L×W×H_in / 166)
//! base      = 15 + 0.75 × billable        (× 1.5 across regions)
//! price     = base × service multiplier   (rounded to cents)
//! surcharge = base × 10% (ground) or 15% (faster services)
//! ```

use crate::domain::entities::quote::{Quote, QuoteBuilder};
use crate::domain::entities::quote_request::QuoteRequest;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::money::{DEFAULT_CURRENCY, Money, round_cents};
use crate::domain::value_objects::ServiceLevel;
use crate::infrastructure::carriers::error::{CarrierError, CarrierResult};
use crate::infrastructure::carriers::traits::CarrierAdapter;
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

/// Flat handling fee in the base rate.
pub const BASE_FEE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Per-pound rate in the base rate.
pub const RATE_PER_LB: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

/// Multiplier applied when origin and destination regions differ.
pub const CROSS_REGION_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Fuel surcharge rate for ground services.
pub const GROUND_FUEL_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Fuel surcharge rate for express and faster services.
pub const EXPRESS_FUEL_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Ground transit time in business days.
pub const GROUND_TRANSIT_DAYS: u32 = 3;

/// Ground transit time when the shipment crosses a border.
pub const GROUND_INTERNATIONAL_TRANSIT_DAYS: u32 = 5;

/// One service a carrier offers.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOffering {
    level: ServiceLevel,
    multiplier: Decimal,
}

impl ServiceOffering {
    /// Creates an offering for a service level.
    #[must_use]
    pub fn new(level: ServiceLevel, multiplier: Decimal) -> Self {
        Self { level, multiplier }
    }

    /// Returns the service level this offering is filed under.
    #[must_use]
    pub fn level(&self) -> ServiceLevel {
        self.level
    }

    /// Returns the price multiplier.
    #[must_use]
    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// Returns true if this offering answers a request for `requested`.
    ///
    /// Ground also serves economy requests.
    #[must_use]
    pub fn serves(&self, requested: ServiceLevel) -> bool {
        match self.level {
            ServiceLevel::Ground => {
                matches!(requested, ServiceLevel::Ground | ServiceLevel::Economy)
            }
            level => level == requested,
        }
    }

    fn display_name(&self) -> &'static str {
        match self.level {
            ServiceLevel::Ground | ServiceLevel::Economy => "Ground",
            ServiceLevel::Express => "Express",
            ServiceLevel::Overnight => "Overnight",
            ServiceLevel::International => "International",
        }
    }

    fn service_code(&self) -> &'static str {
        match self.level {
            ServiceLevel::Ground | ServiceLevel::Economy => "GND",
            ServiceLevel::Express => "EXP",
            ServiceLevel::Overnight => "ONT",
            ServiceLevel::International => "INTL",
        }
    }

    fn transit_days(&self, international: bool) -> u32 {
        match self.level {
            ServiceLevel::Ground | ServiceLevel::Economy if international => {
                GROUND_INTERNATIONAL_TRANSIT_DAYS
            }
            ServiceLevel::Ground | ServiceLevel::Economy => GROUND_TRANSIT_DAYS,
            ServiceLevel::Express => 2,
            ServiceLevel::Overnight => 1,
            ServiceLevel::International => 5,
        }
    }

    fn fuel_rate(&self) -> Decimal {
        match self.level {
            ServiceLevel::Ground | ServiceLevel::Economy => GROUND_FUEL_RATE,
            _ => EXPRESS_FUEL_RATE,
        }
    }

    fn features(&self) -> &'static [&'static str] {
        match self.level {
            ServiceLevel::Ground | ServiceLevel::Economy => &["Tracking included"],
            ServiceLevel::Express => &["Tracking included", "Priority handling"],
            ServiceLevel::Overnight => &[
                "Tracking included",
                "Priority handling",
                "Signature on delivery",
            ],
            ServiceLevel::International => &["Tracking included", "Customs documentation"],
        }
    }

    fn guaranteed(&self) -> bool {
        matches!(self.level, ServiceLevel::Express | ServiceLevel::Overnight)
    }
}

/// Pricing table for one carrier.
#[derive(Debug, Clone)]
pub struct RateTable {
    carrier: String,
    reliability: u8,
    currency: String,
    offerings: Vec<ServiceOffering>,
}

impl RateTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(carrier: impl Into<String>, reliability: u8) -> Self {
        Self {
            carrier: carrier.into(),
            reliability,
            currency: DEFAULT_CURRENCY.to_string(),
            offerings: Vec::new(),
        }
    }

    /// Sets the quote currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Adds an offering.
    #[must_use]
    pub fn with_offering(mut self, level: ServiceLevel, multiplier: Decimal) -> Self {
        self.offerings.push(ServiceOffering::new(level, multiplier));
        self
    }

    /// Returns the carrier name.
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Returns the configured offerings.
    #[must_use]
    pub fn offerings(&self) -> &[ServiceOffering] {
        &self.offerings
    }

    /// Base rate for a request, before service multipliers.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Overflow` if the rate does not fit in a
    /// `Decimal`.
    pub fn base_rate(request: &QuoteRequest) -> DomainResult<Decimal> {
        let overflow = || DomainError::overflow("base rate");
        let mut base = RATE_PER_LB
            .checked_mul(request.total_billable_weight_lb())
            .and_then(|weighted| weighted.checked_add(BASE_FEE))
            .ok_or_else(overflow)?;
        if request.crosses_regions() {
            base = base.checked_mul(CROSS_REGION_FACTOR).ok_or_else(overflow)?;
        }
        Ok(round_cents(base))
    }

    /// Prices a request.
    ///
    /// Offerings are filtered to the requested level; when none match,
    /// the whole menu is returned.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the request is invalid, a computed amount
    /// overflows, or a computed quote violates quote invariants (only
    /// possible with a misconfigured multiplier).
    pub fn price(&self, request: &QuoteRequest) -> DomainResult<Vec<Quote>> {
        request.validate()?;
        let base = Self::base_rate(request)?;
        let international = request.is_international();

        let matching: Vec<&ServiceOffering> = self
            .offerings
            .iter()
            .filter(|o| o.serves(request.service_level()))
            .collect();
        let selected = if matching.is_empty() {
            self.offerings.iter().collect()
        } else {
            matching
        };

        selected
            .into_iter()
            .map(|offering| self.quote_for(offering, base, international, request.pickup_date()))
            .collect()
    }

    fn quote_for(
        &self,
        offering: &ServiceOffering,
        base: Decimal,
        international: bool,
        pickup: NaiveDate,
    ) -> DomainResult<Quote> {
        let price = base
            .checked_mul(offering.multiplier())
            .ok_or_else(|| DomainError::overflow(format!("{} price", self.carrier)))?;
        let surcharge = base
            .checked_mul(offering.fuel_rate())
            .ok_or_else(|| DomainError::overflow(format!("{} fuel surcharge", self.carrier)))?;
        let price = Money::new(round_cents(price), &self.currency)?;
        let surcharge = Money::new(round_cents(surcharge), &self.currency)?;
        let transit_days = offering.transit_days(international);

        let mut builder = QuoteBuilder::new(
            &self.carrier,
            format!("{} {}", self.carrier, offering.display_name()),
            price,
            transit_days,
            offering.level(),
        )
        .service_code(offering.service_code())
        .estimated_delivery(add_business_days(pickup, transit_days))
        .reliability(self.reliability)
        .guaranteed(offering.guaranteed())
        .fuel_surcharge(surcharge);
        for feature in offering.features() {
            builder = builder.feature(*feature);
        }
        builder.build()
    }
}

/// Adds business days to a date, skipping Saturdays and Sundays.
#[must_use]
pub fn add_business_days(start: NaiveDate, days: u32) -> NaiveDate {
    let mut date = start;
    let mut remaining = days;
    while remaining > 0 {
        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        date = next;
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

/// Carrier adapter backed by a [`RateTable`].
#[derive(Debug, Clone)]
pub struct RateTableCarrier {
    table: RateTable,
    latency: Option<Duration>,
    timeout_ms: Option<u64>,
}

impl RateTableCarrier {
    /// Creates an adapter with no simulated latency.
    #[must_use]
    pub fn new(table: RateTable) -> Self {
        Self {
            table,
            latency: None,
            timeout_ms: None,
        }
    }

    /// Sets a simulated response latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = if latency.is_zero() { None } else { Some(latency) };
        self
    }

    /// Overrides the engine timeout for this carrier.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns the rate table.
    #[must_use]
    pub fn table(&self) -> &RateTable {
        &self.table
    }
}

#[async_trait]
impl CarrierAdapter for RateTableCarrier {
    fn name(&self) -> &str {
        self.table.carrier()
    }

    fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    async fn quote(&self, request: &QuoteRequest) -> CarrierResult<Vec<Quote>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let quotes = self
            .table
            .price(request)
            .map_err(|e| CarrierError::quote_unavailable(e.to_string()))?;

        debug!(
            carrier = %self.table.carrier(),
            quotes = quotes.len(),
            "Rate table priced request"
        );
        Ok(quotes)
    }
}
