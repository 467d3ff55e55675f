//! # Ranking Strategy
//!
//! Ordering applied to merged carrier quotes.
//!
//! The [`RankingStrategy`] trait is the seam; [`CheapestFirstStrategy`] is
//! the ordering the HTTP surface promises: exact duplicates removed, then
//! ascending price, ascending transit days, carrier name, service name.

use crate::domain::entities::quote::Quote;
use std::collections::HashSet;
use std::fmt;

/// Orders a merged list of quotes.
pub trait RankingStrategy: Send + Sync + fmt::Debug {
    /// Returns the quotes in presentation order (best first).
    ///
    /// Implementations may drop quotes (duplicates) but never invent them.
    fn rank(&self, quotes: Vec<Quote>) -> Vec<Quote>;

    /// Returns the name of this strategy.
    fn name(&self) -> &'static str;
}

/// Cheapest quote first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapestFirstStrategy;

impl CheapestFirstStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RankingStrategy for CheapestFirstStrategy {
    fn rank(&self, quotes: Vec<Quote>) -> Vec<Quote> {
        let mut quotes = dedup_quotes(quotes);
        // Service name is the last key so equal (price, days, carrier)
        // quotes still come out in a stable, input-independent order.
        quotes.sort_by(|a, b| {
            a.price()
                .amount()
                .cmp(&b.price().amount())
                .then_with(|| a.transit_days().cmp(&b.transit_days()))
                .then_with(|| a.carrier().cmp(b.carrier()))
                .then_with(|| a.service().cmp(b.service()))
        });
        quotes
    }

    fn name(&self) -> &'static str {
        "cheapest-first"
    }
}

/// Removes quotes with the same carrier, service and price, keeping the
/// first occurrence.
#[must_use]
pub fn dedup_quotes(quotes: Vec<Quote>) -> Vec<Quote> {
    let mut seen = HashSet::with_capacity(quotes.len());
    quotes
        .into_iter()
        .filter(|q| {
            let (carrier, service, amount, currency) = q.dedup_key();
            seen.insert((
                carrier.to_string(),
                service.to_string(),
                amount.normalize(),
                currency.to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::quote::QuoteBuilder;
    use crate::domain::value_objects::{Money, ServiceLevel};
    use rust_decimal::Decimal;

    fn quote(carrier: &str, service: &str, cents: i64, days: u32) -> Quote {
        QuoteBuilder::new(
            carrier,
            service,
            Money::usd(Decimal::new(cents, 2)).unwrap(),
            days,
            ServiceLevel::Ground,
        )
        .build()
        .unwrap()
    }

    fn labels(quotes: &[Quote]) -> Vec<String> {
        quotes
            .iter()
            .map(|q| format!("{}/{}", q.carrier(), q.service()))
            .collect()
    }

    #[test]
    fn sorts_by_price_then_days_then_carrier() {
        let ranked = CheapestFirstStrategy::new().rank(vec![
            quote("UPS", "Ground", 2000, 3),
            quote("FedEx", "Express", 1500, 2),
            quote("DHL", "Ground", 2000, 2),
            quote("Amazon", "Ground", 2000, 3),
        ]);

        assert_eq!(
            labels(&ranked),
            vec!["FedEx/Express", "DHL/Ground", "Amazon/Ground", "UPS/Ground"]
        );
    }

    #[test]
    fn removes_exact_duplicates_only() {
        let ranked = CheapestFirstStrategy::new().rank(vec![
            quote("UPS", "Ground", 2000, 3),
            quote("UPS", "Ground", 2000, 3),
            quote("UPS", "Ground", 2100, 3),
            quote("UPS", "Express", 2000, 3),
        ]);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn duplicate_detection_ignores_decimal_scale() {
        let a = quote("UPS", "Ground", 2000, 3);
        let b = QuoteBuilder::new(
            "UPS",
            "Ground",
            Money::usd(Decimal::new(20, 0)).unwrap(),
            3,
            ServiceLevel::Ground,
        )
        .build()
        .unwrap();
        assert_eq!(dedup_quotes(vec![a, b]).len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(CheapestFirstStrategy::new().rank(Vec::new()).is_empty());
        assert_eq!(CheapestFirstStrategy::new().name(), "cheapest-first");
    }
}
