//! # Quote Aggregation Engine
//!
//! Orchestrates quote collection and ordering.
//!
//! This module provides the [`QuoteAggregationEngine`] which fans one
//! [`QuoteRequest`] out to every registered carrier adapter concurrently,
//! bounds each adapter by its own timeout, and merges whatever came back
//! into one ordered list.
//!
//! A failing or slow carrier is a soft failure: it contributes no quotes
//! and is logged. The aggregation fails only when no carrier answered.
//! Dropping the returned future aborts every adapter still in flight.

use crate::application::error::ApplicationResult;
use crate::application::services::ranking_strategy::{CheapestFirstStrategy, RankingStrategy};
use crate::domain::entities::quote::Quote;
use crate::domain::entities::quote_request::QuoteRequest;
use crate::domain::services::clock::{Clock, SystemClock};
use crate::domain::value_objects::RequestId;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::infrastructure::carriers::registry::CarrierRegistry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{self, JoinSet};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Configuration for quote aggregation.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Per-carrier timeout in milliseconds, unless the adapter overrides it.
    pub per_carrier_timeout_ms: u64,
    /// Minimum number of quotes required.
    pub min_quotes: usize,
    /// Maximum number of quotes to return.
    pub max_quotes: Option<usize>,
    /// How long a result stays valid, in hours.
    pub validity_hours: i64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            per_carrier_timeout_ms: 5000,
            min_quotes: 1,
            max_quotes: None,
            validity_hours: 24,
        }
    }
}

impl AggregationConfig {
    /// Creates a configuration with the given per-carrier timeout.
    #[must_use]
    pub fn with_timeout(per_carrier_timeout_ms: u64) -> Self {
        Self {
            per_carrier_timeout_ms,
            ..Default::default()
        }
    }

    /// Sets the minimum number of quotes required.
    #[must_use]
    pub fn with_min_quotes(mut self, min: usize) -> Self {
        self.min_quotes = min;
        self
    }

    /// Sets the maximum number of quotes to return.
    #[must_use]
    pub fn with_max_quotes(mut self, max: usize) -> Self {
        self.max_quotes = Some(max);
        self
    }

    /// Sets the validity window.
    #[must_use]
    pub fn with_validity_hours(mut self, hours: i64) -> Self {
        self.validity_hours = hours;
        self
    }
}

/// Why one carrier contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierFailure {
    /// Carrier name.
    pub carrier: String,
    /// Failure description.
    pub reason: String,
    /// True if the carrier ran out of time.
    pub timed_out: bool,
}

impl fmt::Display for CarrierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.carrier, self.reason)
    }
}

/// Result of quote aggregation.
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    /// Ordered quotes (best first), never empty.
    pub quotes: Vec<Quote>,
    /// Identifier of this aggregation.
    pub request_id: RequestId,
    /// When the result was generated.
    pub generated_at: Timestamp,
    /// End of the validity window.
    pub valid_until: Timestamp,
    /// Number of carriers queried.
    pub carriers_queried: usize,
    /// Number of carriers that answered in time.
    pub carriers_responded: usize,
    /// Carriers that failed or timed out.
    pub failures: Vec<CarrierFailure>,
}

impl AggregationOutcome {
    /// Returns the best quote.
    #[must_use]
    pub fn best_quote(&self) -> Option<&Quote> {
        self.quotes.first()
    }
}

/// Error type for aggregation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// No carriers registered.
    NoCarriersAvailable,
    /// Every carrier failed or timed out.
    AllCarriersFailed(Vec<String>),
    /// Carriers answered but produced no quote.
    NoQuotes,
    /// Fewer quotes than required.
    InsufficientQuotes {
        /// Number of quotes collected.
        collected: usize,
        /// Number of quotes required.
        required: usize,
    },
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCarriersAvailable => write!(f, "no carriers available"),
            Self::AllCarriersFailed(errors) => {
                write!(f, "all carriers failed: {}", errors.join(", "))
            }
            Self::NoQuotes => write!(f, "no carrier returned a quote"),
            Self::InsufficientQuotes {
                collected,
                required,
            } => write!(f, "insufficient quotes: got {collected}, need {required}"),
        }
    }
}

impl std::error::Error for AggregationError {}

/// Engine for collecting and ordering quotes from every carrier.
#[derive(Debug, Clone)]
pub struct QuoteAggregationEngine {
    registry: CarrierRegistry,
    ranking_strategy: Arc<dyn RankingStrategy>,
    clock: Arc<dyn Clock>,
    config: AggregationConfig,
}

impl QuoteAggregationEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        registry: CarrierRegistry,
        ranking_strategy: Arc<dyn RankingStrategy>,
        clock: Arc<dyn Clock>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            registry,
            ranking_strategy,
            clock,
            config,
        }
    }

    /// Creates an engine with cheapest-first ordering, the system clock and
    /// default configuration.
    #[must_use]
    pub fn with_defaults(registry: CarrierRegistry) -> Self {
        Self::new(
            registry,
            Arc::new(CheapestFirstStrategy::new()),
            Arc::new(SystemClock),
            AggregationConfig::default(),
        )
    }

    /// Collects quotes from every carrier and orders them.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Domain` if the request violates its invariants
    ///   (checked before any carrier is contacted)
    /// - `ApplicationError::Aggregation` if no carrier is registered, every
    ///   carrier failed, or too few quotes came back
    pub async fn get_all_quotes(
        &self,
        request: &QuoteRequest,
    ) -> ApplicationResult<AggregationOutcome> {
        request.validate()?;

        let carriers_queried = self.registry.len();
        if carriers_queried == 0 {
            return Err(AggregationError::NoCarriersAvailable.into());
        }

        let (quotes, failures) = self.collect_from_carriers(request).await;
        let carriers_responded = carriers_queried.saturating_sub(failures.len());

        if carriers_responded == 0 {
            return Err(AggregationError::AllCarriersFailed(
                failures.iter().map(ToString::to_string).collect(),
            )
            .into());
        }

        let total_collected = quotes.len();
        let mut quotes = self.ranking_strategy.rank(quotes);
        if quotes.is_empty() {
            return Err(AggregationError::NoQuotes.into());
        }
        if quotes.len() < self.config.min_quotes {
            return Err(AggregationError::InsufficientQuotes {
                collected: quotes.len(),
                required: self.config.min_quotes,
            }
            .into());
        }
        if let Some(max) = self.config.max_quotes {
            quotes.truncate(max.max(1));
        }

        let generated_at = self.clock.now();
        let outcome = AggregationOutcome {
            request_id: RequestId::generate(),
            generated_at,
            valid_until: generated_at.add_hours(self.config.validity_hours),
            carriers_queried,
            carriers_responded,
            failures,
            quotes,
        };

        info!(
            request_id = %outcome.request_id,
            carriers_queried,
            carriers_responded,
            total_collected,
            returned = outcome.quotes.len(),
            strategy = self.ranking_strategy.name(),
            "Quote aggregation complete"
        );
        Ok(outcome)
    }

    /// Queries every carrier concurrently, each under its own timeout.
    ///
    /// Tasks live in a [`JoinSet`], so dropping this future aborts them.
    async fn collect_from_carriers(
        &self,
        request: &QuoteRequest,
    ) -> (Vec<Quote>, Vec<CarrierFailure>) {
        let request = Arc::new(request.clone());
        let mut tasks = JoinSet::new();
        // A panicked task only reports its id; keep the carrier name for it.
        let mut names: HashMap<task::Id, String> = HashMap::new();

        for carrier in self.registry.adapters() {
            let carrier = Arc::clone(carrier);
            let request = Arc::clone(&request);
            let timeout_ms = carrier
                .timeout_ms()
                .unwrap_or(self.config.per_carrier_timeout_ms);

            let spawned_name = carrier.name().to_string();
            let handle = tasks.spawn(async move {
                let name = carrier.name().to_string();
                let deadline = Duration::from_millis(timeout_ms);
                let result = match timeout(deadline, carrier.quote(&request)).await {
                    Ok(Ok(quotes)) => Ok(quotes),
                    Ok(Err(e)) => Err(CarrierFailure {
                        carrier: name.clone(),
                        reason: e.to_string(),
                        timed_out: e.is_timeout(),
                    }),
                    Err(_) => Err(CarrierFailure {
                        carrier: name.clone(),
                        reason: format!("no response within {timeout_ms}ms"),
                        timed_out: true,
                    }),
                };
                (name, result)
            });
            names.insert(handle.id(), spawned_name);
        }

        let mut quotes = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(carrier_quotes))) => {
                    debug!(carrier = %name, quotes = carrier_quotes.len(), "Carrier responded");
                    quotes.extend(carrier_quotes);
                }
                Ok((_, Err(failure))) => {
                    warn!(
                        carrier = %failure.carrier,
                        timed_out = failure.timed_out,
                        error = %failure.reason,
                        "Carrier quote failed"
                    );
                    failures.push(failure);
                }
                Err(e) => {
                    let carrier = names
                        .remove(&e.id())
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!(carrier = %carrier, error = %e, "Carrier task aborted");
                    failures.push(CarrierFailure {
                        carrier,
                        reason: format!("task failed: {e}"),
                        timed_out: false,
                    });
                }
            }
        }

        (quotes, failures)
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Returns the registered carrier names.
    #[must_use]
    pub fn carrier_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Returns the ranking strategy name.
    #[must_use]
    pub fn ranking_strategy_name(&self) -> &'static str {
        self.ranking_strategy.name()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::error::ApplicationError;
    use crate::domain::entities::address::Address;
    use crate::domain::entities::package::{Dimensions, Package};
    use crate::domain::entities::quote::QuoteBuilder;
    use crate::domain::entities::quote_request::QuoteRequestBuilder;
    use crate::domain::services::clock::ManualClock;
    use crate::domain::value_objects::{Money, PackageType, ServiceLevel};
    use crate::infrastructure::carriers::error::{CarrierError, CarrierResult};
    use crate::infrastructure::carriers::traits::CarrierAdapter;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct MockCarrierAdapter {
        name: String,
        result: Result<Vec<(String, i64, u32)>, CarrierError>,
        delay_ms: u64,
        timeout_ms: Option<u64>,
        finished: Arc<AtomicBool>,
    }

    impl MockCarrierAdapter {
        fn successful(name: &str, services: &[(&str, i64, u32)]) -> Self {
            Self {
                name: name.to_string(),
                result: Ok(services
                    .iter()
                    .map(|(s, cents, days)| ((*s).to_string(), *cents, *days))
                    .collect()),
                delay_ms: 0,
                timeout_ms: None,
                finished: Arc::new(AtomicBool::new(false)),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                result: Err(CarrierError::quote_unavailable("no service to destination")),
                ..Self::successful(name, &[])
            }
        }

        fn slow(name: &str, delay_ms: u64) -> Self {
            Self {
                delay_ms,
                ..Self::successful(name, &[("Slow Ground", 100, 5)])
            }
        }
    }

    #[async_trait]
    impl CarrierAdapter for MockCarrierAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        fn timeout_ms(&self) -> Option<u64> {
            self.timeout_ms
        }

        async fn quote(&self, _request: &QuoteRequest) -> CarrierResult<Vec<Quote>> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.finished.store(true, Ordering::SeqCst);
            let services = self.result.clone()?;
            Ok(services
                .into_iter()
                .map(|(service, cents, days)| {
                    QuoteBuilder::new(
                        &self.name,
                        service,
                        Money::usd(Decimal::new(cents, 2)).unwrap(),
                        days,
                        ServiceLevel::Ground,
                    )
                    .build()
                    .unwrap()
                })
                .collect())
        }
    }

    #[derive(Debug)]
    struct CrashingCarrierAdapter;

    #[async_trait]
    impl CarrierAdapter for CrashingCarrierAdapter {
        fn name(&self) -> &str {
            "DHL"
        }

        #[allow(clippy::panic)]
        async fn quote(&self, _request: &QuoteRequest) -> CarrierResult<Vec<Quote>> {
            panic!("rate table corrupted")
        }
    }

    fn create_test_request() -> QuoteRequest {
        let parcel = Package::new(
            PackageType::Parcel,
            Dimensions::imperial(
                Decimal::new(12, 0),
                Decimal::new(12, 0),
                Decimal::new(12, 0),
                Decimal::new(5, 0),
            ),
            Decimal::ZERO,
            "",
        )
        .unwrap();
        QuoteRequestBuilder::new(
            Address::from_flat("New York, NY").unwrap(),
            Address::from_flat("Los Angeles, CA").unwrap(),
        )
        .package(parcel)
        .build()
        .unwrap()
    }

    fn engine(
        adapters: Vec<Arc<dyn CarrierAdapter>>,
        config: AggregationConfig,
    ) -> QuoteAggregationEngine {
        let mut registry = CarrierRegistry::new();
        for adapter in adapters {
            registry.register(adapter);
        }
        QuoteAggregationEngine::new(
            registry,
            Arc::new(CheapestFirstStrategy::new()),
            Arc::new(ManualClock::new(Timestamp::from_secs(1_700_000_000).unwrap())),
            config,
        )
    }

    #[tokio::test]
    async fn get_all_quotes_success() {
        let engine = engine(
            vec![
                Arc::new(MockCarrierAdapter::successful(
                    "UPS",
                    &[("Ground", 2000, 3), ("Express", 3500, 2)],
                )),
                Arc::new(MockCarrierAdapter::successful("FedEx", &[("Ground", 1900, 3)])),
            ],
            AggregationConfig::with_timeout(1000),
        );

        let outcome = engine.get_all_quotes(&create_test_request()).await.unwrap();
        assert_eq!(outcome.quotes.len(), 3);
        assert_eq!(outcome.carriers_queried, 2);
        assert_eq!(outcome.carriers_responded, 2);
        assert_eq!(outcome.best_quote().unwrap().carrier(), "FedEx");
        assert_eq!(outcome.valid_until, outcome.generated_at.add_hours(24));
        assert!(outcome.request_id.to_string().starts_with("REQ_"));
    }

    #[tokio::test]
    async fn get_all_quotes_no_carriers() {
        let engine = engine(vec![], AggregationConfig::default());
        let err = engine.get_all_quotes(&create_test_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Aggregation(AggregationError::NoCarriersAvailable)
        ));
    }

    #[tokio::test]
    async fn get_all_quotes_all_fail() {
        let engine = engine(
            vec![
                Arc::new(MockCarrierAdapter::failing("UPS")),
                Arc::new(MockCarrierAdapter::failing("FedEx")),
            ],
            AggregationConfig::with_timeout(1000),
        );

        let err = engine.get_all_quotes(&create_test_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Aggregation(AggregationError::AllCarriersFailed(ref errors))
                if errors.len() == 2
        ));
    }

    #[tokio::test]
    async fn panicking_carrier_is_named_in_failures() {
        let engine = engine(
            vec![
                Arc::new(MockCarrierAdapter::successful("UPS", &[("Ground", 1500, 3)])),
                Arc::new(CrashingCarrierAdapter),
            ],
            AggregationConfig::with_timeout(1000),
        );

        let outcome = engine.get_all_quotes(&create_test_request()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.carriers_responded, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].carrier, "DHL");
        assert!(!outcome.failures[0].timed_out);
    }

    #[tokio::test]
    async fn get_all_quotes_partial_failure() {
        let engine = engine(
            vec![
                Arc::new(MockCarrierAdapter::successful("UPS", &[("Ground", 2000, 3)])),
                Arc::new(MockCarrierAdapter::failing("FedEx")),
            ],
            AggregationConfig::with_timeout(1000),
        );

        let outcome = engine.get_all_quotes(&create_test_request()).await.unwrap();
        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.carriers_responded, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].carrier, "FedEx");
        assert!(!outcome.failures[0].timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_carrier_does_not_block_fast_one() {
        let engine = engine(
            vec![
                Arc::new(MockCarrierAdapter::slow("Slowpoke", 10_000)),
                Arc::new(MockCarrierAdapter::successful("UPS", &[("Ground", 2000, 3)])),
            ],
            AggregationConfig::with_timeout(200),
        );

        let outcome = engine.get_all_quotes(&create_test_request()).await.unwrap();
        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn all_carriers_timing_out_is_an_error() {
        let engine = engine(
            vec![Arc::new(MockCarrierAdapter::slow("Slowpoke", 10_000))],
            AggregationConfig::with_timeout(50),
        );

        let err = engine.get_all_quotes(&create_test_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Aggregation(AggregationError::AllCarriersFailed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn adapter_timeout_overrides_default() {
        let mut patient = MockCarrierAdapter::slow("Patient", 1_000);
        patient.timeout_ms = Some(5_000);
        let engine = engine(vec![Arc::new(patient)], AggregationConfig::with_timeout(50));

        let outcome = engine.get_all_quotes(&create_test_request()).await.unwrap();
        assert_eq!(outcome.quotes.len(), 1);
    }

    #[tokio::test]
    async fn empty_answers_are_no_quotes() {
        let engine = engine(
            vec![Arc::new(MockCarrierAdapter::successful("UPS", &[]))],
            AggregationConfig::with_timeout(1000),
        );
        let err = engine.get_all_quotes(&create_test_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Aggregation(AggregationError::NoQuotes)
        ));
    }

    #[tokio::test]
    async fn min_and_max_quotes() {
        let adapters = || -> Vec<Arc<dyn CarrierAdapter>> {
            vec![Arc::new(MockCarrierAdapter::successful(
                "UPS",
                &[("Ground", 2000, 3), ("Express", 3000, 2), ("Overnight", 5000, 1)],
            ))]
        };

        let config = AggregationConfig::with_timeout(1000).with_max_quotes(2);
        let capped = engine(adapters(), config);
        let outcome = capped.get_all_quotes(&create_test_request()).await.unwrap();
        assert_eq!(outcome.quotes.len(), 2);

        let config = AggregationConfig::with_timeout(1000).with_min_quotes(4);
        let demanding = engine(adapters(), config);
        let err = demanding.get_all_quotes(&create_test_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Aggregation(AggregationError::InsufficientQuotes {
                collected: 3,
                required: 4
            })
        ));
    }

    #[tokio::test]
    async fn duplicates_are_removed() {
        let engine = engine(
            vec![Arc::new(MockCarrierAdapter::successful(
                "UPS",
                &[("Ground", 2000, 3), ("Ground", 2000, 3)],
            ))],
            AggregationConfig::with_timeout(1000),
        );
        let outcome = engine.get_all_quotes(&create_test_request()).await.unwrap();
        assert_eq!(outcome.quotes.len(), 1);
    }

    #[tokio::test]
    async fn invalid_request_rejected_before_dispatch() {
        let adapter = MockCarrierAdapter::successful("UPS", &[("Ground", 2000, 3)]);
        let finished = Arc::clone(&adapter.finished);
        let engine = engine(vec![Arc::new(adapter)], AggregationConfig::with_timeout(1000));

        let mut json = serde_json::to_value(create_test_request()).unwrap();
        json["packages"] = serde_json::json!([]);
        let request: QuoteRequest = serde_json::from_value(json).unwrap();

        let err = engine.get_all_quotes(&request).await.unwrap_err();
        assert!(err.is_validation());
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_aggregation_abandons_pending_carriers() {
        let adapter = MockCarrierAdapter::slow("Slowpoke", 1_000);
        let finished = Arc::clone(&adapter.finished);
        let engine = engine(vec![Arc::new(adapter)], AggregationConfig::with_timeout(5_000));

        let request = create_test_request();
        let cancelled = timeout(Duration::from_millis(100), engine.get_all_quotes(&request)).await;
        assert!(cancelled.is_err());

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[test]
    fn aggregation_config_builder() {
        let config = AggregationConfig::with_timeout(3000)
            .with_min_quotes(2)
            .with_max_quotes(10)
            .with_validity_hours(12);

        assert_eq!(config.per_carrier_timeout_ms, 3000);
        assert_eq!(config.min_quotes, 2);
        assert_eq!(config.max_quotes, Some(10));
        assert_eq!(config.validity_hours, 12);
    }

    #[test]
    fn aggregation_error_display() {
        assert_eq!(
            AggregationError::NoCarriersAvailable.to_string(),
            "no carriers available"
        );
        let err = AggregationError::InsufficientQuotes {
            collected: 1,
            required: 3,
        };
        assert_eq!(err.to_string(), "insufficient quotes: got 1, need 3");
    }
}
