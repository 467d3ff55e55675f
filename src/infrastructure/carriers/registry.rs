//! # Carrier Registry
//!
//! Ordered set of carrier adapters the aggregation engine fans out to.

use crate::config::CarrierSettings;
use crate::domain::value_objects::ServiceLevel;
use crate::infrastructure::carriers::rate_table::{RateTable, RateTableCarrier};
use crate::infrastructure::carriers::traits::CarrierAdapter;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Registered carrier adapters, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CarrierRegistry {
    adapters: Vec<Arc<dyn CarrierAdapter>>,
}

impl CarrierRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds rate-table carriers from settings, skipping disabled ones.
    #[must_use]
    pub fn from_settings(carriers: &[CarrierSettings], currency: &str) -> Self {
        let mut registry = Self::new();
        for settings in carriers.iter().filter(|c| c.enabled) {
            let mut table = RateTable::new(&settings.name, settings.reliability)
                .with_currency(currency);
            let offerings = [
                (ServiceLevel::Ground, settings.ground),
                (ServiceLevel::Express, settings.express),
                (ServiceLevel::Overnight, settings.overnight),
                (ServiceLevel::International, settings.international),
            ];
            for (level, multiplier) in offerings {
                if let Some(multiplier) = multiplier {
                    table = table.with_offering(level, multiplier);
                }
            }

            let mut carrier = RateTableCarrier::new(table)
                .with_latency(Duration::from_millis(settings.latency_ms));
            if let Some(timeout_ms) = settings.timeout_ms {
                carrier = carrier.with_timeout_ms(timeout_ms);
            }
            registry.register(Arc::new(carrier));
        }
        info!(carriers = ?registry.names(), "Carrier registry built");
        registry
    }

    /// Adds an adapter.
    pub fn register(&mut self, adapter: Arc<dyn CarrierAdapter>) {
        self.adapters.push(adapter);
    }

    /// Adds an adapter, builder style.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn CarrierAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Returns the adapters in registration order.
    #[must_use]
    pub fn adapters(&self) -> &[Arc<dyn CarrierAdapter>] {
        &self.adapters
    }

    /// Returns the carrier names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Returns the number of adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
