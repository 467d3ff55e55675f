//! # Tracking Engine
//!
//! Resolves a tracking number to a [`TrackingHistory`].
//!
//! Lookup order:
//!
//! 1. the authoritative [`TrackingSource`], if one is configured
//! 2. a deterministic simulation, if enabled
//! 3. `NotFound`
//!
//! Upstream failures are logged and treated as "no data"; they never
//! surface to the caller.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::tracking_simulation::{epoch_anchor, history_at, seed_for};
use crate::domain::entities::tracking::TrackingHistory;
use crate::domain::services::clock::Clock;
use crate::domain::value_objects::TrackingNumber;
use crate::infrastructure::cache::synthesis_cache::InMemorySynthesisCache;
use crate::infrastructure::carriers::error::CarrierError;
use crate::infrastructure::carriers::traits::TrackingSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Configuration for the tracking engine.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Fall back to simulated histories when no real data exists.
    pub simulation_enabled: bool,
    /// Simulation epoch length used when no cache is attached.
    pub epoch_secs: u64,
    /// Upper bound on one tracking-source lookup, in milliseconds.
    pub source_timeout_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            simulation_enabled: true,
            epoch_secs: 604_800,
            source_timeout_ms: 5000,
        }
    }
}

/// Tracking lookups over real and simulated data.
#[derive(Debug, Clone)]
pub struct TrackingEngine {
    source: Option<Arc<dyn TrackingSource>>,
    cache: Option<Arc<InMemorySynthesisCache>>,
    clock: Arc<dyn Clock>,
    config: TrackingConfig,
}

impl TrackingEngine {
    /// Creates an engine with no tracking source and no cache.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, config: TrackingConfig) -> Self {
        Self {
            source: None,
            cache: None,
            clock,
            config,
        }
    }

    /// Attaches an authoritative tracking source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn TrackingSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Attaches a synthesis cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<InMemorySynthesisCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Fetches real tracking data, surfacing source failures.
    ///
    /// Returns `Ok(None)` when no source is configured or the carrier has
    /// no record.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Upstream` if the source fails or does not
    /// answer within `source_timeout_ms`.
    pub async fn fetch_real_history(
        &self,
        tracking_number: &TrackingNumber,
    ) -> ApplicationResult<Option<TrackingHistory>> {
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let timeout_ms = self.config.source_timeout_ms;

        let history = timeout(
            Duration::from_millis(timeout_ms),
            source.fetch_history(tracking_number),
        )
        .await
        .map_err(|_| {
            CarrierError::timeout_with_duration(
                format!("{} did not answer", source.name()),
                timeout_ms,
            )
        })??;

        debug!(
            tracking_number = %tracking_number,
            source = source.name(),
            found = history.is_some(),
            "Tracking source answered"
        );
        Ok(history)
    }

    /// Fetches real tracking data.
    ///
    /// Returns `None` when no source is configured, the carrier has no
    /// record, or the lookup fails or times out. Failures are logged.
    pub async fn track_package(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Option<TrackingHistory> {
        match self.fetch_real_history(tracking_number).await {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    tracking_number = %tracking_number,
                    retryable = e.is_retryable(),
                    error = %e,
                    "Tracking source failed"
                );
                None
            }
        }
    }

    /// Synthesises the current simulated history.
    ///
    /// Deterministic for a given tracking number and clock reading. With a
    /// cache attached, the schedule is anchored at the first synthesis;
    /// otherwise at the start of the current seed-shifted epoch.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Internal` if the synthesised history
    /// violates a history invariant, which the schedule rules out.
    pub fn simulate_real_time_tracking(
        &self,
        tracking_number: &TrackingNumber,
    ) -> ApplicationResult<TrackingHistory> {
        let now = self.clock.now();
        let anchor = match &self.cache {
            Some(cache) => cache.anchor_for(tracking_number, now),
            None => epoch_anchor(
                seed_for(tracking_number.as_str()),
                now,
                self.config.epoch_secs,
            ),
        };

        history_at(tracking_number, anchor, now).map_err(|e| {
            warn!(
                tracking_number = %tracking_number,
                error = %e,
                "Simulation produced an invalid history"
            );
            ApplicationError::internal(format!("simulation failed: {e}"))
        })
    }

    /// Real data if any, else a simulated history.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::NotFound` when there is no real data and
    ///   simulation is disabled
    /// - `ApplicationError::Internal` if simulation fails
    pub async fn lookup(
        &self,
        tracking_number: &TrackingNumber,
    ) -> ApplicationResult<TrackingHistory> {
        if let Some(history) = self.track_package(tracking_number).await {
            return Ok(history);
        }
        if !self.config.simulation_enabled {
            return Err(ApplicationError::not_found(
                "tracking",
                tracking_number.as_str(),
            ));
        }
        self.simulate_real_time_tracking(tracking_number)
    }

    /// Drops expired synthesis anchors; returns how many were removed.
    pub fn purge_expired_synthesis(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |cache| cache.purge_expired(self.clock.now()))
    }
}
