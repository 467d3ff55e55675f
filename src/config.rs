//! # Configuration
//!
//! Layered application configuration.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, if present
//! 3. the file passed with `--config`, if any
//! 4. environment variables prefixed `SHIPPING__`, e.g.
//!    `SHIPPING__SERVER__PORT=8080` or
//!    `SHIPPING__AGGREGATION__PER_CARRIER_TIMEOUT_MS=2000`
//!
//! The loaded configuration is validated before use; the server refuses to
//! start on an invalid one.

use crate::application::services::quote_aggregation::AggregationConfig;
use crate::application::services::tracking_engine::TrackingConfig;
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SHIPPING";

/// Separator between nested keys in environment variables.
pub const ENV_SEPARATOR: &str = "__";

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Longest accepted cache TTL or simulation epoch (one leap year).
pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

/// Longest accepted quote validity window (one leap year).
pub const MAX_VALIDITY_HOURS: i64 = 366 * 24;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A source could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The configuration was read but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigurationError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Quote aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Default per-carrier timeout in milliseconds.
    pub per_carrier_timeout_ms: u64,
    /// Minimum quotes for a successful aggregation.
    pub min_quotes: usize,
    /// Cap on returned quotes.
    pub max_quotes: Option<usize>,
    /// Validity window of a quote response, in hours.
    pub validity_hours: i64,
    /// Quote currency.
    pub currency: String,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            per_carrier_timeout_ms: 5000,
            min_quotes: 1,
            max_quotes: None,
            validity_hours: 24,
            currency: "USD".to_string(),
        }
    }
}

/// One rate-table carrier.
///
/// Each service multiplier is optional; an absent multiplier means the
/// carrier does not offer that service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CarrierSettings {
    /// Carrier display name.
    pub name: String,
    /// Whether the carrier is queried.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Carrier-specific timeout overriding the aggregation default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Simulated response latency.
    #[serde(default)]
    pub latency_ms: u64,
    /// Reliability rating, 1 to 5.
    #[serde(default = "default_reliability")]
    pub reliability: u8,
    /// Ground price multiplier.
    #[serde(default)]
    pub ground: Option<Decimal>,
    /// Express price multiplier.
    #[serde(default)]
    pub express: Option<Decimal>,
    /// Overnight price multiplier.
    #[serde(default)]
    pub overnight: Option<Decimal>,
    /// International price multiplier.
    #[serde(default)]
    pub international: Option<Decimal>,
}

fn default_true() -> bool {
    true
}

fn default_reliability() -> u8 {
    4
}

impl CarrierSettings {
    fn new(name: &str, reliability: u8) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            timeout_ms: None,
            latency_ms: 0,
            reliability,
            ground: None,
            express: None,
            overnight: None,
            international: None,
        }
    }

    fn multipliers(&self) -> [(&'static str, Option<Decimal>); 4] {
        [
            ("ground", self.ground),
            ("express", self.express),
            ("overnight", self.overnight),
            ("international", self.international),
        ]
    }
}

/// The demo carrier line-up.
///
/// FedEx and UPS offer the full domestic menu, DHL is express-focused with
/// international service, USPS is ground-focused.
#[must_use]
pub fn default_carriers() -> Vec<CarrierSettings> {
    vec![
        CarrierSettings {
            ground: Some(Decimal::new(110, 2)),
            express: Some(Decimal::new(180, 2)),
            overnight: Some(Decimal::new(250, 2)),
            ..CarrierSettings::new("FedEx", 5)
        },
        CarrierSettings {
            ground: Some(Decimal::new(105, 2)),
            express: Some(Decimal::new(170, 2)),
            overnight: Some(Decimal::new(230, 2)),
            ..CarrierSettings::new("UPS", 5)
        },
        CarrierSettings {
            express: Some(Decimal::new(190, 2)),
            overnight: Some(Decimal::new(260, 2)),
            international: Some(Decimal::new(320, 2)),
            ..CarrierSettings::new("DHL", 4)
        },
        CarrierSettings {
            ground: Some(Decimal::new(80, 2)),
            express: Some(Decimal::new(150, 2)),
            ..CarrierSettings::new("USPS", 4)
        },
    ]
}

/// Tracking settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    /// Fall back to simulated histories.
    pub simulation_enabled: bool,
    /// Anchor simulations at first synthesis.
    pub cache_enabled: bool,
    /// Lifetime of a synthesis anchor.
    pub cache_ttl_secs: u64,
    /// Simulation epoch length when the cache is off.
    pub epoch_secs: u64,
    /// Carrier gateway for real tracking data.
    pub source_base_url: Option<String>,
    /// Timeout for one gateway lookup.
    pub source_timeout_ms: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            simulation_enabled: true,
            cache_enabled: true,
            cache_ttl_secs: 86_400,
            epoch_secs: 604_800,
            source_base_url: None,
            source_timeout_ms: 5000,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server.
    pub server: ServerSettings,
    /// Logging.
    pub logging: LoggingSettings,
    /// Quote aggregation.
    pub aggregation: AggregationSettings,
    /// Carrier line-up, in query order.
    pub carriers: Vec<CarrierSettings>,
    /// Tracking.
    pub tracking: TrackingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
            aggregation: AggregationSettings::default(),
            carriers: default_carriers(),
            tracking: TrackingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads and validates the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Load` if a source cannot be read or
    /// parsed, and `ConfigurationError::Invalid` if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder =
            Config::builder().add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Invalid` describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let agg = &self.aggregation;
        if agg.per_carrier_timeout_ms == 0 {
            return Err(ConfigurationError::invalid(
                "aggregation.per_carrier_timeout_ms must be positive",
            ));
        }
        if agg.validity_hours <= 0 || agg.validity_hours > MAX_VALIDITY_HOURS {
            return Err(ConfigurationError::invalid(format!(
                "aggregation.validity_hours must be between 1 and {MAX_VALIDITY_HOURS}"
            )));
        }
        if let Some(max) = agg.max_quotes
            && max < agg.min_quotes.max(1)
        {
            return Err(ConfigurationError::invalid(
                "aggregation.max_quotes must be at least min_quotes",
            ));
        }
        if agg.currency.len() != 3 || !agg.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigurationError::invalid(
                "aggregation.currency must be a 3-letter code",
            ));
        }

        self.validate_carriers()?;

        let tracking = &self.tracking;
        if tracking.epoch_secs == 0 || tracking.epoch_secs > MAX_WINDOW_SECS {
            return Err(ConfigurationError::invalid(format!(
                "tracking.epoch_secs must be between 1 and {MAX_WINDOW_SECS}"
            )));
        }
        if tracking.cache_enabled && tracking.cache_ttl_secs == 0 {
            return Err(ConfigurationError::invalid(
                "tracking.cache_ttl_secs must be positive when the cache is enabled",
            ));
        }
        if tracking.cache_ttl_secs > MAX_WINDOW_SECS {
            return Err(ConfigurationError::invalid(format!(
                "tracking.cache_ttl_secs must not exceed {MAX_WINDOW_SECS}"
            )));
        }
        if tracking.source_timeout_ms == 0 {
            return Err(ConfigurationError::invalid(
                "tracking.source_timeout_ms must be positive",
            ));
        }
        if let Some(url) = &tracking.source_base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigurationError::invalid(
                "tracking.source_base_url must be an http(s) URL",
            ));
        }
        Ok(())
    }

    fn validate_carriers(&self) -> Result<(), ConfigurationError> {
        let mut names = HashSet::new();
        let mut enabled = 0usize;

        for carrier in &self.carriers {
            let name = carrier.name.trim();
            if name.is_empty() {
                return Err(ConfigurationError::invalid("carrier name must not be empty"));
            }
            if !names.insert(name.to_lowercase()) {
                return Err(ConfigurationError::invalid(format!(
                    "duplicate carrier '{name}'"
                )));
            }
            if !(1..=5).contains(&carrier.reliability) {
                return Err(ConfigurationError::invalid(format!(
                    "carrier '{name}': reliability must be 1-5"
                )));
            }
            if carrier.timeout_ms == Some(0) {
                return Err(ConfigurationError::invalid(format!(
                    "carrier '{name}': timeout_ms must be positive"
                )));
            }

            let mut offered = 0usize;
            for (service, multiplier) in carrier.multipliers() {
                if let Some(multiplier) = multiplier {
                    if multiplier <= Decimal::ZERO {
                        return Err(ConfigurationError::invalid(format!(
                            "carrier '{name}': {service} multiplier must be positive"
                        )));
                    }
                    offered += 1;
                }
            }
            if offered == 0 {
                return Err(ConfigurationError::invalid(format!(
                    "carrier '{name}' offers no service"
                )));
            }
            if carrier.enabled {
                enabled += 1;
            }
        }

        if enabled == 0 {
            return Err(ConfigurationError::invalid("no carrier is enabled"));
        }
        Ok(())
    }

    /// Address to bind the HTTP server to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Aggregation engine configuration.
    #[must_use]
    pub fn aggregation_config(&self) -> AggregationConfig {
        let mut config = AggregationConfig::with_timeout(self.aggregation.per_carrier_timeout_ms)
            .with_min_quotes(self.aggregation.min_quotes)
            .with_validity_hours(self.aggregation.validity_hours);
        if let Some(max) = self.aggregation.max_quotes {
            config = config.with_max_quotes(max);
        }
        config
    }

    /// Tracking engine configuration.
    #[must_use]
    pub fn tracking_config(&self) -> TrackingConfig {
        TrackingConfig {
            simulation_enabled: self.tracking.simulation_enabled,
            epoch_secs: self.tracking.epoch_secs,
            source_timeout_ms: self.tracking.source_timeout_ms,
        }
    }
}
