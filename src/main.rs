//! Shipping engine server binary.
//!
//! Loads configuration, wires carriers and engines, and serves the REST API.

use anyhow::Context;
use clap::Parser;
use shipping_engine::api::rest::{AppState, create_router};
use shipping_engine::application::services::quote_aggregation::QuoteAggregationEngine;
use shipping_engine::application::services::ranking_strategy::CheapestFirstStrategy;
use shipping_engine::application::services::tracking_engine::TrackingEngine;
use shipping_engine::config::{AppConfig, LoggingSettings};
use shipping_engine::domain::services::clock::{Clock, SystemClock};
use shipping_engine::infrastructure::cache::InMemorySynthesisCache;
use shipping_engine::infrastructure::carriers::{CarrierRegistry, HttpTrackingSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How often expired synthesis anchors are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Server command line arguments.
#[derive(Parser, Debug)]
#[command(name = "shipping-engine")]
#[command(about = "Carrier quote aggregation and shipment tracking server")]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Port override
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);
    info!("Starting shipping-engine");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let registry = CarrierRegistry::from_settings(&config.carriers, &config.aggregation.currency);
    info!(carriers = ?registry.names(), "Carriers registered");

    let quote_engine = QuoteAggregationEngine::new(
        registry,
        Arc::new(CheapestFirstStrategy::new()),
        Arc::clone(&clock),
        config.aggregation_config(),
    );

    let mut tracking_engine = TrackingEngine::new(Arc::clone(&clock), config.tracking_config());
    if let Some(base_url) = &config.tracking.source_base_url {
        let source = HttpTrackingSource::new(base_url, config.tracking.source_timeout_ms)
            .context("creating tracking source")?;
        info!(base_url = %base_url, "Real tracking data enabled");
        tracking_engine = tracking_engine.with_source(Arc::new(source));
    }
    if config.tracking.cache_enabled {
        let cache = Arc::new(InMemorySynthesisCache::new(config.tracking.cache_ttl_secs));
        tracking_engine = tracking_engine.with_cache(cache);
    }
    let tracking_engine = Arc::new(tracking_engine);

    if config.tracking.cache_enabled {
        let engine = Arc::clone(&tracking_engine);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let purged = engine.purge_expired_synthesis();
                if purged > 0 {
                    info!(purged, "Purged expired simulation anchors");
                }
            }
        });
    }

    let state = Arc::new(AppState {
        quote_engine: Arc::new(quote_engine),
        tracking_engine,
        clock,
    });
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(address = %addr, "REST API listening");

    if let Err(e) = axum::serve(listener, app).await {
        warn!(error = %e, "Server stopped");
        return Err(e.into());
    }
    Ok(())
}
