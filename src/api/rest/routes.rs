//! # REST Routes
//!
//! Router assembly.

use crate::api::rest::handlers::{
    AppState, create_quotes, get_tracking, health, missing_tracking_number, quick_quotes,
    tracking_action, unknown_route,
};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the application router.
///
/// Unmatched paths get a JSON 404 so every response carries the error
/// envelope. CORS is permissive so browser frontends on other origins can
/// call the API directly.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/shipping/quotes", get(quick_quotes).post(create_quotes))
        .route(
            "/api/shipping/tracking",
            get(missing_tracking_number).post(missing_tracking_number),
        )
        .route(
            "/api/shipping/tracking/",
            get(missing_tracking_number).post(missing_tracking_number),
        )
        .route(
            "/api/shipping/tracking/{tracking_number}",
            get(get_tracking).post(tracking_action),
        )
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
