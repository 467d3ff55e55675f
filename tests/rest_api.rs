//! Router-level tests driving the REST API in-process.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use shipping_engine::api::rest::{AppState, create_router};
use shipping_engine::application::services::quote_aggregation::{
    AggregationConfig, QuoteAggregationEngine,
};
use shipping_engine::application::services::ranking_strategy::CheapestFirstStrategy;
use shipping_engine::application::services::tracking_engine::{TrackingConfig, TrackingEngine};
use shipping_engine::config::default_carriers;
use shipping_engine::domain::entities::quote::Quote;
use shipping_engine::domain::entities::quote_request::QuoteRequest;
use shipping_engine::domain::services::clock::{Clock, ManualClock};
use shipping_engine::domain::value_objects::timestamp::Timestamp;
use shipping_engine::infrastructure::cache::InMemorySynthesisCache;
use shipping_engine::infrastructure::carriers::{
    CarrierAdapter, CarrierError, CarrierRegistry, CarrierResult,
};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug)]
struct DownCarrier(&'static str);

#[async_trait]
impl CarrierAdapter for DownCarrier {
    fn name(&self) -> &str {
        self.0
    }

    async fn quote(&self, _request: &QuoteRequest) -> CarrierResult<Vec<Quote>> {
        Err(CarrierError::connection("connection refused by 10.1.2.3"))
    }
}

fn clock() -> Arc<dyn Clock> {
    // 2026-01-01T00:00:00Z
    Arc::new(ManualClock::new(Timestamp::from_secs(1_767_225_600).unwrap()))
}

fn app_with(registry: CarrierRegistry, tracking: TrackingConfig, cached: bool) -> Router {
    let clock = clock();
    let quote_engine = QuoteAggregationEngine::new(
        registry,
        Arc::new(CheapestFirstStrategy::new()),
        Arc::clone(&clock),
        AggregationConfig::with_timeout(2000),
    );
    let mut tracking_engine = TrackingEngine::new(Arc::clone(&clock), tracking);
    if cached {
        tracking_engine = tracking_engine.with_cache(Arc::new(InMemorySynthesisCache::new(3600)));
    }
    create_router(Arc::new(AppState {
        quote_engine: Arc::new(quote_engine),
        tracking_engine: Arc::new(tracking_engine),
        clock,
    }))
}

fn app() -> Router {
    app_with(
        CarrierRegistry::from_settings(&default_carriers(), "USD"),
        TrackingConfig::default(),
        true,
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn ny_to_la() -> Value {
    json!({
        "origin": {"name": "Sender", "address": "1 Broadway", "city": "New York", "state": "NY", "zip": "10004", "country": "US"},
        "destination": {"name": "Recipient", "address": "200 Spring St", "city": "Los Angeles", "state": "CA", "zip": "90012", "country": "US"},
        "packages": [{
            "type": "PARCEL",
            "dimensions": {"length": 12, "width": 10, "height": 8, "weight": 5, "unit": "IN", "weightUnit": "LB"},
            "value": 100,
            "contents": "Books"
        }],
        "serviceLevel": "GROUND"
    })
}

fn prices(body: &Value) -> Vec<f64> {
    body["quotes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| {
            let amount = &q["price"]["amount"];
            amount
                .as_f64()
                .or_else(|| amount.as_str().and_then(|s| s.parse().ok()))
                .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn post_quotes_returns_sorted_quotes() {
    let (status, body) = send(app(), post_json("/api/shipping/quotes", &ny_to_la())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["requestId"].as_str().unwrap().starts_with("REQ_"));
    assert!(body["validUntil"].is_string());
    assert_eq!(body["carriersQueried"], 4);

    let prices = prices(&body);
    assert!(!prices.is_empty());
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn quick_quote_omits_valid_until() {
    let (status, body) = send(
        app(),
        get("/api/shipping/quotes?origin=New%20York,%20NY&destination=Boston,%20MA&weight=5&service=EXPRESS"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("validUntil").is_none());
    assert!(!prices(&body).is_empty());
}

#[tokio::test]
async fn quick_quote_requires_params() {
    let (status, body) = send(app(), get("/api/shipping/quotes?origin=Boston,%20MA")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_origin_is_400() {
    let mut request = ny_to_la();
    request.as_object_mut().unwrap().remove("origin");

    let (status, body) = send(app(), post_json("/api/shipping/quotes", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "origin is required");
}

#[tokio::test]
async fn non_positive_weight_is_400() {
    let mut request = ny_to_la();
    request["packages"][0]["dimensions"]["weight"] = json!(0);

    let (status, body) = send(app(), post_json("/api/shipping/quotes", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("weight"));
}

#[tokio::test]
async fn oversized_dimensions_are_400_not_500() {
    let mut request = ny_to_la();
    for edge in ["length", "width", "height"] {
        request["packages"][0]["dimensions"][edge] = json!(10_000_000_000_000_000_000_u64);
    }

    let (status, body) = send(app(), post_json("/api/shipping/quotes", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("must not exceed"));
}

#[tokio::test]
async fn quick_quote_with_huge_weight_is_400() {
    let (status, body) = send(
        app(),
        get("/api/shipping/quotes?origin=New%20York,%20NY&destination=Boston,%20MA&weight=79228162514264337593543950335"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]["message"].as_str().unwrap().contains("weight"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let request = Request::post("/api/shipping/quotes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"origin\": "))
        .unwrap();

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn all_carriers_down_is_500_without_details() {
    let registry = CarrierRegistry::new()
        .with_adapter(Arc::new(DownCarrier("Alpha")))
        .with_adapter(Arc::new(DownCarrier("Beta")));
    let app = app_with(registry, TrackingConfig::default(), false);

    let (status, body) = send(app, post_json("/api/shipping/quotes", &ny_to_la())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "aggregation_failed");
    assert!(!body.to_string().contains("10.1.2.3"));
}

#[tokio::test]
async fn tracking_unknown_number_is_simulated() {
    let (status, body) = send(app(), get("/api/shipping/tracking/UNKNOWN123")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["trackingNumber"], "UNKNOWN123");
    let events = body["data"]["events"].as_array().unwrap();
    assert!(!events.is_empty());
    assert_eq!(events[0]["status"], "CREATED");
}

#[tokio::test]
async fn tracking_is_stable_across_requests() {
    let app = app();
    let (_, first) = send(app.clone(), get("/api/shipping/tracking/1Z999AA10123456784")).await;
    let (_, second) = send(app, get("/api/shipping/tracking/1Z999AA10123456784")).await;
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn tracking_without_simulation_is_404() {
    let config = TrackingConfig {
        simulation_enabled: false,
        ..TrackingConfig::default()
    };
    let app = app_with(
        CarrierRegistry::from_settings(&default_carriers(), "USD"),
        config,
        false,
    );

    let (status, body) = send(app, get("/api/shipping/tracking/UNKNOWN123")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "No tracking information found");
}

#[tokio::test]
async fn subscribe_returns_unique_ids() {
    let app = app();
    let uri = "/api/shipping/tracking/UNKNOWN123";
    let action = json!({"action": "subscribe"});

    let (status, first) = send(app.clone(), post_json(uri, &action)).await;
    let (_, second) = send(app, post_json(uri, &action)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    let first_id = first["subscriptionId"].as_str().unwrap();
    assert!(first_id.starts_with("SUB_"));
    assert!(first_id.len() > 4);
    assert_ne!(first["subscriptionId"], second["subscriptionId"]);
}

#[tokio::test]
async fn unsubscribe_and_refresh() {
    let app = app();
    let uri = "/api/shipping/tracking/UNKNOWN123";

    let (status, body) = send(app.clone(), post_json(uri, &json!({"action": "unsubscribe"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Unsubscribed from real-time updates");
    assert!(body.get("subscriptionId").is_none());

    let (status, body) = send(app, post_json(uri, &json!({"action": "refresh"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trackingNumber"], "UNKNOWN123");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn bogus_action_is_400() {
    let (status, body) = send(
        app(),
        post_json("/api/shipping/tracking/UNKNOWN123", &json!({"action": "bogus"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid action");
}

#[tokio::test]
async fn missing_tracking_number_is_400() {
    let (status, body) = send(app(), get("/api/shipping/tracking")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        app(),
        post_json("/api/shipping/tracking", &json!({"action": "subscribe"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tracking_with_trailing_slash_is_json_400() {
    let (status, body) = send(app(), get("/api/shipping/tracking/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, body) = send(app(), get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "No route for /api/nope");
}

#[tokio::test]
async fn health_lists_carriers() {
    let (status, body) = send(app(), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["carriers"],
        json!(["FedEx", "UPS", "DHL", "USPS"])
    );
}
