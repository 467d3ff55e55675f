//! # REST Handlers
//!
//! Request DTOs, response DTOs, and the axum handlers behind
//! [`create_router`](super::routes::create_router).
//!
//! Request bodies are deserialized leniently (every field optional) and then
//! converted into domain types, so a missing field produces a 400 naming the
//! field rather than a generic body rejection.

use crate::api::rest::error::{ApiError, ApiResult};
use crate::application::services::quote_aggregation::QuoteAggregationEngine;
use crate::application::services::tracking_engine::TrackingEngine;
use crate::domain::entities::address::{Address, split_city_state};
use crate::domain::entities::package::{Dimensions, Package};
use crate::domain::entities::quote::Quote;
use crate::domain::entities::quote_request::{QuoteRequest, QuoteRequestBuilder};
use crate::domain::entities::tracking::TrackingHistory;
use crate::domain::services::clock::Clock;
use crate::domain::value_objects::enums::{LengthUnit, PackageType, ServiceLevel, WeightUnit};
use crate::domain::value_objects::ids::{RequestId, SubscriptionId, TrackingNumber};
use crate::domain::value_objects::timestamp::Timestamp;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Name given to the origin of a quick quote.
pub const QUICK_QUOTE_SENDER: &str = "Sender";
/// Name given to the destination of a quick quote.
pub const QUICK_QUOTE_RECIPIENT: &str = "Recipient";
/// Edge length of the quick-quote parcel, in inches.
pub const QUICK_QUOTE_EDGE_IN: i64 = 12;
/// Declared value of the quick-quote parcel.
pub const QUICK_QUOTE_VALUE: i64 = 100;
/// Contents of the quick-quote parcel.
pub const QUICK_QUOTE_CONTENTS: &str = "General merchandise";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Quote aggregator.
    pub quote_engine: Arc<QuoteAggregationEngine>,
    /// Tracking engine.
    pub tracking_engine: Arc<TrackingEngine>,
    /// Clock for response timestamps.
    pub clock: Arc<dyn Clock>,
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Address as sent by clients: either a structured object or a flat
/// `"City, ST"` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    /// `"New York, NY"`.
    Flat(String),
    /// Structured address.
    Structured(AddressBody),
}

/// Structured address body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    /// Contact name.
    pub name: Option<String>,
    /// Street line.
    #[serde(alias = "street")]
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or region.
    pub state: Option<String>,
    /// Postal code.
    #[serde(alias = "postalCode")]
    pub zip: Option<String>,
    /// ISO country code.
    pub country: Option<String>,
}

/// Package dimensions body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionsBody {
    /// Length.
    pub length: Option<Decimal>,
    /// Width.
    pub width: Option<Decimal>,
    /// Height.
    pub height: Option<Decimal>,
    /// Weight.
    pub weight: Option<Decimal>,
    /// `IN` or `CM`.
    pub unit: Option<String>,
    /// `LB` or `KG`.
    pub weight_unit: Option<String>,
}

/// Package body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageBody {
    /// Package type.
    #[serde(rename = "type")]
    pub package_type: Option<String>,
    /// Dimensions and weight.
    pub dimensions: Option<DimensionsBody>,
    /// Declared value.
    pub value: Option<Decimal>,
    /// Contents description.
    pub contents: Option<String>,
}

/// Body of `POST /api/shipping/quotes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    /// Origin.
    pub origin: Option<AddressInput>,
    /// Destination.
    pub destination: Option<AddressInput>,
    /// Packages.
    pub packages: Option<Vec<PackageBody>>,
    /// Requested service level.
    pub service_level: Option<String>,
    /// Pickup date, `YYYY-MM-DD`.
    pub pickup_date: Option<String>,
}

/// Query of `GET /api/shipping/quotes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuickQuoteQuery {
    /// Flat origin, e.g. `New York, NY`.
    pub origin: Option<String>,
    /// Flat destination.
    pub destination: Option<String>,
    /// Parcel weight in pounds.
    pub weight: Option<String>,
    /// Service level (default GROUND).
    pub service: Option<String>,
}

/// Body of `POST /api/shipping/tracking/{trackingNumber}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingActionBody {
    /// `subscribe`, `unsubscribe` or `refresh`.
    pub action: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_enum<T: FromStr>(field: &str, raw: Option<&String>) -> ApiResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    non_blank(raw)
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(|e| ApiError::validation(format!("{field}: {e}")))
}

impl AddressInput {
    /// Converts into a validated address; `field` prefixes error messages.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the address is unusable.
    pub fn into_address(self, field: &str) -> ApiResult<Address> {
        let address = match self {
            Self::Flat(raw) => Address::from_flat(&raw),
            Self::Structured(body) => {
                let street = non_blank(body.address.as_ref()).unwrap_or_default();
                let city = non_blank(body.city.as_ref());
                let state = non_blank(body.state.as_ref());
                // A lone street line is treated as a flat "City, ST" string.
                let (street, city, state) = match (city, state) {
                    (None, None) => {
                        let (city, state) = split_city_state(street);
                        ("", city, state)
                    }
                    (city, state) => (street, city.unwrap_or_default(), state.unwrap_or_default()),
                };
                Address::new(
                    body.name,
                    street,
                    city,
                    state,
                    non_blank(body.zip.as_ref()).unwrap_or_default(),
                    body.country,
                )
            }
        };
        address.map_err(|e| ApiError::validation(format!("{field}: {e}")))
    }
}

impl DimensionsBody {
    fn into_dimensions(self, prefix: &str) -> ApiResult<Dimensions> {
        let required = |value: Option<Decimal>, name: &str| {
            value.ok_or_else(|| ApiError::validation(format!("{prefix}.{name} is required")))
        };
        Ok(Dimensions {
            length: required(self.length, "length")?,
            width: required(self.width, "width")?,
            height: required(self.height, "height")?,
            weight: required(self.weight, "weight")?,
            unit: parse_enum::<LengthUnit>(&format!("{prefix}.unit"), self.unit.as_ref())?
                .unwrap_or_default(),
            weight_unit: parse_enum::<WeightUnit>(
                &format!("{prefix}.weightUnit"),
                self.weight_unit.as_ref(),
            )?
            .unwrap_or_default(),
        })
    }
}

impl PackageBody {
    fn into_package(self, index: usize) -> ApiResult<Package> {
        let prefix = format!("packages[{index}]");
        let package_type =
            parse_enum::<PackageType>(&format!("{prefix}.type"), self.package_type.as_ref())?
                .unwrap_or_default();
        let dimensions = self
            .dimensions
            .ok_or_else(|| ApiError::validation(format!("{prefix}.dimensions is required")))?
            .into_dimensions(&format!("{prefix}.dimensions"))?;

        Package::validated(
            index,
            package_type,
            dimensions,
            self.value.unwrap_or_default(),
            self.contents.unwrap_or_default(),
        )
        .map_err(|e| ApiError::validation(e.to_string()))
    }
}

impl QuoteRequestBody {
    /// Converts into a validated quote request.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing or invalid field.
    pub fn into_request(self) -> ApiResult<QuoteRequest> {
        let origin = self
            .origin
            .ok_or_else(|| ApiError::validation("origin is required"))?
            .into_address("origin")?;
        let destination = self
            .destination
            .ok_or_else(|| ApiError::validation("destination is required"))?
            .into_address("destination")?;
        let packages = self
            .packages
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::validation("packages must contain at least one package"))?
            .into_iter()
            .enumerate()
            .map(|(index, body)| body.into_package(index))
            .collect::<ApiResult<Vec<_>>>()?;

        let mut builder = QuoteRequestBuilder::new(origin, destination).packages(packages);
        if let Some(level) =
            parse_enum::<ServiceLevel>("serviceLevel", self.service_level.as_ref())?
        {
            builder = builder.service_level(level);
        }
        if let Some(raw) = non_blank(self.pickup_date.as_ref()) {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ApiError::validation(format!("pickupDate: expected YYYY-MM-DD, got '{raw}'"))
            })?;
            builder = builder.pickup_date(date);
        }
        builder.build().map_err(|e| ApiError::validation(e.to_string()))
    }
}

impl QuickQuoteQuery {
    /// Builds the default quick-quote parcel request.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing or unparsable parameters.
    pub fn into_request(self) -> ApiResult<QuoteRequest> {
        let (Some(origin), Some(destination), Some(weight)) = (
            non_blank(self.origin.as_ref()),
            non_blank(self.destination.as_ref()),
            non_blank(self.weight.as_ref()),
        ) else {
            return Err(ApiError::validation(
                "origin, destination and weight are required",
            ));
        };

        let weight = Decimal::from_str(weight)
            .map_err(|_| ApiError::validation(format!("weight: '{weight}' is not a number")))?;
        let level = parse_enum::<ServiceLevel>("service", self.service.as_ref())?
            .unwrap_or_default();

        let origin = Address::from_flat(origin)
            .map_err(|e| ApiError::validation(format!("origin: {e}")))?
            .with_name(QUICK_QUOTE_SENDER);
        let destination = Address::from_flat(destination)
            .map_err(|e| ApiError::validation(format!("destination: {e}")))?
            .with_name(QUICK_QUOTE_RECIPIENT);

        let edge = Decimal::from(QUICK_QUOTE_EDGE_IN);
        let parcel = Package::new(
            PackageType::Parcel,
            Dimensions::imperial(edge, edge, edge, weight),
            Decimal::from(QUICK_QUOTE_VALUE),
            QUICK_QUOTE_CONTENTS,
        )
        .map_err(|e| ApiError::validation(e.to_string()))?;

        QuoteRequestBuilder::new(origin, destination)
            .package(parcel)
            .service_level(level)
            .build()
            .map_err(|e| ApiError::validation(e.to_string()))
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Quote list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesResponse {
    /// Always true.
    pub success: bool,
    /// Quotes, cheapest first.
    pub quotes: Vec<Quote>,
    /// Identifier of this aggregation.
    pub request_id: RequestId,
    /// When the quotes were generated.
    pub timestamp: Timestamp,
    /// Until when the quotes are valid; absent for quick quotes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Timestamp>,
    /// Carriers asked.
    pub carriers_queried: usize,
    /// Carriers that answered in time.
    pub carriers_responded: usize,
}

/// Tracking data response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    /// Always true.
    pub success: bool,
    /// Current history.
    pub data: TrackingHistory,
    /// Response time.
    pub timestamp: Timestamp,
}

/// Acknowledgement of a subscribe or unsubscribe action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    /// Always true.
    pub success: bool,
    /// Confirmation text.
    pub message: String,
    /// Present for `subscribe`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<SubscriptionId>,
}

/// Health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always true.
    pub success: bool,
    /// `healthy`.
    pub status: &'static str,
    /// Configured carriers.
    pub carriers: Vec<String>,
}

/// Response of the tracking action endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TrackingActionResponse {
    /// `subscribe` / `unsubscribe`.
    Subscription(SubscriptionResponse),
    /// `refresh`.
    Refreshed(TrackingResponse),
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/shipping/quotes`
///
/// # Errors
///
/// 400 for invalid bodies, 500 when aggregation fails.
pub async fn create_quotes(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QuoteRequestBody>, JsonRejection>,
) -> ApiResult<Json<QuotesResponse>> {
    let Json(body) = body?;
    let request = body.into_request()?;
    let outcome = state.quote_engine.get_all_quotes(&request).await?;

    info!(
        request_id = %outcome.request_id,
        quotes = outcome.quotes.len(),
        "Quotes served"
    );

    Ok(Json(QuotesResponse {
        success: true,
        quotes: outcome.quotes,
        request_id: outcome.request_id,
        timestamp: outcome.generated_at,
        valid_until: Some(outcome.valid_until),
        carriers_queried: outcome.carriers_queried,
        carriers_responded: outcome.carriers_responded,
    }))
}

/// `GET /api/shipping/quotes?origin=&destination=&weight=&service=`
///
/// # Errors
///
/// 400 for missing parameters, 500 when aggregation fails.
pub async fn quick_quotes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<QuickQuoteQuery>, QueryRejection>,
) -> ApiResult<Json<QuotesResponse>> {
    let Query(query) = query?;
    let request = query.into_request()?;
    let outcome = state.quote_engine.get_all_quotes(&request).await?;

    Ok(Json(QuotesResponse {
        success: true,
        quotes: outcome.quotes,
        request_id: outcome.request_id,
        timestamp: outcome.generated_at,
        valid_until: None,
        carriers_queried: outcome.carriers_queried,
        carriers_responded: outcome.carriers_responded,
    }))
}

fn parse_tracking_number(raw: &str) -> ApiResult<TrackingNumber> {
    TrackingNumber::parse(raw).map_err(|e| ApiError::validation(format!("trackingNumber: {e}")))
}

async fn current_tracking(state: &AppState, number: &TrackingNumber) -> ApiResult<TrackingResponse> {
    let data = state.tracking_engine.lookup(number).await?;
    Ok(TrackingResponse {
        success: true,
        data,
        timestamp: state.clock.now(),
    })
}

/// `GET /api/shipping/tracking/{trackingNumber}`
///
/// # Errors
///
/// 400 for a malformed number, 404 when no data exists.
pub async fn get_tracking(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> ApiResult<Json<TrackingResponse>> {
    let number = parse_tracking_number(&tracking_number)?;
    Ok(Json(current_tracking(&state, &number).await?))
}

/// `POST /api/shipping/tracking/{trackingNumber}`
///
/// Subscriptions are acknowledged without server-side state; clients poll
/// or refresh to observe progress.
///
/// # Errors
///
/// 400 for a malformed number or unknown action, 404 on refresh when no
/// data exists.
pub async fn tracking_action(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
    body: Result<Json<TrackingActionBody>, JsonRejection>,
) -> ApiResult<Json<TrackingActionResponse>> {
    let number = parse_tracking_number(&tracking_number)?;
    let Json(body) = body?;

    let response = match body.action.as_deref() {
        Some("subscribe") => {
            let subscription_id = SubscriptionId::generate();
            debug!(tracking_number = %number, subscription_id = %subscription_id, "Subscribed");
            TrackingActionResponse::Subscription(SubscriptionResponse {
                success: true,
                message: "Subscribed to real-time updates".to_string(),
                subscription_id: Some(subscription_id),
            })
        }
        Some("unsubscribe") => {
            debug!(tracking_number = %number, "Unsubscribed");
            TrackingActionResponse::Subscription(SubscriptionResponse {
                success: true,
                message: "Unsubscribed from real-time updates".to_string(),
                subscription_id: None,
            })
        }
        Some("refresh") => {
            TrackingActionResponse::Refreshed(current_tracking(&state, &number).await?)
        }
        _ => return Err(ApiError::validation("Invalid action")),
    };
    Ok(Json(response))
}

/// `GET|POST /api/shipping/tracking` without a number.
///
/// # Errors
///
/// Always 400.
#[allow(clippy::unused_async)]
pub async fn missing_tracking_number() -> ApiResult<Json<TrackingResponse>> {
    Err(ApiError::validation("Tracking number is required"))
}

/// Fallback for unmatched paths.
///
/// # Errors
///
/// Always 404.
#[allow(clippy::unused_async)]
pub async fn unknown_route(uri: Uri) -> ApiResult<Json<HealthResponse>> {
    Err(ApiError::not_found(format!("No route for {}", uri.path())))
}

/// `GET /api/health`
#[allow(clippy::unused_async)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy",
        carriers: state.quote_engine.carrier_names(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn body(json: serde_json::Value) -> QuoteRequestBody {
        serde_json::from_value(json).unwrap()
    }

    fn parcel() -> serde_json::Value {
        serde_json::json!({
            "type": "PARCEL",
            "dimensions": {"length": 12, "width": 10, "height": 8, "weight": 5, "unit": "IN", "weightUnit": "LB"},
            "value": 100,
            "contents": "Books"
        })
    }

    #[test]
    fn structured_body_converts() {
        let request = body(serde_json::json!({
            "origin": {"name": "A", "address": "1 Main St", "city": "New York", "state": "NY", "zip": "10001", "country": "US"},
            "destination": {"name": "B", "street": "2 Ocean Ave", "city": "Los Angeles", "state": "CA", "postalCode": "90001"},
            "packages": [parcel()],
            "serviceLevel": "express",
            "pickupDate": "2026-03-02"
        }))
        .into_request()
        .unwrap();

        assert_eq!(request.origin().city(), "New York");
        assert_eq!(request.destination().postal_code(), "90001");
        assert_eq!(request.service_level(), ServiceLevel::Express);
        assert_eq!(request.pickup_date().to_string(), "2026-03-02");
    }

    #[test]
    fn flat_addresses_are_split() {
        let request = body(serde_json::json!({
            "origin": "New York, NY",
            "destination": {"address": "Los Angeles, CA"},
            "packages": [parcel()]
        }))
        .into_request()
        .unwrap();

        assert_eq!(request.origin().state(), "NY");
        assert_eq!(request.destination().city(), "Los Angeles");
        assert_eq!(request.destination().state(), "CA");
    }

    #[test]
    fn missing_fields_are_named() {
        let err = body(serde_json::json!({"destination": "LA, CA", "packages": [parcel()]}))
            .into_request()
            .unwrap_err();
        assert_eq!(err.detail().message, "origin is required");

        let err = body(serde_json::json!({"origin": "NY, NY", "destination": "LA, CA", "packages": []}))
            .into_request()
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.detail().message.contains("at least one package"));

        let err = body(serde_json::json!({
            "origin": "NY, NY",
            "destination": "LA, CA",
            "packages": [{"dimensions": {"length": 1, "width": 1, "height": 1}}]
        }))
        .into_request()
        .unwrap_err();
        assert_eq!(err.detail().message, "packages[0].dimensions.weight is required");
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let err = body(serde_json::json!({
            "origin": "NY, NY",
            "destination": "LA, CA",
            "packages": [parcel(), {"dimensions": {"length": 1, "width": 1, "height": 1, "weight": 0}}]
        }))
        .into_request()
        .unwrap_err();
        assert!(err.detail().message.contains("packages[1]"));
    }

    #[test]
    fn bad_enums_and_dates_are_rejected() {
        let err = body(serde_json::json!({
            "origin": "NY, NY", "destination": "LA, CA", "packages": [parcel()], "serviceLevel": "teleport"
        }))
        .into_request()
        .unwrap_err();
        assert!(err.detail().message.starts_with("serviceLevel"));

        let err = body(serde_json::json!({
            "origin": "NY, NY", "destination": "LA, CA", "packages": [parcel()], "pickupDate": "tomorrow"
        }))
        .into_request()
        .unwrap_err();
        assert!(err.detail().message.starts_with("pickupDate"));
    }

    #[test]
    fn quick_quote_builds_default_parcel() {
        let request = QuickQuoteQuery {
            origin: Some("New York, NY".to_string()),
            destination: Some("Los Angeles, CA".to_string()),
            weight: Some("5".to_string()),
            service: None,
        }
        .into_request()
        .unwrap();

        assert_eq!(request.service_level(), ServiceLevel::Ground);
        assert_eq!(request.origin().name(), Some(QUICK_QUOTE_SENDER));
        assert_eq!(request.destination().name(), Some(QUICK_QUOTE_RECIPIENT));
        let parcel = request.packages().first().unwrap();
        assert_eq!(parcel.dimensions().length, Decimal::from(12));
        assert_eq!(parcel.declared_value(), Decimal::from(100));
        assert_eq!(parcel.contents(), QUICK_QUOTE_CONTENTS);
    }

    #[test]
    fn quick_quote_requires_params() {
        let err = QuickQuoteQuery {
            origin: Some("New York, NY".to_string()),
            ..QuickQuoteQuery::default()
        }
        .into_request()
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = QuickQuoteQuery {
            origin: Some("New York, NY".to_string()),
            destination: Some("Boston, MA".to_string()),
            weight: Some("heavy".to_string()),
            service: None,
        }
        .into_request()
        .unwrap_err();
        assert!(err.detail().message.starts_with("weight"));
    }
}
