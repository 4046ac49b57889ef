//! FX rate HTTP handlers.
//!
//! This module implements the rate-related API endpoints:
//! - GET /api/v1/rates - list stored rates
//! - GET /api/v1/rates/{from}/{to} - one ordered pair
//! - POST /api/v1/rates/convert - convert an amount between currencies

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::rate::{ConvertRateRequest, ConvertRateResponse, RateResponse};
use crate::response::ApiResponse;

/// List all stored rates.
///
/// # Endpoint
///
/// `GET /api/v1/rates`
///
/// # Response
///
/// - **Success (200)**: envelope with every stored rate, ordered newest
///   first, then by currency pair (may be empty before seeding)
pub async fn list_rates(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RateResponse>>>, AppError> {
    let rates = state.rate_service.get_list().await?;
    Ok(Json(ApiResponse::success(
        "rates fetched successfully",
        rates,
    )))
}

/// Fetch the most recent rate for one ordered pair.
///
/// # Endpoint
///
/// `GET /api/v1/rates/{from}/{to}`
///
/// # Response
///
/// - **Success (200)**: envelope with the rate row. Same-currency pairs
///   are never stored; a unit rate dated today is synthesized instead
/// - **Error (404)**: no stored rate for the pair (`"Rate not found"`)
pub async fn get_rate(
    State(state): State<AppState>,
    Path((from, to)): Path<(String, String)>,
) -> Result<Json<ApiResponse<RateResponse>>, AppError> {
    let rate = state.rate_service.get_one(&from, &to).await?;
    Ok(Json(ApiResponse::success(
        "rate fetched successfully",
        rate,
    )))
}

/// Convert an amount between currencies.
///
/// # Endpoint
///
/// `POST /api/v1/rates/convert`
///
/// # Request Body
///
/// ```json
/// {
///   "amount": "100.00",
///   "fromCcy": "USD",
///   "toCcy": "NGN"
/// }
/// ```
///
/// # Response
///
/// - **Success (200)**: envelope with `convertedAmount`, `rateUsed`, and
///   `rateDate`
/// - **Error (400)**: non-positive amount or malformed currency codes
///   (`"validation failed"`)
/// - **Error (404)**: no direct rate for the pair
///   (`"Rate not found for currency pair"`) - conversion never falls back
///   to the inverse rate
/// - **Error (422)**: a stored rate of zero (`"invalid rate"`)
pub async fn convert_rate(
    State(state): State<AppState>,
    Json(request): Json<ConvertRateRequest>,
) -> Result<Json<ApiResponse<ConvertRateResponse>>, AppError> {
    let conversion = state
        .rate_service
        .convert(request.amount, &request.from_ccy, &request.to_ccy)
        .await
        .map_err(|err| match err {
            // A missing pair on the public conversion endpoint names the
            // pair-shaped message rather than the bare lookup one.
            AppError::RateNotFound => AppError::RateNotFoundForPair,
            other => other,
        })?;
    Ok(Json(ApiResponse::success(
        "currency rate fetched successfully",
        conversion,
    )))
}
