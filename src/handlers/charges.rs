//! Charges quotation HTTP handler.
//!
//! - POST /api/v1/charges - quote charge, VAT, and total for an amount

use axum::{Json, extract::State};

use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::charges::{ChargesRequest, ChargesResponse};
use crate::response::ApiResponse;

/// Quote the charges for a prospective transfer.
///
/// # Endpoint
///
/// `POST /api/v1/charges`
///
/// # Request Body
///
/// ```json
/// {
///   "amount": "100000.00",
///   "fromCurrency": "NGN"
/// }
/// ```
///
/// # Response
///
/// - **Success (200)**: envelope with `amount`, `currency`, `charge`,
///   `vat`, and `sumTotal` - the exact figures the posting engine would
///   apply to this amount
/// - **Error (400)**: non-positive amount or malformed currency
///   (`"validation failed"`)
/// - **Error (404)**: no rate in either direction for the currency
///   (`"Rate not found for currency pair"`)
///
/// The charge is clamped in USD-normalized space, so the configured
/// `[min, max]` band means the same thing in every currency.
pub async fn get_charges(
    State(state): State<AppState>,
    Json(request): Json<ChargesRequest>,
) -> Result<Json<ApiResponse<ChargesResponse>>, AppError> {
    let charges = state.charges_service.get_charges_summary(&request).await?;
    Ok(Json(ApiResponse::success(
        "charges fetched successfully",
        charges,
    )))
}
