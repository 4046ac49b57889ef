//! Transfer HTTP handlers.
//!
//! This module implements the transfer-related API endpoints:
//! - POST /api/v1/transfers - post a fund transfer through the engine
//! - GET /api/v1/transfers - look up a transfer by id or reference

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::transfer::{TransferRequest, TransferResponse};
use crate::response::ApiResponse;

/// Post a fund transfer.
///
/// # Endpoint
///
/// `POST /api/v1/transfers`
///
/// # Request Body
///
/// ```json
/// {
///   "debitAccountNumber": "0123456789",
///   "creditAccountNumber": "0123456780",
///   "beneficiaryBankCode": "100100",
///   "transactionPIN": "1234",
///   "debitBankName": "Grey Bank",
///   "creditBankName": "Grey Bank",
///   "debitCurrency": "USD",
///   "creditCurrency": "NGN",
///   "debitAmount": "100.00",
///   "narration": "Salary"
/// }
/// ```
///
/// A `beneficiaryBankCode` equal to the home bank posts internally (both
/// accounts are customers); any other registered code posts externally
/// (the credit lands on the per-currency external GL for later bilateral
/// settlement). `narration` must come from the fixed allow-list.
///
/// # Response
///
/// - **Success (200)**: `"Transaction successful"` when fee settlement
///   completed (transfer `CLOSED`), or
///   `"Transaction successful. Settlement pending"` when the movement
///   committed but the fee sweep did not (transfer left at `SUCCESS`)
/// - **Error (400)**: field validation, inactive account, currency
///   mismatch, unsupported bank code, invalid transaction PIN
/// - **Error (404)**: `"Debit account not found"` / `"Credit account not
///   found"`
/// - **Error (422)**: `"Insufficient balance"` - the posting transaction
///   aborted and the transfer row was flipped to `FAILED`
/// - **Error (500)**: anything else; no partial balance movement survives
///
/// ```json
/// {
///   "success": true,
///   "message": "Transaction successful",
///   "data": {
///     "transactionReference": "202508021201459876543210001234",
///     "externalReference": "202508021201459876543210001234",
///     "debitAmount": "100.00",
///     "creditAmount": "133838.0059",
///     "chargeAmount": "2.00",
///     "vatAmount": "7.50",
///     "sumTotalDebit": "109.50",
///     "status": "CLOSED"
///   }
/// }
/// ```
///
/// # Atomicity
///
/// All four balance movements run inside one database transaction; the
/// caller never observes a partially posted transfer. The PIN is redacted
/// before the request is logged or stored as the audit payload.
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<ApiResponse<TransferResponse>>, AppError> {
    let envelope = state.transfer_service.transfer_funds(request).await?;
    Ok(Json(envelope))
}

#[derive(Debug, Deserialize)]
pub struct TransferLookupQuery {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "transactionReference")]
    pub transaction_reference: String,
    #[serde(default, rename = "externalReference")]
    pub external_reference: String,
}

/// Look up a transfer.
///
/// # Endpoint
///
/// `GET /api/v1/transfers?id=...&transactionReference=...&externalReference=...`
///
/// # Query Parameters
///
/// At least one of `id`, `transactionReference`, or `externalReference`
/// must be non-empty; the first non-empty one wins.
///
/// # Response
///
/// - **Success (200)**: envelope with the transfer, including its current
///   status and the total debited (amount + charge + VAT)
/// - **Error (400)**: all three parameters empty (`"validation failed"`)
/// - **Error (404)**: no matching transfer
pub async fn get_transfer(
    State(state): State<AppState>,
    Query(query): Query<TransferLookupQuery>,
) -> Result<Json<ApiResponse<TransferResponse>>, AppError> {
    let transfer = state
        .transfer_service
        .get_transfer(
            &query.id,
            &query.transaction_reference,
            &query.external_reference,
        )
        .await?;
    Ok(Json(ApiResponse::success(
        "transfer fetched successfully",
        transfer,
    )))
}
