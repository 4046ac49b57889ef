//! Account management HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /api/v1/accounts - open an account for an existing customer
//! - GET /api/v1/accounts/{account_number}?bankCode= - name-enquiry lookup
//! - POST /api/v1/accounts/deposit - deposit funds into an account

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::account::{AccountResponse, CreateAccountRequest, DepositRequest};
use crate::response::ApiResponse;
use crate::services::account_service::AccountLookup;

/// Open a new account.
///
/// # Endpoint
///
/// `POST /api/v1/accounts`
///
/// # Request Body
///
/// ```json
/// {
///   "customerId": "1000000001",
///   "currency": "USD",
///   "initialDeposit": "250.00"
/// }
/// ```
///
/// `initialDeposit` is optional and defaults to zero. Amounts are decimal
/// strings; floats never enter the balance path.
///
/// # Response
///
/// - **Success (200)**: envelope with the created account, status `ACTIVE`
/// - **Error (400)**: unknown customer, bad currency, negative deposit, or
///   a second account in the same currency (`"validation failed"`)
/// - **Error (500)**: database failure
///
/// ```json
/// {
///   "success": true,
///   "message": "account created successfully",
///   "data": {
///     "accountNumber": "7216549804",
///     "currency": "USD",
///     "availableBalance": "250.00",
///     "ledgerBalance": "250.00",
///     "status": "ACTIVE"
///   }
/// }
/// ```
///
/// # Validation
///
/// - The customer must already exist
/// - A customer holds at most one account per currency
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, AppError> {
    let account = state.account_service.create_account(&request).await?;
    Ok(Json(ApiResponse::success(
        "account created successfully",
        account,
    )))
}

#[derive(Debug, Deserialize)]
pub struct AccountLookupQuery {
    #[serde(rename = "bankCode")]
    pub bank_code: String,
}

/// Look up an account by number and bank code (name enquiry).
///
/// # Endpoint
///
/// `GET /api/v1/accounts/{account_number}?bankCode=100100`
///
/// # URL Parameters
///
/// - `account_number` - exactly 10 digits
/// - `bankCode` (query) - exactly 6 digits
///
/// # Routing
///
/// A `bankCode` equal to the configured home bank resolves against the
/// accounts table and returns full balances. Any other code resolves
/// through the participant-bank registry and returns a name-enquiry stub
/// with no balances - real interbank enquiry is out of scope.
///
/// # Response
///
/// - **Success (200)**: envelope with the lookup result
/// - **Error (400)**: malformed account number or bank code, or a bank
///   code missing from the registry (`"validation failed"`)
/// - **Error (404)**: home-bank account not found (`"Account not found"`)
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    Query(query): Query<AccountLookupQuery>,
) -> Result<Json<ApiResponse<AccountLookup>>, AppError> {
    let lookup = state
        .account_service
        .get_account(&account_number, &query.bank_code)
        .await?;
    Ok(Json(ApiResponse::success(
        "account fetched successfully",
        lookup,
    )))
}

/// Deposit funds into an active account.
///
/// # Endpoint
///
/// `POST /api/v1/accounts/deposit`
///
/// # Request Body
///
/// ```json
/// {
///   "accountNumber": "7216549804",
///   "amount": "100.00"
/// }
/// ```
///
/// # Response
///
/// - **Success (200)**: envelope with the account's refreshed balances
/// - **Error (400)**: malformed account number, non-positive amount, or an
///   inactive account (`"validation failed"`)
/// - **Error (404)**: account not found (`"Account not found"`)
///
/// # Database Operation
///
/// One guarded UPDATE: `available_balance` and `ledger_balance` both grow
/// by `amount`, only while `status = 'ACTIVE'`.
pub async fn deposit_funds(
    State(state): State<AppState>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, AppError> {
    let account = state.account_service.deposit_funds(&request).await?;
    Ok(Json(ApiResponse::success(
        "funds deposited successfully",
        account,
    )))
}
