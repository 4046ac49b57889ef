//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses. The message strings on the envelope are load-bearing:
//! clients and the status-code mapping below both key off them, so they form
//! a fixed set and must not be reworded casually.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::response::ApiResponse;

/// Application-wide error type.
///
/// Validation and lookup errors abort a transfer before any row is written
/// and are safe to retry with a corrected request. `InsufficientBalance`
/// means the posting transaction aborted and the transfer row was flipped to
/// FAILED. Everything else is an internal failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input, inactive account, currency mismatch, unsupported
    /// bank code, invalid transaction PIN, same debit/credit account.
    /// The string carries the per-field detail for the `errors` array.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("Debit account not found")]
    DebitAccountNotFound,

    #[error("Credit account not found")]
    CreditAccountNotFound,

    #[error("Account not found")]
    AccountNotFound,

    #[error("User not found")]
    UserNotFound,

    /// A single-pair rate lookup missed.
    #[error("Rate not found")]
    RateNotFound,

    /// A conversion path required a pair that is not stored.
    #[error("Rate not found for currency pair")]
    RateNotFoundForPair,

    /// A stored or synthesized rate was zero or negative.
    #[error("invalid rate")]
    InvalidRate,

    /// PIN comparison failed against the stored hash.
    #[error("invalid pin")]
    InvalidPin,

    /// The guarded debit affected zero rows and the account probe showed an
    /// active account with a low balance.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Unique violation on a transfer reference column. Recoverable: the
    /// posting engine retries with a freshly generated reference.
    #[error("duplicate transfer reference")]
    DuplicateReference,

    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other repository or collaborator failure. The string is logged,
    /// never shown to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when a `TransferStore::create` collision should trigger a
    /// reference regeneration rather than a hard failure.
    pub fn is_duplicate_reference(&self) -> bool {
        matches!(self, AppError::DuplicateReference)
    }
}

/// Convert AppError into an HTTP response.
///
/// # Status Code Mapping
///
/// - `Validation`, `InvalidPin` → 400 Bad Request
/// - `*NotFound`, `RateNotFound*` → 404 Not Found
/// - `InsufficientBalance`, `InvalidRate` → 422 Unprocessable Entity
/// - everything else → 500 Internal Server Error (details hidden)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            AppError::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::error("validation failed", vec![detail]),
            ),
            AppError::InvalidPin => (
                StatusCode::BAD_REQUEST,
                ApiResponse::error("invalid pin", vec!["provided pin does not match".into()]),
            ),
            AppError::DebitAccountNotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::error("Debit account not found", vec![]),
            ),
            AppError::CreditAccountNotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::error("Credit account not found", vec![]),
            ),
            AppError::AccountNotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::error("Account not found", vec![]),
            ),
            AppError::UserNotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::error("User not found", vec![]),
            ),
            AppError::RateNotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::error("Rate not found", vec![]),
            ),
            AppError::RateNotFoundForPair => (
                StatusCode::NOT_FOUND,
                ApiResponse::error("Rate not found for currency pair", vec![]),
            ),
            AppError::InvalidRate => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::error("invalid rate", vec![]),
            ),
            AppError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::error("Insufficient balance", vec!["Insufficient balance".into()]),
            ),
            AppError::DuplicateReference | AppError::Database(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error(
                    "failed to process request",
                    vec!["Unable to process request right now".into()],
                ),
            ),
        };

        (status, Json(envelope)).into_response()
    }
}

/// Map a sqlx error from a transfer insert, treating Postgres unique
/// violations (SQLSTATE 23505) as `DuplicateReference`.
pub fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::DuplicateReference;
        }
    }
    AppError::Database(err)
}
