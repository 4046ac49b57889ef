//! User management HTTP handlers.
//!
//! This module implements the user-related API endpoints:
//! - POST /api/v1/users - create a user
//! - GET /api/v1/users/{id} - fetch a user
//! - POST /api/v1/users/verify-pin - verify a transaction PIN

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::user::{
    CreateUserRequest, CreateUserResponse, PinVerification, UserResponse, VerifyPinRequest,
};
use crate::response::ApiResponse;
use crate::services::PinVerifier;

/// Create a new user.
///
/// # Endpoint
///
/// `POST /api/v1/users`
///
/// # Request Body
///
/// ```json
/// {
///   "firstName": "Ada",
///   "middleName": "N",
///   "lastName": "Obi",
///   "dob": "1990-01-15",
///   "phoneNumber": "+2348000000000",
///   "idType": "Passport",
///   "idNumber": "A1234567",
///   "kycLevel": 2,
///   "transactionPin": "1234"
/// }
/// ```
///
/// # Response
///
/// - **Success (200)**: envelope with the generated 10-digit `customerId`
/// - **Error (400)**: missing fields, malformed `dob`, unknown `idType`,
///   or non-positive `kycLevel` (`"validation failed"`)
/// - **Error (500)**: database or hashing failure
///
/// # Security Note
///
/// The transaction PIN is bcrypt-hashed before it is stored and redacted
/// from every log line; neither the PIN nor its hash appears in any
/// response body.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<CreateUserResponse>>, AppError> {
    let user = state.user_service.create_user(&request).await?;
    Ok(Json(ApiResponse::success("user created successfully", user)))
}

/// Fetch a user by ID.
///
/// # Endpoint
///
/// `GET /api/v1/users/{id}`
///
/// # URL Parameters
///
/// - `id` - the user's UUID
///
/// # Response
///
/// - **Success (200)**: envelope with the user's profile; the stored PIN
///   hash is never included
/// - **Error (404)**: no such user (`"User not found"`)
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(ApiResponse::success(
        "user fetched successfully",
        user.into(),
    )))
}

/// Verify a customer's transaction PIN.
///
/// # Endpoint
///
/// `POST /api/v1/users/verify-pin`
///
/// # Request Body
///
/// ```json
/// {
///   "customerId": "1000000001",
///   "pin": "1234"
/// }
/// ```
///
/// # Response
///
/// - **Success (200)**: `{"customerId": "...", "isValidPin": true}`
/// - **Error (400)**: empty field (`"validation failed"`), or a PIN that
///   does not match the stored hash (`"invalid pin"`)
/// - **Error (404)**: unknown customer (`"User not found"`)
///
/// This is the same capability the posting engine consults before moving
/// any money.
pub async fn verify_pin(
    State(state): State<AppState>,
    Json(request): Json<VerifyPinRequest>,
) -> Result<Json<ApiResponse<PinVerification>>, AppError> {
    let verification = state
        .user_service
        .verify_pin(&request.customer_id, &request.pin)
        .await?;
    Ok(Json(ApiResponse::success(
        "pin verified successfully",
        verification,
    )))
}
