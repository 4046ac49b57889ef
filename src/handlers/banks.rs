//! Participant-bank directory HTTP handler.
//!
//! - GET /api/v1/banks - list the banks reachable over the interbank
//!   network

use axum::Json;

use crate::banks::{self, ParticipantBank};
use crate::response::ApiResponse;

/// List the participant banks.
///
/// # Endpoint
///
/// `GET /api/v1/banks`
///
/// # Response
///
/// - **Success (200)**: envelope with the fixed directory of ten banks,
///   each `{bankName, bankCode}`. The home bank is not listed; it is
///   identified by the configured home bank code.
///
/// The directory is a compile-time constant, so this endpoint touches no
/// state and cannot fail.
pub async fn list_banks() -> Json<ApiResponse<&'static [ParticipantBank]>> {
    Json(ApiResponse::success(
        "participant banks fetched successfully",
        banks::all(),
    ))
}
