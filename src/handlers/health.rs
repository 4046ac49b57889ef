//! Health check HTTP handler.

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// Always `200` with `{"status": "ok"}`. No authentication and no
/// database round-trip, so load balancers can poll it cheaply.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
