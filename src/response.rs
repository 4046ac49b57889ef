//! Response envelope shared by every endpoint.
//!
//! All responses - success and failure - use the same JSON shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Transaction successful",
//!   "data": { ... },
//!   "errors": ["detail", "..."]
//! }
//! ```
//!
//! `data` and `errors` are omitted when absent; neither is ever null.

use serde::Serialize;

/// Generic response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// Build a success envelope carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    /// Build a failure envelope with optional detail strings.
    pub fn error(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_errors() {
        let resp = ApiResponse::success("ok", 42);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"ok","data":42}"#);
    }

    #[test]
    fn error_envelope_omits_data_and_empty_errors() {
        let resp = ApiResponse::<()>::error("validation failed", vec![]);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"validation failed"}"#);

        let resp = ApiResponse::<()>::error("validation failed", vec!["bad".into()]);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""errors":["bad"]"#));
    }
}
