/// Response envelope shared by every endpoint
///
/// Every response, success or failure, carries the same outer shape:
///
/// ```json
/// { "success": true,  "message": "Login successful", "data": { ... } }
/// { "success": false, "message": "Validation error", "errors": [ ... ] }
/// ```
///
/// `data` and `errors` are omitted entirely when absent, never `null`.

use axum::Json;
use serde::{Deserialize, Serialize};

/// One field that failed validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// The wire envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    /// Whether the request succeeded
    pub success: bool,

    /// Human-readable outcome
    pub message: String,

    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Field-level problems on validation failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> Envelope<T> {
    /// Success envelope with a payload
    pub fn data(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        })
    }
}

impl Envelope<()> {
    /// Success envelope with no payload
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        })
    }

    /// Failure envelope, optionally with field-level errors
    pub fn failure(message: impl Into<String>, errors: Option<Vec<FieldError>>) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        })
    }
}
