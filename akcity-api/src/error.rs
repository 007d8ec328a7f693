/// Error handling for the API server
///
/// This module provides a unified error type that maps onto HTTP responses.
/// Handlers return `Result<T, ApiError>`; the conversion into the response
/// envelope and status code happens in one place, so no handler builds an
/// error body by hand.
///
/// Core errors convert via `From<CoreError>`, which keeps the HTTP layer out
/// of `akcity-core` entirely.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::fmt;

use akcity_core::error::CoreError;

use crate::response::{Envelope, FieldError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Validation failure (400, field-level errors in the envelope)
    Validation(Vec<FieldError>),

    /// Too many requests (429)
    RateLimited {
        /// Seconds until the client may retry
        retry_after: u64,

        /// Tier-specific message
        message: String,
    },

    /// Internal server error (500), details logged but never returned
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::RateLimited { message, .. } => {
                write!(f, "Rate limit exceeded: {}", message)
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Rate limiting carries a Retry-After header alongside the envelope
        if let ApiError::RateLimited {
            retry_after,
            message,
        } = self
        {
            let body = Envelope::failure(message, None);
            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(retry_after));
            return response;
        }

        let status = self.status();
        let (message, errors) = match self {
            ApiError::Validation(errors) => ("Validation error".to_string(), Some(errors)),
            ApiError::Internal(msg) => {
                // Log the real cause, return a masked message
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => (msg, None),
            ApiError::RateLimited { .. } => unreachable!("handled above"),
        };

        (status, Envelope::failure(message, errors)).into_response()
    }
}

/// Maps core business errors onto HTTP semantics
///
/// Auth failures keep the generic core messages, so the response never says
/// whether the email or the password was wrong.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => {
                ApiError::Validation(vec![FieldError { field, message }])
            }
            CoreError::DuplicateEmail => ApiError::BadRequest(err.to_string()),
            CoreError::InvalidCredentials | CoreError::AccountNotActive => {
                ApiError::Unauthorized(err.to_string())
            }
            CoreError::InvalidTransition { .. } => ApiError::BadRequest(err.to_string()),
            CoreError::TokenExpired | CoreError::TokenInvalid(_) => {
                ApiError::Unauthorized(err.to_string())
            }
            CoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::Hashing(_) | CoreError::Persistence(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
