/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Token refresh
/// - Logout
/// - Current user lookup
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register a new user
/// - `POST /api/v1/auth/login` - Login and get tokens
/// - `POST /api/v1/auth/refresh` - Exchange a refresh token for a new access token
/// - `POST /api/v1/auth/logout` - Revoke the presented token
/// - `GET  /api/v1/auth/me` - Current authenticated user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
    response::{Envelope, FieldError},
};
use akcity_core::entities::user::{PublicUser, UserRole};
use akcity_core::error::CoreError;
use akcity_core::use_cases::{AuthOutput, AuthenticateUserInput, CreateUserInput};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    /// Password (full strength rules are checked during creation)
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,

    /// Contact phone number
    pub phone: String,

    /// Role to assign
    pub role: UserRole,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("role", &self.role)
            .finish()
    }
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The created user, without credential material
    pub user: PublicUser,
}

/// Login request
#[derive(Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Refresh token request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    #[serde(default)]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,
}

/// Current user response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The authenticated caller
    pub user: PublicUser,
}

/// Register a new user
///
/// Request shape checks run here; business rules (password strength, phone
/// format, duplicate email) run in the use-case.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "Abcdef1!",
///   "phone": "+15551234567",
///   "role": "worker"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "User created successfully",
///   "data": { "user": { "id": "uuid", "email": "jane@example.com" } }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<RegisterResponse>>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(collect_field_errors(&e)))?;

    let user = state
        .create_user
        .execute(CreateUserInput {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            role: req.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Envelope::data("User created successfully", RegisterResponse { user }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "Abcdef1!"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Login successful",
///   "data": {
///     "user": { "id": "uuid" },
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ..."
///   }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials or inactive account
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Envelope<AuthOutput>>> {
    req.validate()
        .map_err(|e| ApiError::Validation(collect_field_errors(&e)))?;

    let output = state
        .authenticate_user
        .execute(AuthenticateUserInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Envelope::data("Login successful", output))
}

/// Exchange a refresh token for a new access token
///
/// The user is re-fetched before the new token is minted, so the access
/// token always reflects the current role and a deactivated account gets
/// nothing back.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/refresh
/// Content-Type: application/json
///
/// { "refresh_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing refresh token
/// - `401 Unauthorized`: Invalid or expired refresh token, or the user no
///   longer exists or is not active
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<Envelope<RefreshResponse>>> {
    if req.refresh_token.trim().is_empty() {
        return Err(ApiError::BadRequest("Refresh token is required".to_string()));
    }

    let claims = match state.tokens.verify_refresh_token(&req.refresh_token) {
        Ok(claims) => claims,
        Err(e) => return Err(ApiError::from(CoreError::from(e))),
    };

    let user = match state.users.find_by_id(claims.sub).await? {
        Some(user) => user,
        None => {
            return Err(ApiError::Unauthorized(
                "User not found or inactive".to_string(),
            ))
        }
    };

    if !user.is_active() {
        tracing::warn!(user_id = %user.id, "Refresh attempt from an account that is not active");
        return Err(ApiError::Unauthorized(
            "User not found or inactive".to_string(),
        ));
    }

    let access_token = match state.tokens.refresh_access_token(&req.refresh_token, &user) {
        Ok(token) => token,
        Err(e) => return Err(ApiError::from(CoreError::from(e))),
    };

    tracing::info!(user_id = %user.id, "Access token refreshed");

    Ok(Envelope::data(
        "Token refreshed successfully",
        RefreshResponse { access_token },
    ))
}

/// Logout
///
/// Passes the presented token to the revocation hook. Stateless tokens
/// stay verifiable until expiry; the hook is the seam where a denylist
/// would plug in.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/logout
/// Authorization: Bearer <access token>
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<()>>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = token {
        state.tokens.revoke_token(token);
    }

    tracing::info!(user_id = %current.user.id, "User logged out");

    Ok(Envelope::message("Logout successful"))
}

/// Current authenticated user
///
/// Returns the caller as re-fetched by the authentication middleware, so
/// the data reflects storage rather than token claims.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/auth/me
/// Authorization: Bearer <access token>
/// ```
pub async fn me(
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<MeResponse>>> {
    Ok(Envelope::data(
        "Profile retrieved successfully",
        MeResponse { user: current.user },
    ))
}

/// Flattens validator output into the envelope's field error list
fn collect_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_shape_errors() {
        let req = RegisterRequest {
            name: "J".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            phone: "+15551234567".to_string(),
            role: UserRole::Worker,
        };

        let errors = collect_field_errors(&req.validate().unwrap_err());
        assert_eq!(errors.len(), 3);

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));

        let email_error = errors.iter().find(|e| e.field == "email").unwrap();
        assert_eq!(email_error.message, "Please provide a valid email address");
    }

    #[test]
    fn test_login_request_requires_password() {
        let req = LoginRequest {
            email: "jane@example.com".to_string(),
            password: String::new(),
        };

        let errors = collect_field_errors(&req.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
        assert_eq!(errors[0].message, "Password is required");
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let register = RegisterRequest {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "Abcdef1!".to_string(),
            phone: "+15551234567".to_string(),
            role: UserRole::Worker,
        };
        let login = LoginRequest {
            email: "jane@example.com".to_string(),
            password: "Abcdef1!".to_string(),
        };

        assert!(!format!("{:?}", register).contains("Abcdef1!"));
        assert!(!format!("{:?}", login).contains("Abcdef1!"));
    }
}
