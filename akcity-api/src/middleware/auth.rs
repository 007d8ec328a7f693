/// Authentication and authorization middleware
///
/// `authenticate` turns a Bearer access token into a [`CurrentUser`]
/// request extension. The token alone is not trusted: the user is
/// re-fetched from storage and must still exist and be active, so a
/// deactivated account loses access as soon as its current token is next
/// presented.
///
/// `require_permission` layers on top of `authenticate` and checks the
/// caller's role against the permission table before the handler runs.
///
/// # Example
///
/// ```no_run
/// use akcity_api::app::AppState;
/// use akcity_api::middleware::auth::{authenticate, require_permission};
/// use axum::middleware::{from_fn, from_fn_with_state};
/// use axum::{routing::get, Router};
///
/// async fn handler() -> &'static str {
///     "ok"
/// }
///
/// fn reports(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/reports", get(handler))
///         .layer(from_fn(move |request, next| {
///             require_permission("report:read", request, next)
///         }))
///         .layer(from_fn_with_state(state, authenticate))
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use akcity_core::entities::user::PublicUser;
use akcity_core::error::CoreError;
use akcity_core::permissions::role_has_permission;

use crate::app::AppState;
use crate::error::ApiError;

/// Identity of the authenticated caller, attached as a request extension
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The caller, as re-fetched from storage during authentication
    pub user: PublicUser,
}

/// Authentication middleware
///
/// Verifies the Bearer access token, re-fetches the user, and attaches
/// [`CurrentUser`] for downstream extractors.
///
/// # Errors
///
/// - 401: missing or malformed Authorization header
/// - 401: expired or invalid token
/// - 401: user no longer exists or is not active
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            return Err(ApiError::Unauthorized(
                "Access token is required".to_string(),
            ))
        }
    };

    let claims = match state.tokens.verify_access_token(token) {
        Ok(claims) => claims,
        Err(e) => return Err(ApiError::from(CoreError::from(e))),
    };

    // The token may outlive the account; storage is authoritative
    let user = match state.users.find_by_id(claims.sub).await? {
        Some(user) => user,
        None => {
            tracing::warn!(user_id = %claims.sub, "Token for a user that no longer exists");
            return Err(ApiError::Unauthorized(
                "User not found or inactive".to_string(),
            ));
        }
    };

    if !user.is_active() {
        tracing::warn!(
            user_id = %user.id,
            status = user.status.as_str(),
            "Request from an account that is not active"
        );
        return Err(ApiError::Unauthorized(
            "User not found or inactive".to_string(),
        ));
    }

    request.extensions_mut().insert(CurrentUser {
        user: user.to_public(),
    });

    Ok(next.run(request).await)
}

/// Authorization middleware function
///
/// Checks the authenticated caller's role against one permission. Wire it
/// with `axum::middleware::from_fn` inside a router that already runs
/// [`authenticate`].
///
/// # Errors
///
/// - 401: no authenticated caller on the request
/// - 403: the caller's role does not hold the permission
pub async fn require_permission(
    permission: &'static str,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = match request.extensions().get::<CurrentUser>() {
        Some(current) => current,
        None => {
            return Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            ))
        }
    };

    if !role_has_permission(current.user.role, permission) {
        tracing::warn!(
            user_id = %current.user.id,
            role = current.user.role.as_str(),
            permission,
            "Permission denied"
        );
        return Err(ApiError::Forbidden("Insufficient permissions".to_string()));
    }

    Ok(next.run(request).await)
}

/// Extracts the token from an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use akcity_core::entities::user::{User, UserRole};
    use axum::{
        body::Body, http::StatusCode, middleware::from_fn, routing::get, Extension, Router,
    };
    use tower::Service as _;

    fn current_user(role: UserRole) -> CurrentUser {
        let user = User::new(
            "Jane Doe".to_string(),
            "jane@example.com".to_string(),
            "$argon2id$v=19$m=65536,t=3,p=4$placeholder$placeholder".to_string(),
            "+15551234567".to_string(),
            role,
        );

        CurrentUser {
            user: user.to_public(),
        }
    }

    fn guarded_app(permission: &'static str, caller: Option<CurrentUser>) -> Router {
        async fn handler() -> &'static str {
            "ok"
        }

        let mut app = Router::new()
            .route("/guarded", get(handler))
            .layer(from_fn(move |request, next| {
                require_permission(permission, request, next)
            }));

        if let Some(caller) = caller {
            app = app.layer(Extension(caller));
        }

        app
    }

    async fn envelope_of(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_wildcard_role_passes_any_permission() {
        let mut app = guarded_app(
            "made:up-just-now",
            Some(current_user(UserRole::GeneralManager)),
        );

        let response = app
            .call(
                Request::builder()
                    .uri("/guarded")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_literal_permission_passes() {
        let mut app = guarded_app("project:write", Some(current_user(UserRole::ProjectManager)));

        let response = app
            .call(
                Request::builder()
                    .uri("/guarded")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let mut app = guarded_app("project:delete", Some(current_user(UserRole::Worker)));

        let response = app
            .call(
                Request::builder()
                    .uri("/guarded")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let envelope = envelope_of(response).await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["message"], "Insufficient permissions");
    }

    #[tokio::test]
    async fn test_guard_without_identity_is_unauthorized() {
        let mut app = guarded_app("project:read", None);

        let response = app
            .call(
                Request::builder()
                    .uri("/guarded")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let envelope = envelope_of(response).await;
        assert_eq!(envelope["message"], "Authentication required");
    }

    #[test]
    fn test_bearer_token_parsing() {
        let with = Request::builder()
            .uri("/guarded")
            .header("Authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&with), Some("abc.def.ghi"));

        let wrong_scheme = Request::builder()
            .uri("/guarded")
            .header("Authorization", "Token abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&wrong_scheme), None);

        let missing = Request::builder()
            .uri("/guarded")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&missing), None);
    }
}
