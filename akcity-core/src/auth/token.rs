/// Token issuance and verification
///
/// This module provides stateless signed tokens for user authentication.
/// Tokens are signed with HS256 and carry identity claims plus issuer and
/// audience markers that are checked on every verification.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Secrets**: access and refresh tokens are signed with distinct secrets
/// - **Expiration**: configurable, 15 minutes for access and 7 days for
///   refresh by default
/// - **Validation**: signature, expiry, nbf, issuer, audience, and token
///   type on every call
///
/// # Token Types
///
/// - **Access Token**: short-lived, carries the user's role for
///   authorization checks
/// - **Refresh Token**: long-lived, identity only, used to obtain new
///   access tokens
///
/// # Example
///
/// ```
/// use akcity_core::auth::token::{TokenConfig, TokenService};
/// use akcity_core::entities::user::{User, UserRole};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TokenService::new(TokenConfig::default());
/// let user = User::new(
///     "Jane Doe".to_string(),
///     "jane@example.com".to_string(),
///     "$argon2id$...".to_string(),
///     "+15551234567".to_string(),
///     UserRole::Worker,
/// );
///
/// let token = service.generate_access_token(&user)?;
/// let claims = service.verify_access_token(&token)?;
/// assert_eq!(claims.sub, user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{User, UserRole};

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a new token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Token past its expiry
    #[error("Token has expired")]
    Expired,

    /// Malformed, badly signed, or wrong type/issuer/audience
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived)
    Access,

    /// Refresh token (long-lived)
    Refresh,
}

impl TokenType {
    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// Secrets, lifetimes, and claim constants for issued tokens
///
/// Read from the environment once at startup and injected into
/// [`TokenService`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret for signing access tokens (at least 32 bytes)
    pub access_secret: String,

    /// Secret for signing refresh tokens, distinct from the access secret
    pub refresh_secret: String,

    /// Access token lifetime in seconds
    pub access_ttl_seconds: i64,

    /// Refresh token lifetime in seconds
    pub refresh_ttl_seconds: i64,

    /// Value of the `iss` claim
    pub issuer: String,

    /// Value of the `aud` claim
    pub audience: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: "dev-access-secret-change-in-production!".to_string(),
            refresh_secret: "dev-refresh-secret-change-in-production".to_string(),
            access_ttl_seconds: 900,      // 15 minutes
            refresh_ttl_seconds: 604_800, // 7 days
            issuer: "akcity-api".to_string(),
            audience: "akcity-client".to_string(),
        }
    }
}

/// Claims carried by issued tokens
///
/// Reconstructed on every verification; never persisted.
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer
/// - `aud`: Audience
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: User email at issuance time
/// - `role`: User role, access tokens only
/// - `token_type`: Access or refresh discriminator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// User email at issuance time
    pub email: String,

    /// User role (absent on refresh tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Stateless token service
///
/// Holds the signing secrets and claim constants. Verification re-derives
/// everything from the token string, so instances share no mutable state.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    /// Creates a token service from the given configuration
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    fn secret_for(&self, token_type: TokenType) -> &str {
        match token_type {
            TokenType::Access => &self.config.access_secret,
            TokenType::Refresh => &self.config.refresh_secret,
        }
    }

    fn ttl_for(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => Duration::seconds(self.config.access_ttl_seconds),
            TokenType::Refresh => Duration::seconds(self.config.refresh_ttl_seconds),
        }
    }

    fn issue(&self, user: &User, token_type: TokenType) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + self.ttl_for(token_type);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: match token_type {
                TokenType::Access => Some(user.role),
                TokenType::Refresh => None,
            },
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        };

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(self.secret_for(token_type).as_bytes());

        encode(&header, &claims, &key)
            .map_err(|e| TokenError::Create(format!("Token encoding failed: {}", e)))
    }

    fn verify(&self, token: &str, expected_type: TokenType) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret_for(expected_type).as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                TokenError::Invalid("Issuer mismatch".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                TokenError::Invalid("Audience mismatch".to_string())
            }
            _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
        })?;

        let claims = token_data.claims;
        if claims.token_type != expected_type {
            return Err(TokenError::Invalid(format!(
                "Expected {} token, got {} token",
                expected_type.as_str(),
                claims.token_type.as_str()
            )));
        }

        Ok(claims)
    }

    /// Generates a short-lived access token for the user
    ///
    /// The token carries the user's role so authorization checks need no
    /// database round trip.
    pub fn generate_access_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue(user, TokenType::Access)
    }

    /// Generates a long-lived refresh token for the user
    ///
    /// Refresh tokens carry identity only; the role is re-read from storage
    /// when a new access token is minted.
    pub fn generate_refresh_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue(user, TokenType::Refresh)
    }

    /// Verifies an access token and extracts its claims
    ///
    /// # Errors
    ///
    /// [`TokenError::Expired`] if the token is past its expiry;
    /// [`TokenError::Invalid`] for a bad signature, wrong issuer or
    /// audience, or a refresh token presented as access.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenType::Access)
    }

    /// Verifies a refresh token and extracts its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenType::Refresh)
    }

    /// Mints a new access token from a valid refresh token
    ///
    /// The caller looks the user up from storage first, so the new access
    /// token reflects the current role and the account still exists. The
    /// refresh token must belong to that same user.
    ///
    /// # Example
    ///
    /// ```
    /// use akcity_core::auth::token::{TokenConfig, TokenService};
    /// use akcity_core::entities::user::{User, UserRole};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let service = TokenService::new(TokenConfig::default());
    /// let user = User::new(
    ///     "Jane Doe".to_string(),
    ///     "jane@example.com".to_string(),
    ///     "$argon2id$...".to_string(),
    ///     "+15551234567".to_string(),
    ///     UserRole::Worker,
    /// );
    ///
    /// let refresh_token = service.generate_refresh_token(&user)?;
    /// let new_access = service.refresh_access_token(&refresh_token, &user)?;
    /// assert!(!new_access.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn refresh_access_token(&self, refresh_token: &str, user: &User) -> Result<String, TokenError> {
        let claims = self.verify_refresh_token(refresh_token)?;

        if claims.sub != user.id {
            return Err(TokenError::Invalid(
                "Refresh token does not belong to this user".to_string(),
            ));
        }

        self.generate_access_token(user)
    }

    /// Hook for an external token denylist
    ///
    /// Stateless tokens stay valid until expiry; actual revocation needs a
    /// shared denylist this service does not own. The hook records the
    /// request so a storage-backed implementation can hang off this seam.
    pub fn revoke_token(&self, token: &str) {
        let claims = self
            .verify_access_token(token)
            .or_else(|_| self.verify_refresh_token(token));

        match claims {
            Ok(claims) => {
                tracing::info!(
                    user_id = %claims.sub,
                    token_type = claims.token_type.as_str(),
                    "Token revocation requested"
                );
            }
            Err(_) => {
                tracing::warn!("Token revocation requested for an unverifiable token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig {
            access_secret: "test-access-secret-at-least-32-bytes!!".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-bytes".to_string(),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 604_800,
            issuer: "akcity-api".to_string(),
            audience: "akcity-client".to_string(),
        }
    }

    fn test_user() -> User {
        User::new(
            "Jane Doe".to_string(),
            "jane@example.com".to_string(),
            "$argon2id$v=19$m=65536,t=3,p=4$placeholder$placeholder".to_string(),
            "+15551234567".to_string(),
            UserRole::Worker,
        )
    }

    #[test]
    fn test_generate_and_verify_access_token() {
        let service = TokenService::new(test_config());
        let user = test_user();

        let token = service
            .generate_access_token(&user)
            .expect("Should create token");
        let claims = service
            .verify_access_token(&token)
            .expect("Should validate token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Some(UserRole::Worker));
        assert_eq!(claims.iss, "akcity-api");
        assert_eq!(claims.aud, "akcity-client");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_token_carries_no_role() {
        let service = TokenService::new(test_config());
        let user = test_user();

        let token = service
            .generate_refresh_token(&user)
            .expect("Should create token");
        let claims = service
            .verify_refresh_token(&token)
            .expect("Should validate token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, None);
        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let service = TokenService::new(test_config());
        let user = test_user();
        let token = service.generate_access_token(&user).unwrap();

        let mut other_config = test_config();
        other_config.access_secret = "a-completely-different-access-secret!!".to_string();
        let other = TokenService::new(other_config);

        let result = other.verify_access_token(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_expired_token() {
        // Expired an hour ago, well past the decoder's leeway
        let mut config = test_config();
        config.access_ttl_seconds = -3600;
        let service = TokenService::new(config);
        let user = test_user();

        let token = service.generate_access_token(&user).unwrap();
        let result = service.verify_access_token(&token);

        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let service = TokenService::new(test_config());
        let user = test_user();
        let token = service.generate_access_token(&user).unwrap();

        let mut other_config = test_config();
        other_config.issuer = "someone-else".to_string();
        let other = TokenService::new(other_config);

        let result = other.verify_access_token(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let service = TokenService::new(test_config());
        let user = test_user();
        let token = service.generate_access_token(&user).unwrap();

        let mut other_config = test_config();
        other_config.audience = "another-client".to_string();
        let other = TokenService::new(other_config);

        let result = other.verify_access_token(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_token_type_confusion_rejected() {
        // Same secret for both types so only the type claim can catch it
        let mut config = test_config();
        config.refresh_secret = config.access_secret.clone();
        let service = TokenService::new(config);
        let user = test_user();

        let access_token = service.generate_access_token(&user).unwrap();
        let result = service.verify_refresh_token(&access_token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));

        let refresh_token = service.generate_refresh_token(&user).unwrap();
        let result = service.verify_access_token(&refresh_token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_refresh_access_token() {
        let service = TokenService::new(test_config());
        let user = test_user();

        let refresh_token = service.generate_refresh_token(&user).unwrap();
        let new_access = service
            .refresh_access_token(&refresh_token, &user)
            .expect("Refresh should succeed");

        let claims = service.verify_access_token(&new_access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Some(UserRole::Worker));
    }

    #[test]
    fn test_refresh_with_access_token_fails() {
        let service = TokenService::new(test_config());
        let user = test_user();

        let access_token = service.generate_access_token(&user).unwrap();
        let result = service.refresh_access_token(&access_token, &user);
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_for_different_user_fails() {
        let service = TokenService::new(test_config());
        let user = test_user();
        let other = User::new(
            "John Smith".to_string(),
            "john@example.com".to_string(),
            "$argon2id$v=19$m=65536,t=3,p=4$placeholder$placeholder".to_string(),
            "+15559876543".to_string(),
            UserRole::Driver,
        );

        let refresh_token = service.generate_refresh_token(&user).unwrap();
        let result = service.refresh_access_token(&refresh_token, &other);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }
}
