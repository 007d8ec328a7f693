/// Login flow
///
/// Verifies credentials against the stored Argon2id hash and issues an
/// access/refresh token pair. Unknown email and wrong password come back as
/// the same error, so callers cannot probe which addresses are registered.
///
/// # Flow
///
/// ```text
/// AuthenticateUser::execute
///   ├─> validate: email and password present
///   ├─> UserRepository: lookup with password hash
///   ├─> status gate: only active accounts may log in
///   ├─> PasswordHasher: constant-time verification
///   ├─> UserRepository: stamp last_login
///   └─> TokenService: access + refresh tokens
/// ```

use std::sync::Arc;

use serde::Serialize;

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::entities::user::PublicUser;
use crate::error::{CoreError, CoreResult};
use crate::repositories::UserRepository;

/// Login credentials as submitted
#[derive(Clone)]
pub struct AuthenticateUserInput {
    /// Email address, matched case-insensitively
    pub email: String,

    /// Plaintext password
    pub password: String,
}

impl std::fmt::Debug for AuthenticateUserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticateUserInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login payload
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutput {
    /// The authenticated user, sanitized
    pub user: PublicUser,

    /// Short-lived bearer token
    pub access_token: String,

    /// Long-lived token for minting new access tokens
    pub refresh_token: String,
}

/// Verifies credentials and opens a session
pub struct AuthenticateUser {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl AuthenticateUser {
    /// Creates the use-case from its collaborators
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Runs the login flow
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] when email or password is missing, before
    ///   any storage access
    /// - [`CoreError::InvalidCredentials`] for unknown email or wrong
    ///   password, indistinguishable from each other
    /// - [`CoreError::AccountNotActive`] when the password would be checked
    ///   but the account is deactivated or suspended
    pub async fn execute(&self, input: AuthenticateUserInput) -> CoreResult<AuthOutput> {
        if input.email.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "email".to_string(),
                message: "This field is required".to_string(),
            });
        }

        if input.password.is_empty() {
            return Err(CoreError::Validation {
                field: "password".to_string(),
                message: "This field is required".to_string(),
            });
        }

        let mut user = match self.users.find_by_email_with_password(&input.email).await? {
            Some(user) => user,
            None => return Err(CoreError::InvalidCredentials),
        };

        if !user.is_active() {
            tracing::warn!(
                user_id = %user.id,
                status = user.status.as_str(),
                "Login rejected, account not active"
            );
            return Err(CoreError::AccountNotActive);
        }

        if !self.hasher.verify(&input.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login rejected, wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        // Stamp the returned copy too; the repository writes its own timestamp
        user.record_login();
        self.users.record_login(user.id).await?;

        let access_token = self.tokens.generate_access_token(&user)?;
        let refresh_token = self.tokens.generate_refresh_token(&user)?;

        tracing::info!(user_id = %user.id, "User authenticated");

        Ok(AuthOutput {
            user: user.to_public(),
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::password::HashingConfig;
    use crate::auth::token::TokenConfig;
    use crate::entities::user::{User, UserRole};
    use crate::repositories::memory::InMemoryUserRepository;

    /// Small work factor to keep the suite fast
    fn test_hasher() -> Arc<PasswordHasher> {
        Arc::new(PasswordHasher::new(HashingConfig {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
        }))
    }

    /// Repository seeded with Jane Doe, plus the wired login service
    async fn seeded_service() -> (
        Arc<InMemoryUserRepository>,
        Arc<TokenService>,
        AuthenticateUser,
    ) {
        let users = Arc::new(InMemoryUserRepository::new());
        let hasher = test_hasher();
        let tokens = Arc::new(TokenService::new(TokenConfig::default()));

        let jane = User::new(
            "Jane Doe".to_string(),
            "jane@x.com".to_string(),
            hasher.hash("Abcdef1!").unwrap(),
            "+15551234567".to_string(),
            UserRole::Worker,
        );
        users.create(&jane).await.unwrap();

        let service = AuthenticateUser::new(users.clone(), hasher, tokens.clone());
        (users, tokens, service)
    }

    fn credentials(email: &str, password: &str) -> AuthenticateUserInput {
        AuthenticateUserInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_tokens() {
        let (_, tokens, service) = seeded_service().await;

        let output = service
            .execute(credentials("jane@x.com", "Abcdef1!"))
            .await
            .unwrap();

        assert_eq!(output.user.email, "jane@x.com");
        assert!(!output.access_token.is_empty());
        assert!(!output.refresh_token.is_empty());
        assert_ne!(output.access_token, output.refresh_token);

        let claims = tokens.verify_access_token(&output.access_token).unwrap();
        assert_eq!(claims.sub, output.user.id);
        assert_eq!(claims.email, "jane@x.com");
        assert_eq!(claims.role, Some(UserRole::Worker));

        let claims = tokens.verify_refresh_token(&output.refresh_token).unwrap();
        assert_eq!(claims.sub, output.user.id);
    }

    #[tokio::test]
    async fn test_login_matches_email_case_insensitively() {
        let (_, _, service) = seeded_service().await;

        let output = service
            .execute(credentials("JANE@X.com", "Abcdef1!"))
            .await
            .unwrap();
        assert_eq!(output.user.email, "jane@x.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (_, _, service) = seeded_service().await;

        let unknown = service
            .execute(credentials("ghost@x.com", "Abcdef1!"))
            .await
            .unwrap_err();
        let wrong_password = service
            .execute(credentials("jane@x.com", "Wrong1!pw"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, CoreError::InvalidCredentials));
        assert!(matches!(wrong_password, CoreError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong_password.to_string());
    }

    #[tokio::test]
    async fn test_login_rejects_inactive_account() {
        let (users, _, service) = seeded_service().await;

        let mut jane = users
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        jane.deactivate();
        users.update(&jane).await.unwrap();

        let result = service.execute(credentials("jane@x.com", "Abcdef1!")).await;
        assert!(matches!(result, Err(CoreError::AccountNotActive)));
    }

    #[tokio::test]
    async fn test_login_rejects_suspended_account() {
        let (users, _, service) = seeded_service().await;

        let mut jane = users
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        jane.suspend();
        users.update(&jane).await.unwrap();

        let result = service.execute(credentials("jane@x.com", "Abcdef1!")).await;
        assert!(matches!(result, Err(CoreError::AccountNotActive)));
    }

    #[tokio::test]
    async fn test_login_requires_email_and_password() {
        let (_, _, service) = seeded_service().await;

        match service.execute(credentials("  ", "Abcdef1!")).await {
            Err(CoreError::Validation { field, .. }) => assert_eq!(field, "email"),
            other => panic!("Expected email validation error, got {other:?}"),
        }

        match service.execute(credentials("jane@x.com", "")).await {
            Err(CoreError::Validation { field, .. }) => assert_eq!(field, "password"),
            other => panic!("Expected password validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_stamps_last_login() {
        let (users, _, service) = seeded_service().await;

        let before = users
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(before.last_login.is_none());

        let output = service
            .execute(credentials("jane@x.com", "Abcdef1!"))
            .await
            .unwrap();
        assert!(output.user.last_login.is_some());

        let after = users
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(after.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_failure_leaves_last_login_unset() {
        let (users, _, service) = seeded_service().await;

        service
            .execute(credentials("jane@x.com", "Wrong1!pw"))
            .await
            .unwrap_err();

        let jane = users
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(jane.last_login.is_none());
    }
}
