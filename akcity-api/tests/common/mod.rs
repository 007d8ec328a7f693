/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup with migrations
/// - A seeded user with a known password
/// - JWT token generation
/// - Cleanup helpers

use akcity_api::app::{build_router, AppState};
use akcity_api::config::Config;
use akcity_core::auth::password::PasswordHasher;
use akcity_core::auth::token::TokenService;
use akcity_core::entities::user::{User, UserRole};
use akcity_core::postgres::PostgresUserRepository;
use akcity_core::repositories::user::UserRepository;
use sqlx::PgPool;
use uuid::Uuid;

/// Password every seeded user is created with
pub const SEED_PASSWORD: &str = "Sup3rvisor!Pass";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and one seeded user
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Seed a user with a known password so login can be exercised
        let hasher = PasswordHasher::default();
        let user = User::new(
            "Test Manager".to_string(),
            format!("test-{}@example.com", Uuid::new_v4()),
            hasher.hash(SEED_PASSWORD)?,
            "+15550001111".to_string(),
            UserRole::ProjectManager,
        );
        let users = PostgresUserRepository::new(db.clone());
        let user = users.create(&user).await?;

        // Mint tokens directly so authenticated endpoints can be hit
        let tokens = TokenService::new(config.token_config());
        let access_token = tokens.generate_access_token(&user)?;
        let refresh_token = tokens.generate_refresh_token(&user)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            access_token,
            refresh_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    fn users(&self) -> PostgresUserRepository {
        PostgresUserRepository::new(self.db.clone())
    }

    /// Deletes a user that a test registered through the API
    pub async fn delete_user_by_email(&self, email: &str) -> anyhow::Result<()> {
        if let Some(found) = self.users().find_by_email(email).await? {
            self.users().delete(found.id).await?;
        }
        Ok(())
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        self.users().delete(self.user.id).await?;
        Ok(())
    }
}

/// Builds a unique registration payload, returning the body and its email
pub fn register_payload(role: &str) -> (serde_json::Value, String) {
    let email = format!("test-{}@example.com", Uuid::new_v4());
    let body = serde_json::json!({
        "name": "Registered Tester",
        "email": email,
        "password": "Abcdef1!",
        "phone": "+15552223333",
        "role": role
    });
    (body, email)
}

/// Reads a response body as a JSON value
pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
