/// User registration flow
///
/// Validates the request, rejects duplicate emails, hashes the password, and
/// persists the new account. A welcome email goes out after the user exists;
/// notification failure is logged and never rolls the registration back.
///
/// # Flow
///
/// ```text
/// CreateUser::execute
///   ├─> validate: required fields, email format, password strength, phone
///   ├─> UserRepository: duplicate email check
///   ├─> PasswordHasher: hash the password
///   ├─> UserRepository: persist the user
///   └─> Notifier: welcome email (best effort)
/// ```

use std::sync::Arc;

use validator::ValidateEmail;

use crate::auth::password::{validate_password_strength, PasswordHasher};
use crate::entities::user::{PublicUser, User, UserRole};
use crate::error::{CoreError, CoreResult};
use crate::notify::Notifier;
use crate::repositories::UserRepository;

/// Everything needed to register a user
///
/// `role` is typed, so a request carrying an unknown role never reaches this
/// layer.
#[derive(Clone)]
pub struct CreateUserInput {
    /// Display name
    pub name: String,

    /// Email address, stored lowercase
    pub email: String,

    /// Plaintext password, hashed before it is stored anywhere
    pub password: String,

    /// Contact phone number
    pub phone: String,

    /// Role assigned at registration
    pub role: UserRole,
}

impl std::fmt::Debug for CreateUserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserInput")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("role", &self.role)
            .finish()
    }
}

/// Registers new users
///
/// Built from trait objects so the HTTP layer and the tests run the same
/// flow against different backends.
pub struct CreateUser {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    notifier: Arc<dyn Notifier>,
}

impl CreateUser {
    /// Creates the use-case from its collaborators
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
        }
    }

    /// Runs the registration flow
    ///
    /// All input checks happen before any storage access.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] for malformed input
    /// - [`CoreError::DuplicateEmail`] when the email is already registered,
    ///   compared case-insensitively
    /// - [`CoreError::Hashing`] / [`CoreError::Persistence`] when the
    ///   infrastructure fails
    pub async fn execute(&self, input: CreateUserInput) -> CoreResult<PublicUser> {
        validate(&input)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(CoreError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(&input.password)?;

        let user = User::new(
            input.name,
            input.email,
            password_hash,
            input.phone,
            input.role,
        );

        let created = self.users.create(&user).await?;

        tracing::info!(user_id = %created.id, role = created.role.as_str(), "User registered");

        if let Err(e) = self
            .notifier
            .send_welcome_email(&created.email, &created.name, created.role)
            .await
        {
            tracing::warn!(user_id = %created.id, error = %e, "Failed to send welcome email");
        }

        Ok(created.to_public())
    }
}

/// Field-level input checks, cheapest first
fn validate(input: &CreateUserInput) -> CoreResult<()> {
    require("name", &input.name)?;
    require("email", &input.email)?;
    require("password", &input.password)?;
    require("phone", &input.phone)?;

    if !input.email.validate_email() {
        return Err(CoreError::Validation {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        });
    }

    validate_password_strength(&input.password).map_err(|message| CoreError::Validation {
        field: "password".to_string(),
        message,
    })?;

    if !valid_phone(&input.phone) {
        return Err(CoreError::Validation {
            field: "phone".to_string(),
            message: "Invalid phone number format".to_string(),
        });
    }

    Ok(())
}

fn require(field: &'static str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation {
            field: field.to_string(),
            message: "This field is required".to_string(),
        });
    }

    Ok(())
}

/// Digits plus the separators people actually type
fn valid_phone(phone: &str) -> bool {
    phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::password::HashingConfig;
    use crate::notify::{FailingNotifier, RecordingNotifier, SentEmail};
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

    fn jane() -> CreateUserInput {
        CreateUserInput {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            password: "Abcdef1!".to_string(),
            phone: "+15551234567".to_string(),
            role: UserRole::Worker,
        }
    }

    fn assert_validation_on(result: CoreResult<PublicUser>, expected_field: &str) {
        match result {
            Err(CoreError::Validation { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected validation error on {expected_field}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_jane_doe() {
        let users = Arc::new(InMemoryUserRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let register = CreateUser::new(users.clone(), test_hasher(), notifier.clone());

        let public = register.execute(jane()).await.unwrap();

        assert_eq!(public.name, "Jane Doe");
        assert_eq!(public.email, "jane@x.com");
        assert_eq!(public.role, UserRole::Worker);

        // Stored hash is Argon2id, never the plaintext
        let stored = users
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert_ne!(stored.password_hash, "Abcdef1!");

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![SentEmail::Welcome {
                to: "jane@x.com".to_string(),
                name: "Jane Doe".to_string(),
                role: UserRole::Worker,
            }]
        );
    }

    #[tokio::test]
    async fn test_register_lowercases_email() {
        let users = Arc::new(InMemoryUserRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let register = CreateUser::new(users.clone(), test_hasher(), notifier.clone());

        let mut input = jane();
        input.email = "Jane@X.com".to_string();

        let public = register.execute(input).await.unwrap();
        assert_eq!(public.email, "jane@x.com");

        // Welcome email goes to the normalized address
        let sent = notifier.sent.lock().unwrap();
        assert!(matches!(&sent[0], SentEmail::Welcome { to, .. } if to == "jane@x.com"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let users = Arc::new(InMemoryUserRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let register = CreateUser::new(users.clone(), test_hasher(), notifier.clone());

        register.execute(jane()).await.unwrap();

        let result = register.execute(jane()).await;
        assert!(matches!(result, Err(CoreError::DuplicateEmail)));

        // Case variations collide with the same address
        let mut shouty = jane();
        shouty.email = "JANE@X.COM".to_string();
        let result = register.execute(shouty).await;
        assert!(matches!(result, Err(CoreError::DuplicateEmail)));

        assert_eq!(users.count().await.unwrap(), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_requires_every_field() {
        let users = Arc::new(InMemoryUserRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let register = CreateUser::new(users.clone(), test_hasher(), notifier.clone());

        for field in ["name", "email", "password", "phone"] {
            let mut input = jane();
            match field {
                "name" => input.name = "  ".to_string(),
                "email" => input.email = "".to_string(),
                "password" => input.password = "".to_string(),
                "phone" => input.phone = " ".to_string(),
                _ => unreachable!(),
            }
            assert_validation_on(register.execute(input).await, field);
        }

        // Nothing was stored and nothing was sent
        assert_eq!(users.count().await.unwrap(), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_email() {
        let users = Arc::new(InMemoryUserRepository::new());
        let register = CreateUser::new(
            users,
            test_hasher(),
            Arc::new(RecordingNotifier::default()),
        );

        let mut input = jane();
        input.email = "not-an-email".to_string();

        match register.execute(input).await {
            Err(CoreError::Validation { field, message }) => {
                assert_eq!(field, "email");
                assert_eq!(message, "Invalid email format");
            }
            other => panic!("Expected email validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let users = Arc::new(InMemoryUserRepository::new());
        let register = CreateUser::new(
            users,
            test_hasher(),
            Arc::new(RecordingNotifier::default()),
        );

        let mut short = jane();
        short.password = "Ab1!".to_string();
        match register.execute(short).await {
            Err(CoreError::Validation { field, message }) => {
                assert_eq!(field, "password");
                assert!(message.contains("at least 8 characters"));
            }
            other => panic!("Expected password validation error, got {other:?}"),
        }

        let mut no_upper = jane();
        no_upper.password = "abcdef1!".to_string();
        assert_validation_on(register.execute(no_upper).await, "password");
    }

    #[tokio::test]
    async fn test_register_rejects_phone_with_letters() {
        let users = Arc::new(InMemoryUserRepository::new());
        let register = CreateUser::new(
            users,
            test_hasher(),
            Arc::new(RecordingNotifier::default()),
        );

        let mut input = jane();
        input.phone = "555-CALL-JANE".to_string();
        assert_validation_on(register.execute(input).await, "phone");
    }

    #[tokio::test]
    async fn test_register_accepts_formatted_phone() {
        let users = Arc::new(InMemoryUserRepository::new());
        let register = CreateUser::new(
            users,
            test_hasher(),
            Arc::new(RecordingNotifier::default()),
        );

        let mut input = jane();
        input.phone = "+90 (312) 555-12 34".to_string();
        assert!(register.execute(input).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_checks_input_before_duplicates() {
        let users = Arc::new(InMemoryUserRepository::new());
        let register = CreateUser::new(
            users,
            test_hasher(),
            Arc::new(RecordingNotifier::default()),
        );

        register.execute(jane()).await.unwrap();

        // Same email, broken password: the input error wins
        let mut input = jane();
        input.password = "weak".to_string();
        assert_validation_on(register.execute(input).await, "password");
    }

    #[tokio::test]
    async fn test_register_survives_notifier_failure() {
        let users = Arc::new(InMemoryUserRepository::new());
        let register = CreateUser::new(users.clone(), test_hasher(), Arc::new(FailingNotifier));

        let public = register.execute(jane()).await.unwrap();
        assert_eq!(public.email, "jane@x.com");

        // The user exists even though the welcome email did not go out
        assert_eq!(users.count().await.unwrap(), 1);
    }
}
