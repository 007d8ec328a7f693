/// Error taxonomy for core business operations
///
/// Every use-case returns `Result<T, CoreError>`; nothing panics across that
/// boundary. The HTTP layer owns the mapping from each variant onto a status
/// code and the response envelope, so this type never references HTTP.
///
/// # Error Categories
///
/// - **Caller mistakes**: `Validation`, `DuplicateEmail`, `InvalidTransition`
/// - **Authentication**: `InvalidCredentials`, `AccountNotActive`,
///   `TokenExpired`, `TokenInvalid`
/// - **Infrastructure**: `Hashing`, `Persistence`
/// - **Lookup**: `NotFound`
///
/// # Example
///
/// ```
/// use akcity_core::error::{CoreError, CoreResult};
///
/// fn check_progress(progress: u8) -> CoreResult<()> {
///     if progress > 100 {
///         return Err(CoreError::Validation {
///             field: "progress".to_string(),
///             message: "Progress must be between 0 and 100".to_string(),
///         });
///     }
///     Ok(())
/// }
///
/// assert!(check_progress(50).is_ok());
/// assert!(check_progress(101).is_err());
/// ```

use crate::auth::password::HashingError;
use crate::auth::token::TokenError;

/// Core result type alias
pub type CoreResult<T> = Result<T, CoreError>;

/// Unified error type for business operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation before any side effect
    #[error("Validation failed on {field}: {message}")]
    Validation {
        /// Field that failed validation
        field: String,

        /// Human-readable message
        message: String,
    },

    /// Email address is already registered (case-insensitive)
    #[error("User with this email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password (indistinguishable on purpose)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credentials were correct but the account is not active
    #[error("Account is not active")]
    AccountNotActive,

    /// Lifecycle state machine rejected the requested transition
    #[error("Invalid transition from {from} to {attempted}")]
    InvalidTransition {
        /// Current state
        from: String,

        /// State the caller asked for
        attempted: String,
    },

    /// Token past its expiry
    #[error("Token has expired")]
    TokenExpired,

    /// Token malformed, badly signed, or wrong type/issuer/audience
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    /// Password hashing or verification infrastructure failed
    #[error("Password hashing operation failed")]
    Hashing(#[from] HashingError),

    /// Requested record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Storage layer failure
    #[error("Persistence error: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => CoreError::TokenExpired,
            TokenError::Invalid(reason) | TokenError::Create(reason) => {
                CoreError::TokenInvalid(reason)
            }
        }
    }
}

/// Convert sqlx errors, mapping unique-email violations to `DuplicateEmail`
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("email") {
                    return CoreError::DuplicateEmail;
                }
            }
        }

        CoreError::Persistence(err)
    }
}
