/// Authentication services
///
/// This module provides the security primitives for AkCity:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing with a configurable work factor
/// - [`token`]: signed access and refresh tokens (HS256)
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory, 3 iterations by default
/// - **Tokens**: HS256 signing, separate access and refresh secrets,
///   issuer/audience checks on every verification
/// - **Constant-time Comparison**: password verification never short-circuits
///
/// # Example
///
/// ```no_run
/// use akcity_core::auth::password::{HashingConfig, PasswordHasher};
/// use akcity_core::auth::token::{TokenConfig, TokenService};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hasher = PasswordHasher::new(HashingConfig::default());
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
///
/// // Token issuance
/// let tokens = TokenService::new(TokenConfig::default());
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod token;
