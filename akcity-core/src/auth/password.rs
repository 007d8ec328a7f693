/// Password hashing service using Argon2id
///
/// This module provides one-way password hashing behind a service type whose
/// work factor is injected at construction. The produced hash is a PHC string
/// that embeds algorithm, parameters, and salt, so verification needs no
/// configuration lookup.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KiB) by default
/// - **Iterations**: 3 passes by default
/// - **Parallelism**: 4 lanes by default
/// - **Output**: 32-byte hash
///
/// Hashing is intentionally slow in proportion to the work factor.
/// [`HashingError`] carries neither the plaintext nor the underlying cause.
///
/// # Example
///
/// ```
/// use akcity_core::auth::password::{HashingConfig, PasswordHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(HashingConfig::default());
///
/// let hash = hasher.hash("super_secret_password_123")?;
/// assert!(hasher.verify("super_secret_password_123", &hash)?);
///
/// // Wrong password fails without an error
/// assert!(!hasher.verify("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};

/// Error type for password hashing operations
///
/// Opaque on purpose: no plaintext, no cause text.
#[derive(Debug, thiserror::Error)]
#[error("Password hashing operation failed")]
pub struct HashingError;

/// Work-factor configuration for Argon2id
///
/// Injected into [`PasswordHasher`] at startup; immutable afterwards.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of iterations (time cost)
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,

    /// Hash output length in bytes
    pub output_len: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MB
            iterations: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

/// One-way password hashing and verification
///
/// Construct once from [`HashingConfig`] and share by reference; the service
/// holds no mutable state.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    config: HashingConfig,
}

impl PasswordHasher {
    /// Creates a hasher with the given work factor
    pub fn new(config: HashingConfig) -> Self {
        Self { config }
    }

    fn params(&self) -> Result<Params, HashingError> {
        ParamsBuilder::new()
            .m_cost(self.config.memory_kib)
            .t_cost(self.config.iterations)
            .p_cost(self.config.parallelism)
            .output_len(self.config.output_len)
            .build()
            .map_err(|_| HashingError)
    }

    /// Hashes a password with a fresh random salt
    ///
    /// # Returns
    ///
    /// PHC string format hash, for example:
    ///
    /// ```text
    /// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`HashingError`] if the configured parameters are rejected or
    /// hash generation fails.
    pub fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = self.params()?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| HashingError)?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored hash
    ///
    /// Comparison is constant-time. The parameters embedded in the hash are
    /// used, so hashes created under an older work factor still verify.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the password matches, `Ok(false)` if it does not.
    ///
    /// # Errors
    ///
    /// Returns [`HashingError`] only for non-password failures, such as a
    /// hash that is not a valid PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| HashingError)?;

        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(HashingError),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashingConfig::default())
    }
}

/// Validates password strength
///
/// Registration policy:
/// - At least 8 characters long
/// - Contains at least one uppercase letter
/// - Contains at least one lowercase letter
/// - Contains at least one digit
/// - Contains at least one special character
///
/// # Returns
///
/// `Ok(())` if the password is strong enough, `Err` with a description if not
///
/// # Example
///
/// ```
/// use akcity_core::auth::password::validate_password_strength;
///
/// // Strong password
/// assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
///
/// // Too short
/// assert!(validate_password_strength("Sh0rt!").is_err());
///
/// // Missing special character
/// assert!(validate_password_strength("Password123").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small work factor to keep the suite fast
    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(HashingConfig {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
        })
    }

    #[test]
    fn test_hash_embeds_configured_parameters() {
        let hasher = PasswordHasher::default();
        let hash = hasher.hash("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_never_equals_plaintext() {
        let hasher = test_hasher();
        let hash = hasher.hash("Abcdef1!").expect("Hash should succeed");
        assert_ne!(hash, "Abcdef1!");
    }

    #[test]
    fn test_hash_produces_different_salts() {
        let hasher = test_hasher();

        let hash1 = hasher.hash("same_password").expect("Hash 1 should succeed");
        let hash2 = hasher.hash("same_password").expect("Hash 2 should succeed");

        // Different salts = different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_password() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct_password").expect("Hash should succeed");

        let result = hasher
            .verify("correct_password", &hash)
            .expect("Verify should succeed");
        assert!(result, "Correct password should verify");
    }

    #[test]
    fn test_verify_incorrect_password() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct_password").expect("Hash should succeed");

        let result = hasher
            .verify("wrong_password", &hash)
            .expect("Verify should succeed");
        assert!(!result, "Wrong password should not verify");
    }

    #[test]
    fn test_verify_empty_password() {
        let hasher = test_hasher();
        let hash = hasher.hash("password").expect("Hash should succeed");

        let result = hasher.verify("", &hash).expect("Verify should succeed");
        assert!(!result, "Empty password should not verify");
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = test_hasher();
        let result = hasher.verify("password", "not_a_phc_string");
        assert!(result.is_err(), "Invalid hash should return error");
    }

    #[test]
    fn test_verify_accepts_older_work_factor() {
        // Hash under one work factor, verify with a service under another
        let old = test_hasher();
        let hash = old.hash("migrating_password").expect("Hash should succeed");

        let new = PasswordHasher::new(HashingConfig {
            memory_kib: 16384,
            iterations: 2,
            parallelism: 1,
            output_len: 32,
        });
        let result = new
            .verify("migrating_password", &hash)
            .expect("Verify should succeed");
        assert!(result);
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let hasher = test_hasher();
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-пароль",
        ];

        for password in passwords {
            let hash = hasher.hash(password).expect("Hash should succeed");
            let verified = hasher.verify(password, &hash).expect("Verify should succeed");
            assert!(verified, "Password '{}' should verify", password);
        }
    }

    #[test]
    fn test_validate_password_strength_valid() {
        let valid_passwords = vec!["MyP@ssw0rd!", "Str0ng!Pass", "Abcdef1!", "S3cur3$Password"];

        for password in valid_passwords {
            assert!(
                validate_password_strength(password).is_ok(),
                "Password '{}' should be valid",
                password
            );
        }
    }

    #[test]
    fn test_validate_password_strength_too_short() {
        let result = validate_password_strength("Sh0rt!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at least 8 characters"));
    }

    #[test]
    fn test_validate_password_strength_no_uppercase() {
        let result = validate_password_strength("lowercase1!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("uppercase letter"));
    }

    #[test]
    fn test_validate_password_strength_no_lowercase() {
        let result = validate_password_strength("UPPERCASE1!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("lowercase letter"));
    }

    #[test]
    fn test_validate_password_strength_no_digit() {
        let result = validate_password_strength("NoDigits!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("digit"));
    }

    #[test]
    fn test_validate_password_strength_no_special() {
        let result = validate_password_strength("NoSpecial123");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("special character"));
    }
}
