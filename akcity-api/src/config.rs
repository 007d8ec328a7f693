/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. It is read once in `main` and shared
/// through the application state; nothing re-reads the environment later.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: http://localhost:3000)
/// - `APP_ENV`: `development` or `production` (default: development)
/// - `JWT_ACCESS_SECRET`: Access token signing secret, at least 32 chars (required)
/// - `JWT_REFRESH_SECRET`: Refresh token signing secret, at least 32 chars (required)
/// - `JWT_ACCESS_TTL_SECONDS`: Access token lifetime (default: 900)
/// - `JWT_REFRESH_TTL_SECONDS`: Refresh token lifetime (default: 604800)
/// - `JWT_ISSUER`: `iss` claim value (default: akcity-api)
/// - `JWT_AUDIENCE`: `aud` claim value (default: akcity-client)
/// - `ARGON2_MEMORY_KIB`: Password hashing memory cost in KiB (default: 65536)
/// - `ARGON2_ITERATIONS`: Password hashing time cost (default: 3)
/// - `ARGON2_PARALLELISM`: Password hashing lanes (default: 4)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use akcity_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

use akcity_core::auth::password::HashingConfig;
use akcity_core::auth::token::TokenConfig;
use akcity_core::postgres::pool::DatabaseConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DbConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing work factor
    pub argon: ArgonConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive (development only)
    pub cors_origins: Vec<String>,

    /// Whether the server runs in production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
///
/// Secrets must be at least 32 characters and must differ from each other.
/// Generate with: `openssl rand -hex 32`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,

    /// Secret for signing refresh tokens
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

/// Argon2 work-factor configuration
///
/// Deployments tune these per host; hashes created under an older work
/// factor keep verifying because the parameters travel in the PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgonConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of iterations (time cost)
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    /// - JWT secrets are too short or identical
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let access_secret = env::var("JWT_ACCESS_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_ACCESS_SECRET environment variable is required"))?;
        let refresh_secret = env::var("JWT_REFRESH_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_REFRESH_SECRET environment variable is required"))?;

        if access_secret.len() < 32 {
            anyhow::bail!("JWT_ACCESS_SECRET must be at least 32 characters long");
        }
        if refresh_secret.len() < 32 {
            anyhow::bail!("JWT_REFRESH_SECRET must be at least 32 characters long");
        }
        if access_secret == refresh_secret {
            anyhow::bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
        }

        let access_ttl_seconds = env::var("JWT_ACCESS_TTL_SECONDS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<i64>()?;
        let refresh_ttl_seconds = env::var("JWT_REFRESH_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<i64>()?;

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "akcity-api".to_string());
        let audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "akcity-client".to_string());

        let argon_memory_kib = env::var("ARGON2_MEMORY_KIB")
            .unwrap_or_else(|_| "65536".to_string())
            .parse::<u32>()?;
        let argon_iterations = env::var("ARGON2_ITERATIONS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()?;
        let argon_parallelism = env::var("ARGON2_PARALLELISM")
            .unwrap_or_else(|_| "4".to_string())
            .parse::<u32>()?;

        if argon_iterations == 0 || argon_parallelism == 0 {
            anyhow::bail!("ARGON2_ITERATIONS and ARGON2_PARALLELISM must be at least 1");
        }
        // Argon2 requires 8 KiB of memory per lane
        if argon_memory_kib < 8 * argon_parallelism {
            anyhow::bail!("ARGON2_MEMORY_KIB must be at least 8 times ARGON2_PARALLELISM");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DbConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                access_secret,
                refresh_secret,
                access_ttl_seconds,
                refresh_ttl_seconds,
                issuer,
                audience,
            },
            argon: ArgonConfig {
                memory_kib: argon_memory_kib,
                iterations: argon_iterations,
                parallelism: argon_parallelism,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Token service configuration derived from the JWT section
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.jwt.access_secret.clone(),
            refresh_secret: self.jwt.refresh_secret.clone(),
            access_ttl_seconds: self.jwt.access_ttl_seconds,
            refresh_ttl_seconds: self.jwt.refresh_ttl_seconds,
            issuer: self.jwt.issuer.clone(),
            audience: self.jwt.audience.clone(),
        }
    }

    /// Connection pool configuration derived from the database section
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..DatabaseConfig::default()
        }
    }

    /// Hashing service configuration derived from the Argon2 section
    pub fn hashing_config(&self) -> HashingConfig {
        HashingConfig {
            memory_kib: self.argon.memory_kib,
            iterations: self.argon.iterations,
            parallelism: self.argon.parallelism,
            ..HashingConfig::default()
        }
    }
}
