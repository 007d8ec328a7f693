/// Postgres persistence layer
///
/// # Modules
///
/// - `pool`: connection pool management with health checks
/// - `migrations`: schema migration runner
/// - `users` / `projects` / `tasks`: repository trait adapters
///
/// # Example
///
/// ```no_run
/// use akcity_core::postgres::pool::{create_pool, DatabaseConfig};
/// use akcity_core::postgres::PostgresUserRepository;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     let users = PostgresUserRepository::new(pool);
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod projects;
pub mod tasks;
pub mod users;

pub use projects::PostgresProjectRepository;
pub use tasks::PostgresTaskRepository;
pub use users::PostgresUserRepository;
