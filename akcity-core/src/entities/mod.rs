/// Domain entities for AkCity
///
/// This module contains the core domain records and their lifecycle methods.
/// Entities enforce their own invariants and never touch storage; persistence
/// is an explicit repository step performed by the calling use-case.
///
/// # Entities
///
/// - `user`: accounts with one of eight fixed roles and an activation status
/// - `project`: construction projects with a status state machine and
///   progress tracking
/// - `task`: work items within a project with their own state machine
///
/// # Construction Paths
///
/// Every entity exposes two constructors enforcing the same invariants:
/// `new` for brand-new records (defaults and fresh timestamps) and
/// `from_storage` for rehydration. Adapters build entities only through
/// these.
///
/// # Example
///
/// ```
/// use akcity_core::entities::user::{User, UserRole, UserStatus};
///
/// let user = User::new(
///     "Jane Doe".to_string(),
///     "Jane@Example.com".to_string(),
///     "$argon2id$...".to_string(),
///     "+15551234567".to_string(),
///     UserRole::Worker,
/// );
///
/// assert_eq!(user.email, "jane@example.com");
/// assert_eq!(user.status, UserStatus::Active);
/// ```

pub mod project;
pub mod task;
pub mod user;
