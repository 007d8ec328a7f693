use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::user::{PublicUser, User, UserRole, UserStatus};
use crate::error::CoreResult;

use super::{Page, PageOf};

/// Optional narrowing criteria for user listings
///
/// `search` matches name or email, case-insensitive substring.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

/// Storage contract for users
///
/// Email lookups are case-insensitive. Only
/// [`find_by_email_with_password`](UserRepository::find_by_email_with_password)
/// surfaces the password hash; the plain lookup returns the sanitized
/// projection so callers cannot leak it by accident.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user
    ///
    /// # Errors
    ///
    /// [`crate::error::CoreError::DuplicateEmail`] when the email is taken
    async fn create(&self, user: &User) -> CoreResult<User>;

    /// Looks a user up by ID
    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>>;

    /// Looks a user up by email, without the password hash
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<PublicUser>>;

    /// Looks a user up by email, including the password hash
    ///
    /// For credential verification only.
    async fn find_by_email_with_password(&self, email: &str) -> CoreResult<Option<User>>;

    /// Persists changes to an existing user
    ///
    /// # Errors
    ///
    /// [`crate::error::CoreError::NotFound`] when the user no longer exists
    async fn update(&self, user: &User) -> CoreResult<User>;

    /// Deletes a user; `false` when nothing was there
    async fn delete(&self, id: Uuid) -> CoreResult<bool>;

    /// Lists users newest first, filtered and paged
    async fn list(&self, filter: &UserFilter, page: Page) -> CoreResult<PageOf<User>>;

    /// All users holding a role
    async fn find_by_role(&self, role: UserRole) -> CoreResult<Vec<User>>;

    /// All users in a status
    async fn find_by_status(&self, status: UserStatus) -> CoreResult<Vec<User>>;

    /// Stamps a successful login without a full entity round-trip
    async fn record_login(&self, id: Uuid) -> CoreResult<()>;

    /// Total user count
    async fn count(&self) -> CoreResult<i64>;

    /// User counts grouped by role; roles with no users are absent
    async fn count_by_role(&self) -> CoreResult<Vec<(UserRole, i64)>>;

    /// User counts grouped by status; statuses with no users are absent
    async fn count_by_status(&self) -> CoreResult<Vec<(UserStatus, i64)>>;
}
