/// User entity and role/status enums
///
/// Users are the accounts of the system. Each user holds exactly one of the
/// eight fixed roles; what a role may do is resolved through the permission
/// table in [`crate::permissions`], never stored per user.
///
/// The password field always carries an Argon2id hash, never plaintext, and
/// is excluded from every outward serialization via [`PublicUser`].
///
/// # Example
///
/// ```
/// use akcity_core::entities::user::{User, UserRole, UserStatus};
///
/// let mut user = User::new(
///     "Jane Doe".to_string(),
///     "Jane@Example.com".to_string(),
///     "$argon2id$...".to_string(),
///     "+15551234567".to_string(),
///     UserRole::Worker,
/// );
///
/// assert_eq!(user.email, "jane@example.com");
/// assert!(user.is_active());
///
/// user.suspend();
/// assert_eq!(user.status, UserStatus::Suspended);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The eight fixed roles of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access to everything
    GeneralManager,

    /// Runs projects and the tasks within them
    ProjectManager,

    /// Design work and documents
    Architect,

    /// Engineering oversight and quality reports
    ChiefEngineer,

    /// Material deliveries
    Driver,

    /// On-site execution
    Worker,

    /// Materials and suppliers
    PurchasingManager,

    /// Read-only external party
    Client,
}

impl UserRole {
    /// All roles, in declaration order
    pub const ALL: [UserRole; 8] = [
        UserRole::GeneralManager,
        UserRole::ProjectManager,
        UserRole::Architect,
        UserRole::ChiefEngineer,
        UserRole::Driver,
        UserRole::Worker,
        UserRole::PurchasingManager,
        UserRole::Client,
    ];

    /// Converts role to string for storage and wire formats
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::GeneralManager => "general_manager",
            UserRole::ProjectManager => "project_manager",
            UserRole::Architect => "architect",
            UserRole::ChiefEngineer => "chief_engineer",
            UserRole::Driver => "driver",
            UserRole::Worker => "worker",
            UserRole::PurchasingManager => "purchasing_manager",
            UserRole::Client => "client",
        }
    }

    /// Parses a role from its string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "general_manager" => Some(UserRole::GeneralManager),
            "project_manager" => Some(UserRole::ProjectManager),
            "architect" => Some(UserRole::Architect),
            "chief_engineer" => Some(UserRole::ChiefEngineer),
            "driver" => Some(UserRole::Driver),
            "worker" => Some(UserRole::Worker),
            "purchasing_manager" => Some(UserRole::PurchasingManager),
            "client" => Some(UserRole::Client),
            _ => None,
        }
    }
}

/// Account activation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account may authenticate
    Active,

    /// Account was switched off
    Inactive,

    /// Account was suspended by an administrator
    Suspended,

    /// Account awaits approval
    Pending,
}

impl UserStatus {
    /// Converts status to string for storage and wire formats
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
            UserStatus::Pending => "pending",
        }
    }

    /// Parses a status from its string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "suspended" => Some(UserStatus::Suspended),
            "pending" => Some(UserStatus::Pending),
            _ => None,
        }
    }
}

/// User account record
///
/// Deliberately not serializable: outward representations go through
/// [`PublicUser`], which has no password field at all.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique, stored lowercase
    pub email: String,

    /// Argon2id password hash, never plaintext
    pub password_hash: String,

    /// Contact phone number
    pub phone: String,

    /// Role, fixed set of eight
    pub role: UserRole,

    /// Optional avatar URL
    pub avatar: Option<String>,

    /// Activation status
    pub status: UserStatus,

    /// When the user last logged in (None if never)
    pub last_login: Option<DateTime<Utc>>,

    /// Projects this user is associated with
    pub projects: Vec<Uuid>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a brand-new user
    ///
    /// Defaults `status` to active, lowercases the email, and stamps both
    /// timestamps. The password must already be hashed.
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        phone: String,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name,
            email: email.to_lowercase(),
            password_hash,
            phone,
            role,
            avatar: None,
            status: UserStatus::Active,
            last_login: None,
            projects: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates a user from its storage image
    ///
    /// Applies the same normalization as [`User::new`]. Adapters build
    /// users only through `new` or this.
    pub fn from_storage(record: Self) -> Self {
        Self {
            email: record.email.to_lowercase(),
            ..record
        }
    }

    /// Updates profile fields; `None` leaves a field untouched
    pub fn update_profile(
        &mut self,
        name: Option<String>,
        phone: Option<String>,
        avatar: Option<String>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(avatar) = avatar {
            self.avatar = Some(avatar);
        }
        self.updated_at = Utc::now();
    }

    /// Replaces the password hash
    pub fn change_password(&mut self, new_hash: String) {
        self.password_hash = new_hash;
        self.updated_at = Utc::now();
    }

    /// Stamps the last-login timestamp
    pub fn record_login(&mut self) {
        self.last_login = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Sets the account active
    pub fn activate(&mut self) {
        self.status = UserStatus::Active;
        self.updated_at = Utc::now();
    }

    /// Switches the account off
    pub fn deactivate(&mut self) {
        self.status = UserStatus::Inactive;
        self.updated_at = Utc::now();
    }

    /// Suspends the account
    pub fn suspend(&mut self) {
        self.status = UserStatus::Suspended;
        self.updated_at = Utc::now();
    }

    /// Checks whether the account may authenticate
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Checks a permission string against this user's role
    ///
    /// Delegates to the permission table; the general manager's wildcard
    /// grants everything.
    pub fn has_permission(&self, permission: &str) -> bool {
        crate::permissions::role_has_permission(self.role, permission)
    }

    /// Returns the sanitized projection of this user
    pub fn to_public(&self) -> PublicUser {
        PublicUser::from(self.clone())
    }
}

/// Outward-facing user representation
///
/// Carries everything except the password hash. This is the only user shape
/// that crosses the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Contact phone number
    pub phone: String,

    /// Role
    pub role: UserRole,

    /// Optional avatar URL
    pub avatar: Option<String>,

    /// Activation status
    pub status: UserStatus,

    /// When the user last logged in
    pub last_login: Option<DateTime<Utc>>,

    /// Projects this user is associated with
    pub projects: Vec<Uuid>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            avatar: user.avatar,
            status: user.status,
            last_login: user.last_login,
            projects: user.projects,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "Jane Doe".to_string(),
            "jane@example.com".to_string(),
            "$argon2id$v=19$m=65536,t=3,p=4$placeholder$placeholder".to_string(),
            "+15551234567".to_string(),
            UserRole::Worker,
        )
    }

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::GeneralManager.as_str(), "general_manager");
        assert_eq!(UserRole::ProjectManager.as_str(), "project_manager");
        assert_eq!(UserRole::Architect.as_str(), "architect");
        assert_eq!(UserRole::ChiefEngineer.as_str(), "chief_engineer");
        assert_eq!(UserRole::Driver.as_str(), "driver");
        assert_eq!(UserRole::Worker.as_str(), "worker");
        assert_eq!(UserRole::PurchasingManager.as_str(), "purchasing_manager");
        assert_eq!(UserRole::Client.as_str(), "client");
    }

    #[test]
    fn test_user_role_from_str() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("janitor"), None);
    }

    #[test]
    fn test_user_status_roundtrip() {
        for status in [
            UserStatus::Active,
            UserStatus::Inactive,
            UserStatus::Suspended,
            UserStatus::Pending,
        ] {
            assert_eq!(UserStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(UserStatus::from_str("archived"), None);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = test_user();

        assert_eq!(user.status, UserStatus::Active);
        assert!(user.is_active());
        assert!(user.last_login.is_none());
        assert!(user.avatar.is_none());
        assert!(user.projects.is_empty());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_new_user_lowercases_email() {
        let user = User::new(
            "Jane Doe".to_string(),
            "Jane.Doe@EXAMPLE.com".to_string(),
            "hash".to_string(),
            "+15551234567".to_string(),
            UserRole::Client,
        );

        assert_eq!(user.email, "jane.doe@example.com");
    }

    #[test]
    fn test_from_storage_normalizes_email() {
        let mut record = test_user();
        record.email = "MiXeD@Example.COM".to_string();

        let user = User::from_storage(record);
        assert_eq!(user.email, "mixed@example.com");
    }

    #[test]
    fn test_update_profile() {
        let mut user = test_user();
        let before = user.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));

        user.update_profile(Some("Jane Smith".to_string()), None, None);

        assert_eq!(user.name, "Jane Smith");
        assert_eq!(user.phone, "+15551234567", "untouched field must survive");
        assert!(user.updated_at > before);
    }

    #[test]
    fn test_change_password() {
        let mut user = test_user();
        let before = user.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));

        user.change_password("$argon2id$new-hash".to_string());

        assert_eq!(user.password_hash, "$argon2id$new-hash");
        assert!(user.updated_at > before);
    }

    #[test]
    fn test_record_login() {
        let mut user = test_user();
        assert!(user.last_login.is_none());

        user.record_login();
        assert!(user.last_login.is_some());
    }

    #[test]
    fn test_status_transitions() {
        let mut user = test_user();

        user.deactivate();
        assert_eq!(user.status, UserStatus::Inactive);
        assert!(!user.is_active());

        user.suspend();
        assert_eq!(user.status, UserStatus::Suspended);

        user.activate();
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.is_active());
    }

    #[test]
    fn test_has_permission() {
        let worker = test_user();
        assert!(worker.has_permission("task:read"));
        assert!(!worker.has_permission("project:delete"));

        let mut manager = test_user();
        manager.role = UserRole::GeneralManager;
        assert!(manager.has_permission("project:delete"));
        assert!(manager.has_permission("anything:at-all"));
    }

    #[test]
    fn test_public_user_omits_password() {
        let user = test_user();
        let hash = user.password_hash.clone();

        let public = user.to_public();
        let json = serde_json::to_string(&public).expect("Should serialize");

        assert!(!json.contains(&hash));
        assert!(!json.contains("password"));
        assert!(json.contains("jane@example.com"));
    }
}
