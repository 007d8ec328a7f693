/// Role to permission mapping
///
/// Permissions are `resource:action` strings checked against a fixed table.
/// The general manager holds the `*` wildcard and passes every check. The
/// table is plain data so the HTTP layer can serve it for client-side menu
/// and button gating; the server-side check in
/// [`role_has_permission`] stays authoritative.
///
/// # Example
///
/// ```
/// use akcity_core::entities::user::UserRole;
/// use akcity_core::permissions::role_has_permission;
///
/// assert!(role_has_permission(UserRole::Worker, "task:read"));
/// assert!(!role_has_permission(UserRole::Worker, "project:delete"));
/// assert!(role_has_permission(UserRole::GeneralManager, "anything:at-all"));
/// ```

use serde::Serialize;

use crate::entities::user::UserRole;

/// Grants every permission
pub const WILDCARD: &str = "*";

/// Permissions held by one role, shaped for serving over the wire
#[derive(Debug, Clone, Serialize)]
pub struct RolePermissions {
    pub role: UserRole,
    pub permissions: &'static [&'static str],
}

/// Returns the permission set for a role
pub fn permissions_for(role: UserRole) -> &'static [&'static str] {
    match role {
        UserRole::GeneralManager => &[WILDCARD],
        UserRole::ProjectManager => &[
            "project:read",
            "project:write",
            "project:delete",
            "task:read",
            "task:write",
            "task:delete",
            "user:read",
            "report:read",
            "report:write",
        ],
        UserRole::Architect => &[
            "project:read",
            "task:read",
            "task:write",
            "document:read",
            "document:write",
        ],
        UserRole::ChiefEngineer => &[
            "project:read",
            "task:read",
            "task:write",
            "report:read",
            "report:write",
            "quality:read",
            "quality:write",
        ],
        UserRole::Driver => &[
            "task:read",
            "material:read",
            "delivery:read",
            "delivery:write",
        ],
        UserRole::Worker => &["task:read", "report:write", "material:request"],
        UserRole::PurchasingManager => &[
            "material:read",
            "material:write",
            "material:delete",
            "supplier:read",
            "supplier:write",
        ],
        UserRole::Client => &["project:read", "report:read"],
    }
}

/// Checks whether a role holds a permission, honoring the wildcard
pub fn role_has_permission(role: UserRole, permission: &str) -> bool {
    permissions_for(role)
        .iter()
        .any(|p| *p == WILDCARD || *p == permission)
}

/// The full table, one entry per role
pub fn permission_table() -> Vec<RolePermissions> {
    UserRole::ALL
        .iter()
        .map(|role| RolePermissions {
            role: *role,
            permissions: permissions_for(*role),
        })
        .collect()
}
