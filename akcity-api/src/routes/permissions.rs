/// Permission table endpoints
///
/// Serves the role to permission mapping so clients can gate menus and
/// buttons without hardcoding a second copy of the table. The server-side
/// checks in the middleware stay authoritative.
///
/// # Endpoints
///
/// - `GET /api/v1/permissions` - Full role to permission table
/// - `GET /api/v1/permissions/me` - The caller's own permission set

use crate::{middleware::auth::CurrentUser, response::Envelope};
use akcity_core::entities::user::UserRole;
use akcity_core::permissions::{permission_table, permissions_for, RolePermissions};
use axum::{Extension, Json};
use serde::Serialize;

/// The caller's role and permission set
#[derive(Debug, Serialize)]
pub struct MyPermissions {
    /// Role of the caller
    pub role: UserRole,

    /// Permissions that role holds
    pub permissions: &'static [&'static str],
}

/// Full permission table, one entry per role
pub async fn list_permissions() -> Json<Envelope<Vec<RolePermissions>>> {
    Envelope::data("Permissions retrieved successfully", permission_table())
}

/// Permission set of the authenticated caller
pub async fn my_permissions(
    Extension(current): Extension<CurrentUser>,
) -> Json<Envelope<MyPermissions>> {
    let role = current.user.role;

    Envelope::data(
        "Permissions retrieved successfully",
        MyPermissions {
            role,
            permissions: permissions_for(role),
        },
    )
}
