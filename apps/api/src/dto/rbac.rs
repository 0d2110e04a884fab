use chrono::SecondsFormat;
use sanad_application::{RoleAssignment, RoleSummary};
use sanad_domain::{PermissionCategory, PermissionCode, PermissionDefinition};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of one catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub code: String,
    pub category: String,
    pub display_name: String,
    pub description: String,
}

/// Explicit codes behind a permission category.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/category-permissions-response.ts"
)]
pub struct CategoryPermissionsResponse {
    pub category: String,
    pub display_name: String,
    pub permissions: Vec<String>,
}

/// API representation of a role and its resolved grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub is_system: bool,
    pub permissions: Vec<String>,
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub role_name: String,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_name: String,
}

/// Roles and permissions held by the signed-in user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            code: value.code().as_str().to_owned(),
            category: value.category().as_str().to_owned(),
            display_name: value.display_name().to_owned(),
            description: value.description().to_owned(),
        }
    }
}

impl CategoryPermissionsResponse {
    pub fn new(category: PermissionCategory, codes: Vec<PermissionCode>) -> Self {
        Self {
            category: category.as_str().to_owned(),
            display_name: category.display_name().to_owned(),
            permissions: codes.into_iter().map(String::from).collect(),
        }
    }
}

impl From<RoleSummary> for RoleResponse {
    fn from(value: RoleSummary) -> Self {
        Self {
            name: value.name.as_str().to_owned(),
            display_name: value.display_name,
            description: value.description,
            is_system: value.is_system,
            permissions: value.permissions.into_iter().map(String::from).collect(),
        }
    }
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role_name: value.role_name.as_str().to_owned(),
            assigned_by: value.assigned_by.map(|actor| actor.to_string()),
            assigned_at: value.assigned_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
