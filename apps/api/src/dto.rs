use serde::Serialize;
use ts_rs::TS;

mod audit;
mod rbac;

pub use audit::{AuditLogEntryResponse, AuditLogQueryParams};
pub use rbac::{
    AssignRoleRequest, CategoryPermissionsResponse, EffectivePermissionsResponse,
    PermissionResponse, RoleAssignmentResponse, RoleResponse,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
