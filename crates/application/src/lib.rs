//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_service;
mod rbac_policy_loader;
mod rbac_ports;
mod role_admin_service;

pub use access_control_service::AccessControlService;
pub use rbac_policy_loader::load_rbac_policy;
pub use rbac_ports::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    CustomRoleRecord, RoleAssignment, RoleAssignmentRepository, RoleDefinitionRepository,
    RoleSummary,
};
pub use role_admin_service::{AUDIT_LOG_MAX_LIMIT, RoleAdminService};
