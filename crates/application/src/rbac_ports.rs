mod assignments;
mod audit;
mod roles;

pub use assignments::{RoleAssignment, RoleAssignmentRepository};
pub use audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
pub use roles::{CustomRoleRecord, RoleDefinitionRepository, RoleSummary};
