use std::sync::Arc;

use sanad_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditRepository, PostgresRoleAssignmentRepository,
    PostgresRoleDefinitionRepository,
};
use sqlx::PgPool;

pub(super) struct RepositorySet {
    pub(super) role_assignment_repository: Arc<PostgresRoleAssignmentRepository>,
    pub(super) role_definition_repository: PostgresRoleDefinitionRepository,
    pub(super) audit_repository: Arc<PostgresAuditRepository>,
    pub(super) audit_log_repository: Arc<PostgresAuditLogRepository>,
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    RepositorySet {
        role_assignment_repository: Arc::new(PostgresRoleAssignmentRepository::new(pool.clone())),
        role_definition_repository: PostgresRoleDefinitionRepository::new(pool.clone()),
        audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        audit_log_repository: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
    }
}
