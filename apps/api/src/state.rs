use std::sync::Arc;

use sanad_application::{
    AccessControlService, AuditLogRepository, AuditRepository, RoleAdminService,
    RoleAssignmentRepository,
};
use sanad_domain::RbacPolicy;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_control_service: AccessControlService,
    pub role_admin_service: RoleAdminService,
    pub frontend_url: String,
}

impl AppState {
    /// Wires the services over one policy and one set of ports.
    pub fn new(
        policy: Arc<RbacPolicy>,
        role_assignment_repository: Arc<dyn RoleAssignmentRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        frontend_url: String,
    ) -> Self {
        let access_control_service =
            AccessControlService::new(policy, role_assignment_repository.clone());
        let role_admin_service = RoleAdminService::new(
            access_control_service.clone(),
            role_assignment_repository,
            audit_log_repository,
            audit_repository,
        );

        Self {
            access_control_service,
            role_admin_service,
            frontend_url,
        }
    }
}
