use std::sync::Arc;

use sanad_core::{AppResult, UserId, UserIdentity};
use sanad_domain::{
    AuditAction, Permission, PermissionCategory, PermissionCode, PermissionDefinition, SystemRole,
};
use tracing::{debug, info};

use crate::{
    AccessControlService, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, RoleAssignment, RoleAssignmentRepository, RoleSummary,
};

#[cfg(test)]
mod tests;

/// Upper bound on audit rows returned per page.
pub const AUDIT_LOG_MAX_LIMIT: usize = 200;

/// Application service behind the role administration screens.
#[derive(Clone)]
pub struct RoleAdminService {
    access_control: AccessControlService,
    repository: Arc<dyn RoleAssignmentRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_control: AccessControlService,
        repository: Arc<dyn RoleAssignmentRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_control,
            repository,
            audit_log_repository,
            audit_repository,
        }
    }

    /// Lists the permission catalog for role editing screens.
    pub async fn list_permissions(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.access_control
            .require_permission(actor.user_id(), Permission::SettingsView)
            .await?;

        Ok(self
            .access_control
            .policy()
            .list_permissions()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Returns catalog metadata for one permission code.
    pub async fn get_permission_metadata(
        &self,
        actor: &UserIdentity,
        code: &str,
    ) -> AppResult<PermissionDefinition> {
        self.access_control
            .require_permission(actor.user_id(), Permission::SettingsView)
            .await?;

        self.access_control
            .policy()
            .get_permission_metadata(code)
            .cloned()
    }

    /// Expands a category into explicit codes and records the expansion.
    pub async fn expand_category(
        &self,
        actor: &UserIdentity,
        category: PermissionCategory,
    ) -> AppResult<Vec<PermissionCode>> {
        self.access_control
            .require_permission(actor.user_id(), Permission::SettingsView)
            .await?;

        let codes = self
            .access_control
            .policy()
            .catalog()
            .expand_category(category);

        let listed = codes
            .iter()
            .map(PermissionCode::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id(),
                action: AuditAction::CategoryExpanded,
                resource_type: "rbac_permission_category".to_owned(),
                resource_id: category.as_str().to_owned(),
                detail: Some(format!(
                    "expanded category '{}' into [{listed}]",
                    category.as_str()
                )),
            })
            .await?;

        Ok(codes)
    }

    /// Lists roles with their grants resolved against the live catalog.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<RoleSummary>> {
        self.access_control
            .require_permission(actor.user_id(), Permission::SettingsView)
            .await?;

        let policy = self.access_control.policy();
        Ok(policy
            .roles()
            .list_roles()
            .into_iter()
            .map(|role| RoleSummary {
                name: role.name().clone(),
                display_name: role.display_name().to_owned(),
                description: role.description().to_owned(),
                is_system: role.is_system(),
                permissions: role.grants().resolve(policy.catalog()),
            })
            .collect())
    }

    /// Returns one role with its resolved grants.
    pub async fn get_role_permissions(
        &self,
        actor: &UserIdentity,
        role_name: &str,
    ) -> AppResult<RoleSummary> {
        self.access_control
            .require_permission(actor.user_id(), Permission::SettingsView)
            .await?;

        let policy = self.access_control.policy();
        let role = policy.roles().get(role_name)?;

        Ok(RoleSummary {
            name: role.name().clone(),
            display_name: role.display_name().to_owned(),
            description: role.description().to_owned(),
            is_system: role.is_system(),
            permissions: policy.get_role_permissions(role_name)?,
        })
    }

    /// Lists role assignments of one user.
    ///
    /// Users may always read their own assignments.
    pub async fn list_user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        if actor.user_id() != user_id {
            self.access_control
                .require_permission(actor.user_id(), Permission::UsersView)
                .await?;
        }

        self.repository.list_assignments_for_user(user_id).await
    }

    /// Lists every role assignment.
    pub async fn list_role_assignments(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.access_control
            .require_permission(actor.user_id(), Permission::UsersView)
            .await?;

        self.repository.list_assignments().await
    }

    /// Grants a role to a user and emits an audit event.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.access_control
            .require_permission(actor.user_id(), Permission::UsersManageRoles)
            .await?;

        let role_name = self
            .access_control
            .policy()
            .roles()
            .get(role_name)?
            .name()
            .clone();

        if role_name.as_str() == SystemRole::SuperAdmin.as_str() {
            self.access_control
                .require_super_admin(actor.user_id())
                .await?;
        }

        let event = AuditEvent {
            actor: actor.user_id(),
            action: AuditAction::RoleAssigned,
            resource_type: "rbac_user_role".to_owned(),
            resource_id: format!("{user_id}:{role_name}"),
            detail: Some(format!("assigned role '{role_name}' to '{user_id}'")),
        };
        let inserted = self
            .repository
            .assign_role(user_id, &role_name, Some(actor.user_id()), Some(event))
            .await?;

        if inserted {
            info!(%user_id, role = %role_name, assigned_by = %actor.user_id(), "role assigned");
        } else {
            debug!(%user_id, role = %role_name, "role already assigned");
        }
        Ok(())
    }

    /// Revokes a role from a user and emits an audit event.
    pub async fn revoke_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.access_control
            .require_permission(actor.user_id(), Permission::UsersManageRoles)
            .await?;

        let role_name = self
            .access_control
            .policy()
            .roles()
            .get(role_name)?
            .name()
            .clone();

        if role_name.as_str() == SystemRole::SuperAdmin.as_str() {
            self.access_control
                .require_super_admin(actor.user_id())
                .await?;
        }

        let event = AuditEvent {
            actor: actor.user_id(),
            action: AuditAction::RoleRevoked,
            resource_type: "rbac_user_role".to_owned(),
            resource_id: format!("{user_id}:{role_name}"),
            detail: Some(format!("removed role '{role_name}' from '{user_id}'")),
        };
        self.repository
            .revoke_role(user_id, &role_name, Some(event))
            .await?;

        info!(%user_id, role = %role_name, revoked_by = %actor.user_id(), "role revoked");
        Ok(())
    }

    /// Returns recent audit entries.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.access_control
            .require_permission(actor.user_id(), Permission::AuditView)
            .await?;

        self.audit_log_repository
            .list_recent_entries(AuditLogQuery {
                limit: query.limit.clamp(1, AUDIT_LOG_MAX_LIMIT),
                ..query
            })
            .await
    }
}
