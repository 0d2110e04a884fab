use std::collections::BTreeSet;
use std::sync::Arc;

use sanad_core::{AppError, AppResult, UserId};
use sanad_domain::{Permission, PermissionCode, RbacPolicy, RoleName, SystemRole};
use tracing::debug;

use crate::RoleAssignmentRepository;

#[cfg(test)]
mod tests;

/// Application service for permission checks against stored role assignments.
#[derive(Clone)]
pub struct AccessControlService {
    policy: Arc<RbacPolicy>,
    repository: Arc<dyn RoleAssignmentRepository>,
}

impl AccessControlService {
    /// Creates a new service from the process-wide policy and an assignment store.
    #[must_use]
    pub fn new(policy: Arc<RbacPolicy>, repository: Arc<dyn RoleAssignmentRepository>) -> Self {
        Self { policy, repository }
    }

    /// Returns the shared policy.
    #[must_use]
    pub fn policy(&self) -> &RbacPolicy {
        self.policy.as_ref()
    }

    /// Returns the roles currently assigned to a user.
    pub async fn roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleName>> {
        self.repository.list_roles_for_user(user_id).await
    }

    /// Returns whether the user holds the permission through any assigned role.
    pub async fn has_permission(&self, user_id: UserId, permission: Permission) -> AppResult<bool> {
        let roles = self.roles_for_user(user_id).await?;
        Ok(self.policy.has_permission(&roles, permission))
    }

    /// Ensures the user holds the permission.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        permission: Permission,
    ) -> AppResult<()> {
        if self.has_permission(user_id, permission).await? {
            return Ok(());
        }

        debug!(%user_id, permission = permission.as_str(), "permission denied");
        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{}'",
            permission.as_str()
        )))
    }

    /// Ensures the user holds the SUPER_ADMIN role.
    pub async fn require_super_admin(&self, user_id: UserId) -> AppResult<()> {
        let roles = self.roles_for_user(user_id).await?;
        if roles
            .iter()
            .any(|role| role.as_str() == SystemRole::SuperAdmin.as_str())
        {
            return Ok(());
        }

        debug!(%user_id, "super administrator role required");
        Err(AppError::Forbidden(format!(
            "user '{user_id}' must hold role '{}'",
            SystemRole::SuperAdmin.as_str()
        )))
    }

    /// Returns the union of permissions granted by the user's roles.
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<BTreeSet<PermissionCode>> {
        let roles = self.roles_for_user(user_id).await?;
        Ok(self.policy.effective_permissions(&roles))
    }
}
