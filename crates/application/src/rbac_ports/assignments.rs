use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sanad_core::{AppResult, UserId};
use sanad_domain::RoleName;

use super::AuditEvent;

/// Grant of one role to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Granted role.
    pub role_name: RoleName,
    /// Administrator who granted the role, absent for seed-time grants.
    pub assigned_by: Option<UserId>,
    /// Grant timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Repository port for user-role assignments.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Lists the names of every role assigned to a user.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleName>>;

    /// Lists the assignment rows of one user.
    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Lists every assignment ordered by user, then role name.
    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>>;

    /// Grants a role to a user.
    ///
    /// Returns `false` when the user already held the role. `audit` is written
    /// in the same unit of work as the grant and only when a row was added.
    async fn assign_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        assigned_by: Option<UserId>,
        audit: Option<AuditEvent>,
    ) -> AppResult<bool>;

    /// Revokes a role from a user, failing with `NotFound` if it was not held.
    ///
    /// `audit` commits or fails together with the removal.
    async fn revoke_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        audit: Option<AuditEvent>,
    ) -> AppResult<()>;
}
