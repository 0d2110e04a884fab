use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sanad_application::{AuditEvent, RoleAssignment, RoleAssignmentRepository};
use sanad_core::{AppError, AppResult, UserId};
use sanad_domain::RoleName;
use tokio::sync::RwLock;

use crate::InMemoryAuditRepository;

/// In-memory role assignment store for tests and local runs.
///
/// Audit events reach the linked audit log while the assignment lock is held.
/// Without one they are discarded.
#[derive(Debug, Default)]
pub struct InMemoryRoleAssignmentRepository {
    assignments: RwLock<BTreeMap<(UserId, RoleName), RoleAssignment>>,
    audit: Option<Arc<InMemoryAuditRepository>>,
}

impl InMemoryRoleAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository that records audit events into `audit`.
    #[must_use]
    pub fn with_audit(audit: Arc<InMemoryAuditRepository>) -> Self {
        Self {
            assignments: RwLock::default(),
            audit: Some(audit),
        }
    }

    async fn record(&self, event: Option<AuditEvent>) {
        if let (Some(audit), Some(event)) = (&self.audit, event) {
            audit.record(event).await;
        }
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryRoleAssignmentRepository {
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleName>> {
        let assignments = self.assignments.read().await;

        Ok(assignments
            .keys()
            .filter(|(stored_user_id, _)| *stored_user_id == user_id)
            .map(|(_, role_name)| role_name.clone())
            .collect())
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let assignments = self.assignments.read().await;

        Ok(assignments
            .values()
            .filter(|assignment| assignment.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        Ok(self.assignments.read().await.values().cloned().collect())
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        assigned_by: Option<UserId>,
        audit: Option<AuditEvent>,
    ) -> AppResult<bool> {
        let key = (user_id, role_name.clone());
        let mut assignments = self.assignments.write().await;

        if assignments.contains_key(&key) {
            return Ok(false);
        }

        assignments.insert(
            key,
            RoleAssignment {
                user_id,
                role_name: role_name.clone(),
                assigned_by,
                assigned_at: Utc::now(),
            },
        );
        self.record(audit).await;
        Ok(true)
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        audit: Option<AuditEvent>,
    ) -> AppResult<()> {
        let key = (user_id, role_name.clone());
        let mut assignments = self.assignments.write().await;

        if assignments.remove(&key).is_none() {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_name}' was not found"
            )));
        }

        self.record(audit).await;
        Ok(())
    }
}
