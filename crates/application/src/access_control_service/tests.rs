use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sanad_core::{AppError, AppResult, UserId};
use sanad_domain::{Permission, RbacPolicy, RoleName, SystemRole};
use tokio::sync::Mutex;

use crate::{AuditEvent, RoleAssignment, RoleAssignmentRepository};

use super::AccessControlService;

#[derive(Default)]
struct FakeRoleAssignmentRepository {
    roles: Mutex<HashMap<UserId, Vec<RoleName>>>,
}

impl FakeRoleAssignmentRepository {
    fn with_roles(user_id: UserId, roles: &[&str]) -> Self {
        let roles = roles
            .iter()
            .filter_map(|role| RoleName::new(*role).ok())
            .collect();
        Self {
            roles: Mutex::new(HashMap::from([(user_id, roles)])),
        }
    }
}

#[async_trait]
impl RoleAssignmentRepository for FakeRoleAssignmentRepository {
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleName>> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .list_roles_for_user(user_id)
            .await?
            .into_iter()
            .map(|role_name| RoleAssignment {
                user_id,
                role_name,
                assigned_by: None,
                assigned_at: Utc::now(),
            })
            .collect())
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        Ok(Vec::new())
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        _assigned_by: Option<UserId>,
        _audit: Option<AuditEvent>,
    ) -> AppResult<bool> {
        let mut roles = self.roles.lock().await;
        let held = roles.entry(user_id).or_default();
        if held.contains(role_name) {
            return Ok(false);
        }
        held.push(role_name.clone());
        Ok(true)
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        _audit: Option<AuditEvent>,
    ) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let held = roles.entry(user_id).or_default();
        let before = held.len();
        held.retain(|role| role != role_name);
        if held.len() == before {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_name}' was not found"
            )));
        }
        Ok(())
    }
}

struct FailingRoleAssignmentRepository;

#[async_trait]
impl RoleAssignmentRepository for FailingRoleAssignmentRepository {
    async fn list_roles_for_user(&self, _user_id: UserId) -> AppResult<Vec<RoleName>> {
        Err(AppError::Internal("database unavailable".to_owned()))
    }

    async fn list_assignments_for_user(&self, _user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        Err(AppError::Internal("database unavailable".to_owned()))
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        Err(AppError::Internal("database unavailable".to_owned()))
    }

    async fn assign_role(
        &self,
        _user_id: UserId,
        _role_name: &RoleName,
        _assigned_by: Option<UserId>,
        _audit: Option<AuditEvent>,
    ) -> AppResult<bool> {
        Err(AppError::Internal("database unavailable".to_owned()))
    }

    async fn revoke_role(
        &self,
        _user_id: UserId,
        _role_name: &RoleName,
        _audit: Option<AuditEvent>,
    ) -> AppResult<()> {
        Err(AppError::Internal("database unavailable".to_owned()))
    }
}

fn service_with_roles(user_id: UserId, roles: &[&str]) -> AccessControlService {
    AccessControlService::new(
        Arc::new(RbacPolicy::builtin()),
        Arc::new(FakeRoleAssignmentRepository::with_roles(user_id, roles)),
    )
}

#[tokio::test]
async fn require_permission_allows_granted_user() {
    let user_id = UserId::new();
    let service = service_with_roles(user_id, &["STAFF"]);

    let result = service
        .require_permission(user_id, Permission::RequestsViewAll)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn require_permission_denies_missing_grant() {
    let user_id = UserId::new();
    let service = service_with_roles(user_id, &["CUSTOMER"]);

    let result = service
        .require_permission(user_id, Permission::RequestsViewAll)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn user_without_roles_has_no_access() {
    let service = service_with_roles(UserId::new(), &["SUPER_ADMIN"]);

    let result = service
        .has_permission(UserId::new(), Permission::ServicesView)
        .await;
    assert!(matches!(result, Ok(false)));
}

#[tokio::test]
async fn assigned_roles_are_unioned() {
    let user_id = UserId::new();
    let service = service_with_roles(user_id, &["STAFF", "CUSTOMER"]);

    let can_create = service
        .has_permission(user_id, Permission::RequestsCreate)
        .await;
    let can_view_all = service
        .has_permission(user_id, Permission::RequestsViewAll)
        .await;
    let can_manage_billing = service
        .has_permission(user_id, Permission::BillingManage)
        .await;

    assert!(matches!(can_create, Ok(true)));
    assert!(matches!(can_view_all, Ok(true)));
    assert!(matches!(can_manage_billing, Ok(false)));
}

#[tokio::test]
async fn effective_permissions_for_super_admin_cover_catalog() {
    let user_id = UserId::new();
    let service = service_with_roles(user_id, &["SUPER_ADMIN"]);

    let permissions = service.effective_permissions(user_id).await;
    assert_eq!(
        permissions.map(|permissions| permissions.len()).ok(),
        Some(Permission::all().len())
    );
}

#[tokio::test]
async fn require_super_admin_rejects_admin() {
    let user_id = UserId::new();
    let service = service_with_roles(user_id, &["ADMIN"]);

    let result = service.require_super_admin(user_id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let super_admin = UserId::new();
    let service = service_with_roles(super_admin, &[SystemRole::SuperAdmin.as_str()]);
    assert!(service.require_super_admin(super_admin).await.is_ok());
}

#[tokio::test]
async fn storage_failures_propagate_instead_of_granting() {
    let service = AccessControlService::new(
        Arc::new(RbacPolicy::builtin()),
        Arc::new(FailingRoleAssignmentRepository),
    );

    let result = service
        .has_permission(UserId::new(), Permission::ServicesView)
        .await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}
