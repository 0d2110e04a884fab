use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sanad_core::{AppError, AppResult, UserId, UserIdentity};
use sanad_domain::{
    AuditAction, Permission, PermissionCategory, PermissionCode, RbacPolicy, RoleDefinition,
    RoleName,
};
use tokio::sync::Mutex;

use crate::{
    AccessControlService, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, RoleAssignment, RoleAssignmentRepository,
};

use super::{AUDIT_LOG_MAX_LIMIT, RoleAdminService};

struct FakeRoleAssignmentRepository {
    assignments: Mutex<HashMap<UserId, Vec<RoleAssignment>>>,
    audit: Arc<FakeAuditRepository>,
    audit_unavailable: Mutex<bool>,
}

impl FakeRoleAssignmentRepository {
    fn new(audit: Arc<FakeAuditRepository>) -> Self {
        Self {
            assignments: Mutex::new(HashMap::new()),
            audit,
            audit_unavailable: Mutex::new(false),
        }
    }

    async fn record(&self, audit: Option<AuditEvent>) -> AppResult<()> {
        let Some(event) = audit else {
            return Ok(());
        };
        if *self.audit_unavailable.lock().await {
            return Err(AppError::Internal("audit log unavailable".to_owned()));
        }
        self.audit.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl RoleAssignmentRepository for FakeRoleAssignmentRepository {
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleName>> {
        Ok(self
            .list_assignments_for_user(user_id)
            .await?
            .into_iter()
            .map(|assignment| assignment.role_name)
            .collect())
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .values()
            .flatten()
            .cloned()
            .collect())
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        assigned_by: Option<UserId>,
        audit: Option<AuditEvent>,
    ) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        let held = assignments.entry(user_id).or_default();
        if held.iter().any(|assignment| &assignment.role_name == role_name) {
            return Ok(false);
        }
        self.record(audit).await?;
        held.push(RoleAssignment {
            user_id,
            role_name: role_name.clone(),
            assigned_by,
            assigned_at: Utc::now(),
        });
        Ok(true)
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        audit: Option<AuditEvent>,
    ) -> AppResult<()> {
        let mut assignments = self.assignments.lock().await;
        let held = assignments.entry(user_id).or_default();
        if !held.iter().any(|assignment| &assignment.role_name == role_name) {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_name}' was not found"
            )));
        }
        self.record(audit).await?;
        held.retain(|assignment| &assignment.role_name != role_name);
        Ok(())
    }
}

#[derive(Default)]
struct FakeAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
    last_query: Mutex<Option<AuditLogQuery>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeAuditRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        *self.last_query.lock().await = Some(query);
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .rev()
            .enumerate()
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                actor: event.actor,
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: Utc::now(),
            })
            .collect())
    }
}

struct Fixture {
    service: RoleAdminService,
    assignments: Arc<FakeRoleAssignmentRepository>,
    audit: Arc<FakeAuditRepository>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_policy(RbacPolicy::builtin())
    }

    fn with_role_manager() -> Self {
        let role_name = match RoleName::new("ROLE_MANAGER") {
            Ok(role_name) => role_name,
            Err(error) => panic!("role name must be valid: {error}"),
        };
        let policy = RoleDefinition::custom(
            role_name,
            "Role manager",
            "Assigns roles without holding every permission",
            [
                PermissionCode::from(Permission::UsersView),
                PermissionCode::from(Permission::UsersManageRoles),
            ],
        )
        .and_then(|definition| RbacPolicy::builtin().with_custom_role(definition));

        match policy {
            Ok(policy) => Self::with_policy(policy),
            Err(error) => panic!("role manager policy must build: {error}"),
        }
    }

    fn with_policy(policy: RbacPolicy) -> Self {
        let audit = Arc::new(FakeAuditRepository::default());
        let assignments = Arc::new(FakeRoleAssignmentRepository::new(audit.clone()));
        let access_control = AccessControlService::new(Arc::new(policy), assignments.clone());
        let service = RoleAdminService::new(
            access_control,
            assignments.clone(),
            audit.clone(),
            audit.clone(),
        );

        Self {
            service,
            assignments,
            audit,
        }
    }

    async fn actor_with_role(&self, role: &str) -> UserIdentity {
        let actor = UserIdentity::new(UserId::new(), format!("{role} actor"), None);
        let role_name = RoleName::new(role);
        assert!(role_name.is_ok());
        if let Ok(role_name) = role_name {
            let seeded = self
                .assignments
                .assign_role(actor.user_id(), &role_name, None, None)
                .await;
            assert!(matches!(seeded, Ok(true)));
        }
        actor
    }
}

#[tokio::test]
async fn super_admin_assigns_role_and_emits_audit_event() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("SUPER_ADMIN").await;
    let target = UserId::new();

    let result = fixture.service.assign_role(&actor, target, "STAFF").await;
    assert!(result.is_ok());

    let roles = fixture.assignments.list_roles_for_user(target).await;
    assert_eq!(
        roles
            .unwrap_or_default()
            .iter()
            .map(RoleName::as_str)
            .collect::<Vec<_>>(),
        vec!["STAFF"]
    );

    let events = fixture.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::RoleAssigned);
    assert_eq!(events[0].resource_id, format!("{target}:STAFF"));
}

#[tokio::test]
async fn repeated_assignment_is_idempotent_and_not_audited_twice() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("SUPER_ADMIN").await;
    let target = UserId::new();

    assert!(fixture.service.assign_role(&actor, target, "CUSTOMER").await.is_ok());
    assert!(fixture.service.assign_role(&actor, target, "CUSTOMER").await.is_ok());

    assert_eq!(fixture.audit.events.lock().await.len(), 1);
}

#[tokio::test]
async fn admin_cannot_manage_roles() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("ADMIN").await;

    let result = fixture
        .service
        .assign_role(&actor, UserId::new(), "CUSTOMER")
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(fixture.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn failed_audit_write_leaves_grant_and_revoke_unapplied() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("SUPER_ADMIN").await;
    let target = UserId::new();
    assert!(fixture.service.assign_role(&actor, target, "STAFF").await.is_ok());
    *fixture.assignments.audit_unavailable.lock().await = true;

    let assigned = fixture.service.assign_role(&actor, target, "ADMIN").await;
    assert!(matches!(assigned, Err(AppError::Internal(_))));

    let revoked = fixture.service.revoke_role(&actor, target, "STAFF").await;
    assert!(matches!(revoked, Err(AppError::Internal(_))));

    let roles = fixture.assignments.list_roles_for_user(target).await;
    assert_eq!(
        roles
            .unwrap_or_default()
            .iter()
            .map(RoleName::as_str)
            .collect::<Vec<_>>(),
        vec!["STAFF"]
    );
    assert_eq!(fixture.audit.events.lock().await.len(), 1);
}

#[tokio::test]
async fn role_manager_cannot_grant_super_admin() {
    let fixture = Fixture::with_role_manager();
    let actor = fixture.actor_with_role("ROLE_MANAGER").await;
    let target = UserId::new();

    let result = fixture
        .service
        .assign_role(&actor, target, "SUPER_ADMIN")
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let roles = fixture.assignments.list_roles_for_user(target).await;
    assert!(roles.unwrap_or_default().is_empty());
    assert!(fixture.audit.events.lock().await.is_empty());

    let allowed = fixture.service.assign_role(&actor, target, "ADMIN").await;
    assert!(allowed.is_ok());
    assert_eq!(fixture.audit.events.lock().await.len(), 1);
}

#[tokio::test]
async fn role_manager_cannot_revoke_super_admin() {
    let fixture = Fixture::with_role_manager();
    let actor = fixture.actor_with_role("ROLE_MANAGER").await;
    let super_admin = fixture.actor_with_role("SUPER_ADMIN").await;

    let result = fixture
        .service
        .revoke_role(&actor, super_admin.user_id(), "SUPER_ADMIN")
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let roles = fixture
        .assignments
        .list_roles_for_user(super_admin.user_id())
        .await;
    assert_eq!(
        roles
            .unwrap_or_default()
            .iter()
            .map(RoleName::as_str)
            .collect::<Vec<_>>(),
        vec!["SUPER_ADMIN"]
    );
    assert!(fixture.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn assigning_unknown_role_is_not_found() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("SUPER_ADMIN").await;

    let result = fixture
        .service
        .assign_role(&actor, UserId::new(), "ACCOUNTANT")
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn revoke_removes_role_and_audits() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("SUPER_ADMIN").await;
    let target = UserId::new();
    assert!(fixture.service.assign_role(&actor, target, "STAFF").await.is_ok());

    let result = fixture.service.revoke_role(&actor, target, "STAFF").await;
    assert!(result.is_ok());

    let remaining = fixture.assignments.list_roles_for_user(target).await;
    assert!(remaining.unwrap_or_default().is_empty());

    let events = fixture.audit.events.lock().await;
    assert_eq!(events.last().map(|event| event.action), Some(AuditAction::RoleRevoked));
}

#[tokio::test]
async fn revoking_role_not_held_is_not_found() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("SUPER_ADMIN").await;

    let result = fixture
        .service
        .revoke_role(&actor, UserId::new(), "STAFF")
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn user_may_list_own_roles_without_users_view() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("CUSTOMER").await;

    let own = fixture.service.list_user_roles(&actor, actor.user_id()).await;
    assert_eq!(own.map(|roles| roles.len()).ok(), Some(1));

    let other = fixture.service.list_user_roles(&actor, UserId::new()).await;
    assert!(matches!(other, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn staff_can_list_assignments_of_others() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("STAFF").await;

    let result = fixture.service.list_role_assignments(&actor).await;
    assert_eq!(result.map(|assignments| assignments.len()).ok(), Some(1));
}

#[tokio::test]
async fn role_listing_resolves_super_admin_against_catalog() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("ADMIN").await;

    let roles = fixture.service.list_roles(&actor).await.unwrap_or_default();
    let names = roles
        .iter()
        .map(|role| role.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["SUPER_ADMIN", "ADMIN", "STAFF", "CUSTOMER"]);

    let catalog_size = fixture
        .service
        .list_permissions(&actor)
        .await
        .map(|permissions| permissions.len())
        .unwrap_or_default();
    assert_eq!(roles[0].permissions.len(), catalog_size);
    assert!(roles.iter().all(|role| role.is_system));
}

#[tokio::test]
async fn customer_cannot_read_role_catalog() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("CUSTOMER").await;

    let result = fixture.service.list_permissions(&actor).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn unknown_permission_metadata_is_not_found() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("ADMIN").await;

    let known = fixture
        .service
        .get_permission_metadata(&actor, "services.update")
        .await;
    assert!(known.is_ok());

    let unknown = fixture
        .service
        .get_permission_metadata(&actor, "services.edit")
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn expanding_category_returns_codes_and_audits() {
    let fixture = Fixture::new();
    let actor = fixture.actor_with_role("ADMIN").await;

    let codes = fixture
        .service
        .expand_category(&actor, PermissionCategory::Ai)
        .await
        .unwrap_or_default();
    assert_eq!(
        codes.iter().map(|code| code.as_str()).collect::<Vec<_>>(),
        vec!["ai.chat", "ai.document_generator", "ai.resume_builder"]
    );

    let events = fixture.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::CategoryExpanded);
    assert_eq!(events[0].resource_id, "ai");
}

#[tokio::test]
async fn audit_log_requires_audit_view_and_clamps_limit() {
    let fixture = Fixture::new();
    let staff = fixture.actor_with_role("STAFF").await;
    let admin = fixture.actor_with_role("ADMIN").await;
    let query = AuditLogQuery {
        limit: 10_000,
        offset: 0,
        action: None,
        actor: None,
    };

    let denied = fixture.service.list_audit_log(&staff, query.clone()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let allowed = fixture.service.list_audit_log(&admin, query).await;
    assert!(allowed.is_ok());
    let recorded = fixture.audit.last_query.lock().await.clone();
    assert_eq!(recorded.map(|query| query.limit), Some(AUDIT_LOG_MAX_LIMIT));
}
