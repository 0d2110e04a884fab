use std::sync::Arc;

use sanad_application::RoleAssignmentRepository;
use sanad_core::{UserId, UserIdentity};
use sanad_domain::{RbacPolicy, RoleName, SystemRole};
use sanad_infrastructure::{InMemoryAuditRepository, InMemoryRoleAssignmentRepository};

use crate::state::AppState;

/// Builds in-memory state and a signed-in actor holding `roles`.
pub(crate) async fn state_with_actor(roles: &[SystemRole]) -> (AppState, UserIdentity) {
    let audit = Arc::new(InMemoryAuditRepository::new());
    let assignments = Arc::new(InMemoryRoleAssignmentRepository::with_audit(audit.clone()));
    let actor = UserIdentity::new(UserId::new(), "Test Actor", None);

    for role in roles {
        let seeded = assignments
            .assign_role(actor.user_id(), &RoleName::from(*role), None, None)
            .await;
        assert!(matches!(seeded, Ok(true)));
    }

    let state = AppState::new(
        Arc::new(RbacPolicy::builtin()),
        assignments,
        audit.clone(),
        audit,
        "http://localhost:3000".to_owned(),
    );

    (state, actor)
}
