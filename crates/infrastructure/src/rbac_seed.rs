use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use sanad_application::AuditEvent;
use sanad_core::{AppError, AppResult, UserIdentity};
use sanad_domain::{
    AuditAction, PermissionDefinition, RbacPolicy, RoleDefinition, RoleGrants, SystemRole,
};

use crate::postgres_audit_repository::insert_audit_event;

/// Writes the permission catalog and system roles to the database.
///
/// Safe to run on every start. System role grant rows are replaced with the
/// enumerated lists; SUPER_ADMIN keeps no rows at all.
pub async fn seed_rbac(pool: &PgPool, policy: &RbacPolicy) -> AppResult<()> {
    let mut transaction = pool
        .begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

    for definition in policy.list_permissions() {
        upsert_permission(&mut transaction, definition).await?;
    }

    let system_roles = policy
        .roles()
        .list_roles()
        .into_iter()
        .filter(|role| role.is_system())
        .collect::<Vec<_>>();

    for role in &system_roles {
        upsert_role(&mut transaction, role).await?;
        replace_role_grants(&mut transaction, role).await?;
    }

    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

    info!(
        permissions = policy.catalog().len(),
        roles = system_roles.len(),
        "rbac catalog seeded"
    );
    Ok(())
}

/// Grants SUPER_ADMIN to the operator account named at deployment.
///
/// Creates the user row when missing and leaves an existing one untouched.
/// The assignment has no `assigned_by`. Returns whether a new assignment was
/// written; only then is an audit entry appended.
pub async fn bootstrap_super_admin(pool: &PgPool, operator: &UserIdentity) -> AppResult<bool> {
    let user_id = operator.user_id();
    let role_name = SystemRole::SuperAdmin.as_str();
    let mut transaction = pool
        .begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

    sqlx::query(
        r#"
        INSERT INTO users (id, display_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(operator.display_name())
    .bind(operator.email())
    .execute(&mut *transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to create bootstrap user '{user_id}': {error}"))
    })?;

    let rows_affected = sqlx::query(
        r#"
        INSERT INTO rbac_user_roles (user_id, role_name, assigned_by)
        VALUES ($1, $2, NULL)
        ON CONFLICT (user_id, role_name) DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(role_name)
    .execute(&mut *transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to grant bootstrap role to '{user_id}': {error}"))
    })?
    .rows_affected();

    let inserted = rows_affected > 0;
    if inserted {
        let event = AuditEvent {
            actor: user_id,
            action: AuditAction::RoleAssigned,
            resource_type: "rbac_user_role".to_owned(),
            resource_id: format!("{user_id}:{role_name}"),
            detail: Some(format!("bootstrapped role '{role_name}' for '{user_id}'")),
        };
        insert_audit_event(&mut *transaction, &event).await?;
    }

    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

    if inserted {
        info!(%user_id, role = role_name, "bootstrap super administrator granted");
    }
    Ok(inserted)
}

async fn upsert_permission(
    transaction: &mut Transaction<'_, Postgres>,
    definition: &PermissionDefinition,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO rbac_permissions (code, category, display_name, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (code) DO UPDATE
        SET category = EXCLUDED.category,
            display_name = EXCLUDED.display_name,
            description = EXCLUDED.description
        "#,
    )
    .bind(definition.code().as_str())
    .bind(definition.category().as_str())
    .bind(definition.display_name())
    .bind(definition.description())
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to seed permission '{}': {error}",
            definition.code()
        ))
    })?;

    Ok(())
}

async fn upsert_role(
    transaction: &mut Transaction<'_, Postgres>,
    role: &RoleDefinition,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO rbac_roles (name, display_name, description, is_system)
        VALUES ($1, $2, $3, true)
        ON CONFLICT (name) DO UPDATE
        SET display_name = EXCLUDED.display_name,
            description = EXCLUDED.description,
            is_system = true
        "#,
    )
    .bind(role.name().as_str())
    .bind(role.display_name())
    .bind(role.description())
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to seed role '{}': {error}", role.name()))
    })?;

    Ok(())
}

async fn replace_role_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role: &RoleDefinition,
) -> AppResult<()> {
    let codes = match role.grants() {
        RoleGrants::AllPermissions => Vec::new(),
        RoleGrants::Explicit(codes) => codes
            .iter()
            .map(|code| code.as_str().to_owned())
            .collect::<Vec<_>>(),
    };

    sqlx::query(
        r#"
        DELETE FROM rbac_role_permissions
        WHERE role_name = $1
            AND NOT (permission_code = ANY($2))
        "#,
    )
    .bind(role.name().as_str())
    .bind(codes.as_slice())
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to prune grants of role '{}': {error}",
            role.name()
        ))
    })?;

    for code in &codes {
        sqlx::query(
            r#"
            INSERT INTO rbac_role_permissions (role_name, permission_code)
            VALUES ($1, $2)
            ON CONFLICT (role_name, permission_code) DO NOTHING
            "#,
        )
        .bind(role.name().as_str())
        .bind(code)
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to seed role grant: {error}")))?;
    }

    Ok(())
}
