use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use sanad_application::{AuditEvent, RoleAssignment, RoleAssignmentRepository};
use sanad_core::{AppError, AppResult, UserId};
use sanad_domain::RoleName;

use crate::postgres_audit_repository::insert_audit_event;


/// PostgreSQL-backed repository for user-role assignments.
#[derive(Clone)]
pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    user_id: uuid::Uuid,
    role_name: String,
    assigned_by: Option<uuid::Uuid>,
    assigned_at: DateTime<Utc>,
}

impl TryFrom<RoleAssignmentRow> for RoleAssignment {
    type Error = AppError;

    fn try_from(row: RoleAssignmentRow) -> AppResult<Self> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            role_name: stored_role_name(row.role_name)?,
            assigned_by: row.assigned_by.map(UserId::from_uuid),
            assigned_at: row.assigned_at,
        })
    }
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleName>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role_name
            FROM rbac_user_roles
            WHERE user_id = $1
            ORDER BY role_name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user roles: {error}")))?;

        names.into_iter().map(stored_role_name).collect()
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT user_id, role_name, assigned_by, assigned_at
            FROM rbac_user_roles
            WHERE user_id = $1
            ORDER BY role_name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        rows.into_iter().map(RoleAssignment::try_from).collect()
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT user_id, role_name, assigned_by, assigned_at
            FROM rbac_user_roles
            ORDER BY user_id, role_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        rows.into_iter().map(RoleAssignment::try_from).collect()
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        assigned_by: Option<UserId>,
        audit: Option<AuditEvent>,
    ) -> AppResult<bool> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        let rows_affected = sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_name, assigned_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, role_name) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name.as_str())
        .bind(assigned_by.map(|actor| actor.as_uuid()))
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_assignment_error(error, user_id, role_name))?
        .rows_affected();

        let inserted = rows_affected > 0;
        if inserted && let Some(event) = audit {
            insert_audit_event(&mut *transaction, &event).await?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

        Ok(inserted)
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_name: &RoleName,
        audit: Option<AuditEvent>,
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE user_id = $1 AND role_name = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role assignment: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_name}' was not found"
            )));
        }

        if let Some(event) = audit {
            insert_audit_event(&mut *transaction, &event).await?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
    }
}

fn stored_role_name(value: String) -> AppResult<RoleName> {
    RoleName::new(value.as_str()).map_err(|error| {
        AppError::Internal(format!("invalid stored role name '{value}': {error}"))
    })
}

fn map_assignment_error(error: sqlx::Error, user_id: UserId, role_name: &RoleName) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!(
            "user '{user_id}' or role '{role_name}' was not found"
        ));
    }

    AppError::Internal(format!("failed to assign role: {error}"))
}
