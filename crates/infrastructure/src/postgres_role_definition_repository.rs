use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use sanad_application::{CustomRoleRecord, RoleDefinitionRepository};
use sanad_core::{AppError, AppResult};

/// PostgreSQL-backed loader for administrator-defined roles.
#[derive(Clone)]
pub struct PostgresRoleDefinitionRepository {
    pool: PgPool,
}

impl PostgresRoleDefinitionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CustomRoleRow {
    role_name: String,
    display_name: String,
    description: String,
    permission_code: Option<String>,
}

#[async_trait]
impl RoleDefinitionRepository for PostgresRoleDefinitionRepository {
    async fn list_custom_roles(&self) -> AppResult<Vec<CustomRoleRecord>> {
        let rows = sqlx::query_as::<_, CustomRoleRow>(
            r#"
            SELECT
                roles.name AS role_name,
                roles.display_name,
                roles.description,
                grants.permission_code
            FROM rbac_roles AS roles
            LEFT JOIN rbac_role_permissions AS grants
                ON grants.role_name = roles.name
            WHERE roles.is_system = false
            ORDER BY roles.name, grants.permission_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list custom roles: {error}")))?;

        Ok(aggregate_roles(rows))
    }
}

fn aggregate_roles(rows: Vec<CustomRoleRow>) -> Vec<CustomRoleRecord> {
    let mut roles: Vec<CustomRoleRecord> = Vec::new();

    for row in rows {
        let starts_new_role = roles
            .last()
            .is_none_or(|role| role.name != row.role_name);
        if starts_new_role {
            roles.push(CustomRoleRecord {
                name: row.role_name,
                display_name: row.display_name,
                description: row.description,
                permissions: Vec::new(),
            });
        }

        if let (Some(role), Some(code)) = (roles.last_mut(), row.permission_code) {
            role.permissions.push(code);
        }
    }

    roles
}
