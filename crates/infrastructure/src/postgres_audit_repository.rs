use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};

use sanad_application::{AuditEvent, AuditRepository};
use sanad_core::{AppError, AppResult};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        insert_audit_event(&self.pool, &event).await
    }
}

/// Writes one audit row through a pool or an open transaction.
pub(crate) async fn insert_audit_event<'e, E>(executor: E, event: &AuditEvent) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO audit_log_entries (
            actor_id,
            action,
            resource_type,
            resource_id,
            detail
        )
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(event.actor.as_uuid())
    .bind(event.action.as_str())
    .bind(event.resource_type.as_str())
    .bind(event.resource_id.as_str())
    .bind(event.detail.as_deref())
    .execute(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

    Ok(())
}
