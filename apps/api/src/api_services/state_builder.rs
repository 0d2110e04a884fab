use std::sync::Arc;

use sanad_application::load_rbac_policy;
use sanad_core::AppError;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod repositories;

pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let repositories = repositories::build_repository_set(&pool);
    let policy = load_rbac_policy(&repositories.role_definition_repository).await?;

    Ok(AppState::new(
        Arc::new(policy),
        repositories.role_assignment_repository,
        repositories.audit_log_repository,
        repositories.audit_repository,
        config.frontend_url.clone(),
    ))
}
