use axum::Json;
use axum::extract::{Extension, Query, State};
use sanad_application::AuditLogQuery;
use sanad_core::UserIdentity;

use crate::dto::{AuditLogEntryResponse, AuditLogQueryParams};
use crate::error::ApiResult;
use crate::handlers::users::parse_user_id;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(params): Query<AuditLogQueryParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let actor = params
        .actor_id
        .as_deref()
        .map(parse_user_id)
        .transpose()?;

    let entries = state
        .role_admin_service
        .list_audit_log(
            &user,
            AuditLogQuery {
                limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                offset: params.offset.unwrap_or(0),
                action: params.action.filter(|action| !action.trim().is_empty()),
                actor,
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
