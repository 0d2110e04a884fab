use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sanad_core::{AppError, UserId, UserIdentity};

use crate::dto::{AssignRoleRequest, RoleAssignmentResponse};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let user_id = parse_user_id(user_id.as_str())?;
    let assignments = state
        .role_admin_service
        .list_user_roles(&user, user_id)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    let user_id = parse_user_id(user_id.as_str())?;
    state
        .role_admin_service
        .assign_role(&user, user_id, payload.role_name.trim())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = parse_user_id(user_id.as_str())?;
    state
        .role_admin_service
        .revoke_role(&user, user_id, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn parse_user_id(value: &str) -> Result<UserId, AppError> {
    uuid::Uuid::parse_str(value)
        .map(UserId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
}
