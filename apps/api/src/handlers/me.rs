use axum::Json;
use axum::extract::{Extension, State};
use sanad_core::UserIdentity;

use crate::dto::EffectivePermissionsResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn me_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let roles = state
        .access_control_service
        .roles_for_user(user.user_id())
        .await?;
    let permissions = state
        .access_control_service
        .effective_permissions(user.user_id())
        .await?;

    Ok(Json(EffectivePermissionsResponse {
        user_id: user.user_id().to_string(),
        display_name: user.display_name().to_owned(),
        email: user.email().map(str::to_owned),
        roles: roles.into_iter().map(String::from).collect(),
        permissions: permissions.into_iter().map(String::from).collect(),
    }))
}
