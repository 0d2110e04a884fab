use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use sanad_core::UserIdentity;
use sanad_domain::PermissionCategory;

use crate::dto::{
    CategoryPermissionsResponse, PermissionResponse, RoleAssignmentResponse, RoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn permission_metadata_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(code): Path<String>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .role_admin_service
        .get_permission_metadata(&user, code.as_str())
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn category_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(category): Path<String>,
) -> ApiResult<Json<CategoryPermissionsResponse>> {
    let category = PermissionCategory::from_str(category.as_str())?;
    let codes = state
        .role_admin_service
        .expand_category(&user, category)
        .await?;

    Ok(Json(CategoryPermissionsResponse::new(category, codes)))
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_name): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .get_role_permissions(&user, role_name.as_str())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn list_role_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let assignments = state
        .role_admin_service
        .list_role_assignments(&user)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}
