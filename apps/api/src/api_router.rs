use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get};
use sanad_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/rbac/permissions",
            get(handlers::rbac::list_permissions_handler),
        )
        .route(
            "/api/rbac/permissions/{code}",
            get(handlers::rbac::permission_metadata_handler),
        )
        .route(
            "/api/rbac/categories/{category}/permissions",
            get(handlers::rbac::category_permissions_handler),
        )
        .route("/api/rbac/roles", get(handlers::rbac::list_roles_handler))
        .route(
            "/api/rbac/roles/{role_name}/permissions",
            get(handlers::rbac::role_permissions_handler),
        )
        .route(
            "/api/rbac/role-assignments",
            get(handlers::rbac::list_role_assignments_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::users::list_user_roles_handler)
                .post(handlers::users::assign_user_role_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_name}",
            delete(handlers::users::revoke_user_role_handler),
        )
        .route(
            "/api/me/permissions",
            get(handlers::me::me_permissions_handler),
        )
        .route(
            "/api/audit-log",
            get(handlers::audit::list_audit_log_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
