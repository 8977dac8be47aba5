//! Role API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::models::{
    AssignPermissionsRequest, Role, RoleCreate, RoleDetail, RoleOption, RoleUpdate,
};
use shared::{ApiResponse, Paginated};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::RoleListQuery;
use crate::utils::AppResult;

/// GET /api/roles - List roles with filtering and pagination
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RoleListQuery>,
) -> AppResult<Json<ApiResponse<Paginated<RoleDetail>>>> {
    let page = state.role_service().list(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/roles/options - Active roles for select inputs
pub async fn options(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<RoleOption>>>> {
    let options = state.role_service().options().await?;
    Ok(Json(ApiResponse::ok(options)))
}

/// GET /api/roles/{id} - Get role by ID (with user count)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<RoleDetail>>> {
    let role = state.role_service().get(&id).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// POST /api/roles - Create a new role
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<Json<ApiResponse<Role>>> {
    tracing::info!(
        operator = %current_user.username,
        role_code = %payload.code,
        "Creating role"
    );

    let role = state.role_service().create(payload).await?;
    Ok(Json(ApiResponse::ok_with_message(role, "Role created")))
}

/// PATCH /api/roles/{id} - Update a role
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<ApiResponse<Role>>> {
    tracing::info!(
        operator = %current_user.username,
        role_id = %id,
        "Updating role"
    );

    let role = state.role_service().update(&id, payload).await?;
    Ok(Json(ApiResponse::ok_with_message(role, "Role updated")))
}

/// DELETE /api/roles/{id} - Delete a role
///
/// System roles and roles still assigned to users are protected.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    tracing::info!(
        operator = %current_user.username,
        role_id = %id,
        "Deleting role"
    );

    state.role_service().delete(&id).await?;
    Ok(Json(ApiResponse::ok_with_message((), "Role deleted")))
}

/// POST /api/roles/{id}/permissions - Replace the role's permission set
pub async fn assign_permissions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AssignPermissionsRequest>,
) -> AppResult<Json<ApiResponse<Role>>> {
    tracing::info!(
        operator = %current_user.username,
        role_id = %id,
        permissions = ?payload.permissions,
        "Assigning role permissions"
    );

    let role = state
        .role_service()
        .assign_permissions(&id, payload.permissions)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(role, "Permissions assigned")))
}
