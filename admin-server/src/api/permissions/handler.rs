//! Permission API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::ApiResponse;
use shared::models::{Permission, PermissionCreate, PermissionNode, PermissionUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{PermissionList, PermissionListQuery};
use crate::utils::AppResult;

/// GET /api/permissions - List permissions (flat, or a forest with `tree=true`)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PermissionListQuery>,
) -> AppResult<Json<ApiResponse<PermissionList>>> {
    let result = state.permission_service().list(query).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/permissions/tree - Forest of all active permissions
pub async fn tree(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<PermissionNode>>>> {
    let tree = state.permission_service().tree().await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/permissions/menu-tree - Forest of active menu permissions
pub async fn menu_tree(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<PermissionNode>>>> {
    let tree = state.permission_service().menu_tree().await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/permissions/{id} - Get permission by ID
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Permission>>> {
    let permission = state.permission_service().get(&id).await?;
    Ok(Json(ApiResponse::ok(permission)))
}

/// POST /api/permissions - Create a new permission
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PermissionCreate>,
) -> AppResult<Json<ApiResponse<Permission>>> {
    tracing::info!(
        operator = %current_user.username,
        permission_code = %payload.code,
        "Creating permission"
    );

    let permission = state.permission_service().create(payload).await?;
    Ok(Json(ApiResponse::ok_with_message(permission, "Permission created")))
}

/// PATCH /api/permissions/{id} - Update a permission
///
/// Parent reassignment re-validates existence and cycle-freedom.
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PermissionUpdate>,
) -> AppResult<Json<ApiResponse<Permission>>> {
    tracing::info!(
        operator = %current_user.username,
        permission_id = %id,
        "Updating permission"
    );

    let permission = state.permission_service().update(&id, payload).await?;
    Ok(Json(ApiResponse::ok_with_message(permission, "Permission updated")))
}

/// DELETE /api/permissions/{id} - Delete a childless permission
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    tracing::info!(
        operator = %current_user.username,
        permission_id = %id,
        "Deleting permission"
    );

    state.permission_service().delete(&id).await?;
    Ok(Json(ApiResponse::ok_with_message((), "Permission deleted")))
}
