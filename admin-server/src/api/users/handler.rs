//! User API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use shared::models::{
    AssignRolesRequest, BatchDeleteRequest, BatchDeleteResult, User, UserCreate, UserStatus,
    UserUpdate,
};
use shared::{ApiResponse, Paginated};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::UserListQuery;
use crate::utils::AppResult;

/// GET /api/users - List users with filtering and pagination
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<Paginated<User>>>> {
    let page = state.user_service().list(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/users/{id} - Get user by ID
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.user_service().get(&id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/users - Create a new user
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<ApiResponse<User>>> {
    tracing::info!(
        operator = %current_user.username,
        username = %payload.username,
        "Creating user"
    );

    let user = state.user_service().create(payload).await?;
    Ok(Json(ApiResponse::ok_with_message(user, "User created")))
}

/// PATCH /api/users/{id} - Update a user
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<User>>> {
    tracing::info!(
        operator = %current_user.username,
        user_id = %id,
        "Updating user"
    );

    let user = state.user_service().update(&id, payload).await?;
    Ok(Json(ApiResponse::ok_with_message(user, "User updated")))
}

/// DELETE /api/users/{id} - Delete a user
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    tracing::info!(
        operator = %current_user.username,
        user_id = %id,
        "Deleting user"
    );

    state.user_service().delete(&id).await?;
    Ok(Json(ApiResponse::ok_with_message((), "User deleted")))
}

/// POST /api/users/batch-delete - Delete a batch of users
///
/// Each id is attempted independently; the response reports per-item
/// outcomes instead of failing fast.
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<BatchDeleteRequest>,
) -> AppResult<Json<ApiResponse<BatchDeleteResult>>> {
    tracing::info!(
        operator = %current_user.username,
        count = payload.ids.len(),
        "Batch deleting users"
    );

    let result = state.user_service().batch_delete(&payload.ids).await?;
    Ok(Json(ApiResponse::ok_with_message(result, "Batch delete finished")))
}

/// Status change payload
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

/// PATCH /api/users/{id}/status - Update account status
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    tracing::info!(
        operator = %current_user.username,
        user_id = %id,
        status = ?payload.status,
        "Updating user status"
    );

    let user = state.user_service().update_status(&id, payload.status).await?;
    Ok(Json(ApiResponse::ok_with_message(user, "Status updated")))
}

/// POST /api/users/{id}/roles - Replace the user's role set
pub async fn assign_roles(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AssignRolesRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    tracing::info!(
        operator = %current_user.username,
        user_id = %id,
        roles = ?payload.roles,
        "Assigning user roles"
    );

    let user = state.user_service().assign_roles(&id, payload.roles).await?;
    Ok(Json(ApiResponse::ok_with_message(user, "Roles assigned")))
}
