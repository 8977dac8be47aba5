//! Authentication Handlers
//!
//! Login, registration, token rotation and profile endpoints.

use axum::{Json, extract::State};
use shared::ApiResponse;
use shared::models::{LoginRequest, LoginResponse, Profile, RefreshRequest, RegisterRequest, TokenPair};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/auth/login - Authenticate credentials, issue a token pair
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let response = state.auth_service().login(req).await?;
    Ok(Json(ApiResponse::ok_with_message(response, "Login successful")))
}

/// POST /api/auth/register - Create an account and log it in
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let response = state.auth_service().register(req).await?;
    Ok(Json(ApiResponse::ok_with_message(response, "Registration successful")))
}

/// POST /api/auth/refresh - Rotate a refresh token into a fresh pair
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let tokens = state.auth_service().refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok_with_message(tokens, "Token refreshed")))
}

/// POST /api/auth/logout - Stateless logout (audit only)
pub async fn logout(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state.auth_service().logout(&user);
    Ok(Json(ApiResponse::ok_with_message((), "Logged out")))
}

/// GET /api/auth/profile - Current-user profile with resolved display names
pub async fn profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = state.auth_service().profile(&user.id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
