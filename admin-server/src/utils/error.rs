//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResult`] - 处理函数返回类型
//!
//! # 错误分类
//!
//! | 分类 | HTTP 状态码 |
//! |------|------------|
//! | 认证错误 | 401 |
//! | 权限错误 | 403 |
//! | 业务冲突 | 404 / 409 |
//! | 请求错误 | 400 |
//! | 系统错误 | 500 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("User 42 not found"))
//!
//! // 返回成功响应
//! Ok(Json(ApiResponse::ok(data)))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::ApiResponse;
use tracing::error;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Authentication required")]
    /// 未登录
    Unauthorized,

    #[error("Token expired")]
    /// 令牌过期
    TokenExpired,

    #[error("Invalid token")]
    /// 无效令牌
    InvalidToken,

    #[error("Invalid username or password")]
    /// 用户名或密码错误 (统一消息，防止用户名枚举)
    InvalidCredentials,

    // ========== 权限错误 (403) ==========
    #[error("Permission denied: {0}")]
    /// 无权限
    Forbidden(String),

    #[error("Account has been disabled")]
    /// 账户已禁用
    AccountDisabled,

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// 唯一性冲突 / 引用完整性冲突 (409)
    Conflict(String),

    #[error("Passwords do not match")]
    /// 两次输入的密码不一致 (400)
    PasswordMismatch,

    #[error("Validation failed: {0}")]
    /// 请求格式验证失败 (400)
    Validation(String),

    // ========== 系统错误 (500) ==========
    #[error("Internal server error: {0}")]
    /// 内部错误
    Internal(String),
}

/// Result alias used by handlers and services
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Please login first".to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::AccountDisabled => (
                StatusCode::FORBIDDEN,
                "Account has been disabled".to_string(),
            ),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),

            // Bad request (400)
            AppError::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                "Passwords do not match".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(message));
        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::AccountDisabled.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::conflict("dup").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::not_found("absent").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PasswordMismatch.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
