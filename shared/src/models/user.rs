//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account status
///
/// Only `active` accounts may log in or hold a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Banned,
    Pending,
}

/// User record
///
/// `username` and `email` are globally unique. The password hash is never
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub status: UserStatus,
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    /// Role codes assigned to this user
    #[serde(default)]
    pub roles: Vec<String>,
    /// Direct permission grants (on top of role-derived ones)
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create user request (admin)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// Update user request (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// Wholesale role assignment: the user's role set is replaced, never merged.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRolesRequest {
    pub roles: Vec<String>,
}

/// Batch delete request
#[derive(Debug, Clone, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<String>,
}

/// Per-item outcome report of a batch delete
///
/// Batch operations never abort on the first failure: every id is attempted
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteResult {
    pub success: u32,
    pub failed: u32,
    pub errors: Vec<BatchDeleteError>,
}

/// One failed item of a batch delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteError {
    pub id: String,
    pub error: String,
}
