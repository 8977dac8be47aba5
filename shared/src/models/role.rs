//! Role Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role kind: `system` roles are built-in and protected from deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    System,
    Custom,
}

/// Role status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    Active,
    Inactive,
}

/// Role record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: RoleType,
    pub status: RoleStatus,
    pub sort: i32,
    /// Permission codes granted through this role
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role with its derived assigned-user count (list/detail responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub user_count: u64,
}

/// Role option for select inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleOption {
    pub id: String,
    pub name: String,
    pub code: String,
    pub disabled: bool,
}

/// Create role request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<RoleType>,
    #[serde(default)]
    pub status: Option<RoleStatus>,
    #[serde(default)]
    pub sort: Option<i32>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Update role request (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<RoleType>,
    #[serde(default)]
    pub status: Option<RoleStatus>,
    #[serde(default)]
    pub sort: Option<i32>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Wholesale permission assignment: the role's permission set is replaced,
/// never merged.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignPermissionsRequest {
    pub permissions: Vec<String>,
}
