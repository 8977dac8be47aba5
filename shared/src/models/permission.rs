//! Permission Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission kind
///
/// `menu` permissions drive nested menu visibility, `button` and `api`
/// permissions gate actions. The authorization guard checks all three
/// identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    Menu,
    Button,
    Api,
}

/// Permission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Active,
    Inactive,
}

/// Permission record
///
/// Permissions form a forest through `parent_id` links. Codes follow the
/// `resource:action` convention (e.g. `user:view`) and are globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: PermissionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Frontend route path (menu permissions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Frontend component reference (menu permissions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub sort: i32,
    pub status: PermissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Node of the permission tree: a permission with its children embedded,
/// each children list ordered by ascending `sort`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionNode {
    #[serde(flatten)]
    pub permission: Permission,
    pub children: Vec<PermissionNode>,
}

/// Create permission request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCreate {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: PermissionType,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort: Option<i32>,
    #[serde(default)]
    pub status: Option<PermissionStatus>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Update permission request (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<PermissionType>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort: Option<i32>,
    #[serde(default)]
    pub status: Option<PermissionStatus>,
    #[serde(default)]
    pub description: Option<String>,
}
