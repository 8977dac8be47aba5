//! Directory Store
//!
//! The directory store owns the canonical [`User`] / [`Role`] /
//! [`Permission`] records. Everything else reads snapshots and returns
//! changes through explicit calls on the [`Directory`] trait — no component
//! mutates the collections directly.
//!
//! The trait keeps the storage backend injectable: [`MemoryDirectory`] is
//! the in-process implementation; a database-backed one can be swapped in
//! without touching the services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{
    Permission, PermissionStatus, PermissionType, Role, RoleStatus, RoleType, User, UserStatus,
};

use crate::utils::AppError;

mod memory;
pub mod seed;

pub use memory::MemoryDirectory;

/// Bootstrap accounts that can never be deleted
pub const PROTECTED_USERNAMES: &[&str] = &["superadmin", "admin"];

/// Store error
///
/// Uniqueness and referential-integrity violations surface as
/// [`StoreError::Conflict`]; missing records as [`StoreError::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

/// New user draft (password already hashed by the caller)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub status: UserStatus,
    pub email_verified: bool,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// User field patch; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub nickname: Option<String>,
    pub status: Option<UserStatus>,
    pub roles: Option<Vec<String>>,
    pub permissions: Option<Vec<String>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// New role draft
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub kind: RoleType,
    pub status: RoleStatus,
    pub sort: Option<i32>,
    pub permissions: Vec<String>,
}

/// Role field patch; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct RolePatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub kind: Option<RoleType>,
    pub status: Option<RoleStatus>,
    pub sort: Option<i32>,
    pub permissions: Option<Vec<String>>,
}

/// New permission draft
#[derive(Debug, Clone)]
pub struct NewPermission {
    pub name: String,
    pub code: String,
    pub kind: PermissionType,
    pub parent_id: Option<String>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub sort: Option<i32>,
    pub status: PermissionStatus,
    pub description: Option<String>,
}

/// Permission field patch; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct PermissionPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub kind: Option<PermissionType>,
    pub parent_id: Option<String>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub sort: Option<i32>,
    pub status: Option<PermissionStatus>,
    pub description: Option<String>,
}

/// Repository interface over the user/role/permission collections
///
/// Each mutating call validates its uniqueness and referential constraints
/// atomically with the write, so concurrent requests cannot interleave a
/// check with another request's commit:
///
/// - users: unique `username`/`email`; bootstrap usernames undeletable
/// - roles: unique `code`; `system` roles and in-use roles undeletable
/// - permissions: unique `code`; parent must exist; reparenting must not
///   create a cycle; only childless permissions can be deleted
///
/// Reads return owned snapshots so no lock is held while callers filter or
/// build trees.
#[async_trait]
pub trait Directory: Send + Sync {
    // ========== Users ==========
    async fn users(&self) -> StoreResult<Vec<User>>;
    async fn user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, draft: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<User>;
    async fn delete_user(&self, id: &str) -> StoreResult<()>;

    // ========== Roles ==========
    async fn roles(&self) -> StoreResult<Vec<Role>>;
    async fn role(&self, id: &str) -> StoreResult<Option<Role>>;
    async fn role_by_code(&self, code: &str) -> StoreResult<Option<Role>>;
    async fn create_role(&self, draft: NewRole) -> StoreResult<Role>;
    async fn update_role(&self, id: &str, patch: RolePatch) -> StoreResult<Role>;
    async fn delete_role(&self, id: &str) -> StoreResult<()>;
    /// Number of users currently assigned the role `code`
    async fn user_count_for_role(&self, code: &str) -> StoreResult<u64>;

    // ========== Permissions ==========
    async fn permissions(&self) -> StoreResult<Vec<Permission>>;
    async fn permission(&self, id: &str) -> StoreResult<Option<Permission>>;
    async fn create_permission(&self, draft: NewPermission) -> StoreResult<Permission>;
    async fn update_permission(&self, id: &str, patch: PermissionPatch) -> StoreResult<Permission>;
    async fn delete_permission(&self, id: &str) -> StoreResult<()>;
}
