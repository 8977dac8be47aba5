//! Data Models
//!
//! Canonical records held by the directory store plus their create/update
//! payloads. All types serialize camelCase on the wire.

pub mod auth;
pub mod permission;
pub mod role;
pub mod user;

pub use auth::{
    DisplayRef, LoginRequest, LoginResponse, Profile, RefreshRequest, RegisterRequest, TokenPair,
    UserSummary,
};
pub use permission::{
    Permission, PermissionCreate, PermissionNode, PermissionStatus, PermissionType,
    PermissionUpdate,
};
pub use role::{
    AssignPermissionsRequest, Role, RoleCreate, RoleDetail, RoleOption, RoleStatus, RoleType,
    RoleUpdate,
};
pub use user::{
    AssignRolesRequest, BatchDeleteError, BatchDeleteRequest, BatchDeleteResult, User, UserCreate,
    UserStatus, UserUpdate,
};
