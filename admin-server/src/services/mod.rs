//! 管理服务 - 用户 / 角色 / 权限的 CRUD 编排
//!
//! 每个服务负责过滤、分页和 DTO 映射; 唯一性和引用完整性检查在目录存储的
//! 写锁内原子执行, 失败以 `Conflict` / `NotFound` 上报, 绝不部分生效。

pub mod permission;
pub mod role;
pub mod user;

pub use permission::{PermissionList, PermissionListQuery, PermissionService};
pub use role::{RoleListQuery, RoleService};
pub use user::{UserListQuery, UserService};
