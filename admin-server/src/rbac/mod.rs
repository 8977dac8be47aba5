//! 权限模型核心
//!
//! RBAC 授权模型的核心算法：
//! - [`tree`] - 权限树构建 (parentId 链接 → 森林)
//! - [`resolver`] - 用户有效权限解析 (直接授权 ∪ 角色授权)
//!
//! 两个文档化的"软失败"都在这里：树构建时悬空的 parentId 静默降级为根节点,
//! 权限解析时无法解析的角色代码静默跳过。两者都是有意行为, 有测试固定。

pub mod resolver;
pub mod tree;

pub use resolver::{ResolveError, Resolver, effective_permissions};
pub use tree::{build_tree, would_create_cycle};
