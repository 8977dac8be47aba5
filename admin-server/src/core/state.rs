use std::sync::Arc;

use crate::auth::{AuthService, JwtService};
use crate::core::Config;
use crate::rbac::Resolver;
use crate::services::{PermissionService, RoleService, UserService};
use crate::store::{Directory, MemoryDirectory};

/// 服务器状态 - 持有所有共享组件的引用
///
/// ServerState 是后端的核心数据结构。目录存储和 JWT 服务以 Arc 共享,
/// 克隆成本极低; 各业务服务按需构造 (只是 Arc 的浅拷贝)。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | directory | Arc<dyn Directory> | 目录存储 (用户/角色/权限) |
/// | jwt_service | Arc<JwtService> | JWT 令牌服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 目录存储 (可注入; 默认为内存实现)
    directory: Arc<dyn Directory>,
    /// JWT 令牌服务
    jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 使用种子数据填充内存目录存储。
    pub fn initialize(config: &Config) -> Self {
        let directory: Arc<dyn Directory> = Arc::new(MemoryDirectory::seeded());
        Self::with_directory(config.clone(), directory)
    }

    /// 使用指定目录存储构造状态 (测试和自定义后端)
    pub fn with_directory(config: Config, directory: Arc<dyn Directory>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            directory,
            jwt_service,
        }
    }

    /// 获取目录存储
    pub fn directory(&self) -> Arc<dyn Directory> {
        self.directory.clone()
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 有效权限解析器
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.directory.clone())
    }

    /// 认证服务
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.directory.clone(), self.jwt_service.clone())
    }

    /// 用户管理服务
    pub fn user_service(&self) -> UserService {
        UserService::new(self.directory.clone())
    }

    /// 角色管理服务
    pub fn role_service(&self) -> RoleService {
        RoleService::new(self.directory.clone())
    }

    /// 权限管理服务
    pub fn permission_service(&self) -> PermissionService {
        PermissionService::new(self.directory.clone())
    }
}
