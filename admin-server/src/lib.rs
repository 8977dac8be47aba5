//! Admin Console Backend - RBAC 后台管理系统服务端
//!
//! # 架构概述
//!
//! 本模块是后端的主入口，提供以下核心功能：
//!
//! - **目录存储** (`store`): 用户/角色/权限的可注入仓储层
//! - **权限模型** (`rbac`): 权限树构建、循环检测、有效权限解析
//! - **认证** (`auth`): JWT + Argon2 认证体系, 认证/授权中间件
//! - **管理服务** (`services`): 用户/角色/权限的 CRUD 编排
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! admin-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、密码散列、中间件
//! ├── rbac/          # 权限树与有效权限解析
//! ├── store/         # 目录存储 (内存实现 + 种子数据)
//! ├── services/      # 管理服务
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误类型、日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod rbac;
pub mod services;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{AuthService, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use rbac::Resolver;
pub use store::{Directory, MemoryDirectory};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 文件不存在时静默跳过
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(Some(&log_level), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ___       __          _
   /   | ____/ /___ ___  (_)___
  / /| |/ __  / __ `__ \/ / __ \
 / ___ / /_/ / / / / / / / / / /
/_/  |_\__,_/_/ /_/ /_/_/_/ /_/
   ______                       __
  / ____/___  ____  _________  / /__
 / /   / __ \/ __ \/ ___/ __ \/ / _ \
/ /___/ /_/ / / / (__  ) /_/ / /  __/
\____/\____/_/ /_/____/\____/_/\___/
    "#
    );
}
