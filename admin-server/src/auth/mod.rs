//! 认证授权模块
//!
//! 提供 JWT 认证、密码散列和中间件：
//! - [`JwtService`] - JWT 令牌服务 (访问/刷新双密钥)
//! - [`AuthService`] - 登录、注册、令牌轮换、用户资料
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件
//! - [`require_any_permission`] - 权限检查中间件 (OR 语义)

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, PUBLIC_ROUTES, require_any_permission, require_auth};
pub use service::AuthService;
