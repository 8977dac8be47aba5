//! 认证与授权中间件
//!
//! 为 JWT 认证和权限检查提供 Axum 中间件。
//!
//! 认证通过后, 用户的有效权限集会从目录实时重新解析 (直接授权 ∪ 角色授权),
//! 而不是信任令牌中的权限快照 —— 管理员撤销权限后立即生效。

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use shared::models::UserStatus;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 无需认证即可访问的路由
pub const PUBLIC_ROUTES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
    "/api/health",
];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证访问令牌, 随后从目录
/// 加载用户、实时解析有效权限, 并把 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - [`PUBLIC_ROUTES`] 中声明的公共路由
///
/// # 错误处理
///
/// | 情况 | 结果 |
/// |------|------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 / 无效 | 401 |
/// | 用户已不存在 | 401 |
/// | 账户非 active 状态 | 403 AccountDisabled |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证
    if PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    let user = authenticate_token(&state, token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 验证访问令牌并构建 [`CurrentUser`]
///
/// 认证中间件和提取器共用的核心逻辑。
pub(crate) async fn authenticate_token(
    state: &ServerState,
    token: &str,
) -> Result<CurrentUser, AppError> {
    let claims = match state.jwt_service().validate_access(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!("WARN", "auth_failed", error = format!("{}", e));
            return Err(match e {
                crate::auth::JwtError::ExpiredToken => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            });
        }
    };

    // 令牌主体必须仍然指向一个存在且激活的账户
    let user = state
        .directory()
        .user(&claims.sub)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::Unauthorized)?;
    if user.status != UserStatus::Active {
        security_log!(
            "WARN",
            "auth_disabled_account",
            user_id = user.id.clone(),
            username = user.username.clone()
        );
        return Err(AppError::AccountDisabled);
    }

    let permissions = state
        .resolver()
        .resolve_for(&user)
        .await
        .map_err(AppError::from)?;

    Ok(CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
        roles: user.roles,
        permissions,
    })
}

/// 权限检查中间件 - 要求任一指定权限 (OR 语义)
///
/// 每条路由声明自己所需的权限代码列表; 空列表表示仅要求登录。
/// 调用者持有列表中**任意一个**权限即放行 —— 部分接口会列出多个可选
/// 权限代码, 这是有意设计。
///
/// # 用法
///
/// ```ignore
/// Router::new()
///     .route("/api/users", get(handler::list))
///     .layer(middleware::from_fn(require_any_permission(&["user:view"])));
/// ```
///
/// # 错误
///
/// 未认证返回 401, 无任何所需权限返回 403
pub fn require_any_permission(
    required: &'static [&'static str],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::Unauthorized)?;

            if !user.has_any_permission(required) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    username = user.username.clone(),
                    required = required.join("|")
                );
                return Err(AppError::forbidden(format!(
                    "Missing required permission: {}",
                    required.join(" | ")
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 从请求中提取 CurrentUser 的扩展方法
pub trait CurrentUserExt {
    /// 从请求扩展中获取 CurrentUser
    ///
    /// # 错误
    ///
    /// 未认证返回 401 Unauthorized
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or(AppError::Unauthorized)
    }
}

impl CurrentUserExt for Parts {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions
            .get::<CurrentUser>()
            .ok_or(AppError::Unauthorized)
    }
}
