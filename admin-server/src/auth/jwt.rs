//! JWT 令牌服务
//!
//! 处理访问令牌和刷新令牌的生成、验证和解析。
//! 两种令牌使用独立密钥和独立有效期 (访问令牌短效、刷新令牌长效),
//! 刷新时整对轮换, 不复用旧刷新令牌。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::{TokenPair, User};
use thiserror::Error;

/// JWT 配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | JWT_SECRET | (开发环境自动生成) | 访问令牌密钥, 至少 32 字节 |
/// | JWT_REFRESH_SECRET | (开发环境自动生成) | 刷新令牌密钥, 至少 32 字节 |
/// | JWT_EXPIRES_IN_MINUTES | 15 | 访问令牌有效期 (分钟) |
/// | JWT_REFRESH_EXPIRES_IN_DAYS | 7 | 刷新令牌有效期 (天) |
/// | JWT_ISSUER | admin-server | 令牌签发者 |
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 访问令牌密钥
    pub access_secret: String,
    /// 刷新令牌密钥 (独立于访问令牌密钥)
    pub refresh_secret: String,
    /// 访问令牌有效期 (分钟)
    pub access_expires_minutes: i64,
    /// 刷新令牌有效期 (天)
    pub refresh_expires_days: i64,
    /// 令牌签发者
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: load_secret("JWT_SECRET"),
            refresh_secret: load_secret("JWT_REFRESH_SECRET"),
            access_expires_minutes: std::env::var("JWT_EXPIRES_IN_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_expires_days: std::env::var("JWT_REFRESH_EXPIRES_IN_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "admin-server".to_string()),
        }
    }
}

/// 从环境变量加载密钥
///
/// 未设置时: 开发构建生成临时密钥并告警, 发布构建直接终止启动。
fn load_secret(var: &str) -> String {
    match std::env::var(var) {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("{var} is shorter than 32 bytes, generating a temporary key");
                generate_printable_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("{var} must be at least 32 characters long in production");
            }
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("{var} not set! Generating a temporary key for development.");
                generate_printable_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("{var} environment variable must be set in production");
            }
        }
    }
}

/// 生成可打印的安全密钥 (用于开发环境)
pub fn generate_printable_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut key = String::with_capacity(64);
    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            // 随机数源不可用时退回固定开发密钥
            return "AdminServerDevelopmentOnlySecretKey2024!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }
    key
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 邮箱
    pub email: String,
    /// 角色代码列表
    pub roles: Vec<String>,
    /// 有效权限代码列表 (签发时的快照, 授权检查时会重新解析)
    pub permissions: Vec<String>,
    /// 令牌类型: "access" | "refresh"
    pub token_type: String,
    /// 签发时间戳
    pub iat: i64,
    /// 过期时间戳
    pub exp: i64,
    /// 签发者
    pub iss: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌类型不匹配")]
    WrongTokenType,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtService {
    /// 使用默认配置创建新的 JWT 服务
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());

        Self {
            config,
            access_encoding,
            access_decoding,
            refresh_encoding,
            refresh_decoding,
        }
    }

    /// 访问令牌有效期 (秒)
    pub fn access_expires_seconds(&self) -> i64 {
        self.config.access_expires_minutes * 60
    }

    /// 为用户签发一对新令牌 (访问 + 刷新)
    pub fn issue_pair(&self, user: &User, permissions: &[String]) -> Result<TokenPair, JwtError> {
        let access_token = self.sign(
            user,
            permissions,
            "access",
            Duration::minutes(self.config.access_expires_minutes),
            &self.access_encoding,
        )?;
        let refresh_token = self.sign(
            user,
            permissions,
            "refresh",
            Duration::days(self.config.refresh_expires_days),
            &self.refresh_encoding,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_expires_seconds(),
        })
    }

    fn sign(
        &self,
        user: &User,
        permissions: &[String],
        token_type: &str,
        lifetime: Duration,
        key: &EncodingKey,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            permissions: permissions.to_vec(),
            token_type: token_type.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码访问令牌
    pub fn validate_access(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate(token, &self.access_decoding)?;
        if claims.token_type != "access" {
            return Err(JwtError::WrongTokenType);
        }
        Ok(claims)
    }

    /// 验证并解码刷新令牌
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate(token, &self.refresh_decoding)?;
        if claims.token_type != "refresh" {
            return Err(JwtError::WrongTokenType);
        }
        Ok(claims)
    }

    fn validate(&self, token: &str, key: &DecodingKey) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let token_data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken(e.to_string()),
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前用户上下文
///
/// 由认证中间件创建并注入请求扩展。`permissions` 持有的是请求时从目录
/// 实时解析的有效权限集, 不是令牌签发时的快照。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: String,
    /// 用户名
    pub username: String,
    /// 邮箱
    pub email: String,
    /// 角色代码列表
    pub roles: Vec<String>,
    /// 有效权限代码列表
    pub permissions: Vec<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            roles: claims.roles,
            permissions: claims.permissions,
        }
    }
}

impl CurrentUser {
    /// 检查是否拥有指定权限 (精确匹配)
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// 检查是否拥有任一指定权限 (OR 语义)
    ///
    /// 空列表表示仅要求登录, 始终通过。
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.is_empty() || permissions.iter().any(|p| self.has_permission(p))
    }
}
