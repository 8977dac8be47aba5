//! Authentication Service
//!
//! Credential validation, token issue/rotation and the current-user
//! profile. Password verification order deliberately mirrors the login
//! contract: credentials are checked before account status, so probing a
//! banned account with a wrong password still reports invalid credentials.

use std::sync::Arc;

use chrono::Utc;
use shared::models::{
    DisplayRef, LoginRequest, LoginResponse, Profile, RegisterRequest, TokenPair, User, UserStatus,
    UserSummary,
};
use validator::Validate;

use crate::auth::{CurrentUser, JwtService, password};
use crate::rbac::Resolver;
use crate::store::{Directory, NewUser, UserPatch};
use crate::utils::{AppError, AppResult};

/// Default role granted to self-registered accounts
const DEFAULT_ROLE: &str = "user";

/// Authentication orchestration over the directory + token collaborators
#[derive(Clone)]
pub struct AuthService {
    directory: Arc<dyn Directory>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(directory: Arc<dyn Directory>, jwt: Arc<JwtService>) -> Self {
        Self { directory, jwt }
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(self.directory.clone())
    }

    /// Validate credentials and issue a fresh token pair.
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .directory
            .user_by_username(&req.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_valid = password::verify(&req.password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
        if !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        if user.status != UserStatus::Active {
            return Err(AppError::AccountDisabled);
        }

        let permissions = self.resolver().resolve_for(&user).await?;
        let tokens = self
            .jwt
            .issue_pair(&user, &permissions)
            .map_err(|e| AppError::internal(format!("Failed to issue tokens: {e}")))?;

        // Stamp the login time; a failure here must not fail the login
        let stamp = UserPatch {
            last_login_at: Some(Utc::now()),
            ..Default::default()
        };
        if let Err(e) = self.directory.update_user(&user.id, stamp).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to stamp last login time");
        }

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User logged in successfully"
        );

        Ok(LoginResponse {
            user: UserSummary {
                id: user.id,
                username: user.username,
                email: user.email,
                avatar: user.avatar,
                nickname: user.nickname,
                roles: user.roles,
                permissions,
            },
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        })
    }

    /// Create an account with the default role, then log it in.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<LoginResponse> {
        req.validate()?;

        if req.password != req.confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let password_hash = password::hash(&req.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = self
            .directory
            .create_user(NewUser {
                username: req.username.clone(),
                email: req.email,
                password_hash,
                phone: req.phone,
                nickname: req.nickname.or_else(|| Some(req.username.clone())),
                avatar: None,
                status: UserStatus::Active,
                email_verified: false,
                roles: vec![DEFAULT_ROLE.to_string()],
                permissions: vec![],
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User registered"
        );

        self.login(LoginRequest {
            username: req.username,
            password: req.password,
        })
        .await
    }

    /// Rotate a refresh token into a fresh pair.
    ///
    /// Fails with `InvalidToken` when verification fails or the subject no
    /// longer resolves to an active account.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self
            .jwt
            .validate_refresh(refresh_token)
            .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .directory
            .user(&claims.sub)
            .await?
            .filter(|u| u.status == UserStatus::Active)
            .ok_or(AppError::InvalidToken)?;

        let permissions = self.resolver().resolve_for(&user).await?;
        self.jwt
            .issue_pair(&user, &permissions)
            .map_err(|e| AppError::internal(format!("Failed to issue tokens: {e}")))
    }

    /// Current-user profile with role/permission display objects.
    pub async fn profile(&self, user_id: &str) -> AppResult<Profile> {
        let user = self
            .directory
            .user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        if user.status != UserStatus::Active {
            return Err(AppError::AccountDisabled);
        }

        let permissions = self.resolver().resolve_for(&user).await?;
        self.build_profile(user, permissions).await
    }

    async fn build_profile(&self, user: User, permissions: Vec<String>) -> AppResult<Profile> {
        let roles = self.directory.roles().await?;
        let catalogue = self.directory.permissions().await?;

        // Resolve display names from the directory; stale codes fall back
        // to the code itself
        let role_refs = user
            .roles
            .iter()
            .map(|code| DisplayRef {
                code: code.clone(),
                name: roles
                    .iter()
                    .find(|r| &r.code == code)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| code.clone()),
            })
            .collect();
        let permission_refs = permissions
            .iter()
            .map(|code| DisplayRef {
                code: code.clone(),
                name: catalogue
                    .iter()
                    .find(|p| &p.code == code)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| code.clone()),
            })
            .collect();

        Ok(Profile {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            nickname: user.nickname,
            phone: user.phone,
            status: user.status,
            roles: role_refs,
            permissions: permission_refs,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    /// Stateless logout; the event is recorded for audit purposes only.
    pub fn logout(&self, user: &CurrentUser) {
        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User logged out"
        );
    }
}
