//! User Administration Service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::models::{
    BatchDeleteError, BatchDeleteResult, User, UserCreate, UserStatus, UserUpdate,
};
use shared::{PageQuery, Paginated};
use validator::Validate;

use crate::auth::password;
use crate::store::{Directory, NewUser, UserPatch};
use crate::utils::{AppError, AppResult};

/// Default role for admin-created users without an explicit assignment
const DEFAULT_ROLE: &str = "user";

/// Query filter for user listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Matches against username, email and nickname (case-insensitive)
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    /// Role code filter
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// CRUD orchestration for user accounts
#[derive(Clone)]
pub struct UserService {
    directory: Arc<dyn Directory>,
}

impl UserService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// List users with keyword/status/role/date filtering and pagination.
    pub async fn list(&self, query: UserListQuery) -> AppResult<Paginated<User>> {
        let mut users = self.directory.users().await?;

        if let Some(keyword) = query.keyword.as_deref().map(str::to_lowercase) {
            users.retain(|u| {
                u.username.to_lowercase().contains(&keyword)
                    || u.email.to_lowercase().contains(&keyword)
                    || u.nickname
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&keyword))
            });
        }
        if let Some(status) = query.status {
            users.retain(|u| u.status == status);
        }
        if let Some(role) = &query.role {
            users.retain(|u| u.roles.contains(role));
        }
        if let Some(start) = query.start_date {
            users.retain(|u| u.created_at >= start);
        }
        if let Some(end) = query.end_date {
            users.retain(|u| u.created_at <= end);
        }

        let page = PageQuery::from_parts(query.page, query.limit);
        let total = users.len() as u64;
        let limit = page.limit();
        let items: Vec<User> = users
            .into_iter()
            .skip(page.offset())
            .take(limit as usize)
            .collect();

        Ok(Paginated::new(items, total, page.page, limit))
    }

    pub async fn get(&self, id: &str) -> AppResult<User> {
        self.directory
            .user(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    pub async fn create(&self, dto: UserCreate) -> AppResult<User> {
        dto.validate()?;

        let password_hash = password::hash(&dto.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = self
            .directory
            .create_user(NewUser {
                nickname: dto.nickname.or_else(|| Some(dto.username.clone())),
                username: dto.username,
                email: dto.email,
                password_hash,
                phone: dto.phone,
                avatar: None,
                status: dto.status.unwrap_or(UserStatus::Active),
                email_verified: false,
                roles: dto
                    .roles
                    .unwrap_or_else(|| vec![DEFAULT_ROLE.to_string()]),
                // Direct grants are never set at creation; permissions flow
                // through roles until an admin grants one explicitly
                permissions: vec![],
            })
            .await?;

        Ok(user)
    }

    pub async fn update(&self, id: &str, dto: UserUpdate) -> AppResult<User> {
        dto.validate()?;

        let password_hash = match dto.password {
            Some(password) => Some(
                password::hash(&password)
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?,
            ),
            None => None,
        };

        let user = self
            .directory
            .update_user(
                id,
                UserPatch {
                    username: dto.username,
                    email: dto.email,
                    password_hash,
                    phone: dto.phone,
                    avatar: dto.avatar,
                    nickname: dto.nickname,
                    status: dto.status,
                    roles: dto.roles,
                    ..Default::default()
                },
            )
            .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.directory.delete_user(id).await?;
        Ok(())
    }

    /// Delete a batch of users, attempting every id independently.
    ///
    /// Never aborts on the first failure; the result reports per-item
    /// outcomes.
    pub async fn batch_delete(&self, ids: &[String]) -> AppResult<BatchDeleteResult> {
        let mut deleted = 0u32;
        let mut errors = Vec::new();

        for id in ids {
            match self.directory.delete_user(id).await {
                Ok(()) => deleted += 1,
                Err(e) => errors.push(BatchDeleteError {
                    id: id.clone(),
                    error: e.to_string(),
                }),
            }
        }

        Ok(BatchDeleteResult {
            success: deleted,
            failed: errors.len() as u32,
            errors,
        })
    }

    pub async fn update_status(&self, id: &str, status: UserStatus) -> AppResult<User> {
        let user = self
            .directory
            .update_user(
                id,
                UserPatch {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;
        Ok(user)
    }

    /// Replace the user's role set wholesale (never merged).
    pub async fn assign_roles(&self, id: &str, roles: Vec<String>) -> AppResult<User> {
        let user = self
            .directory
            .update_user(
                id,
                UserPatch {
                    roles: Some(roles),
                    ..Default::default()
                },
            )
            .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDirectory;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryDirectory::seeded()))
    }

    fn query(page: u32, limit: u32) -> UserListQuery {
        UserListQuery {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_paginates_and_reports_totals() {
        let users = service();
        let page = users.list(query(1, 5)).await.unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_keyword() {
        let users = service();

        let mut banned = query(1, 10);
        banned.status = Some(UserStatus::Banned);
        let page = users.list(banned).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].username, "banneduser");

        let mut editors = query(1, 10);
        editors.keyword = Some("EDITOR".to_string());
        let page = users.list(editors).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn list_filters_by_role_code() {
        let users = service();
        let mut by_role = query(1, 20);
        by_role.role = Some("editor".to_string());
        let page = users.list(by_role).await.unwrap();

        // editor1, editor2 and the multi-role user
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn create_defaults_role_and_rejects_duplicates() {
        let users = service();
        let created = users
            .create(UserCreate {
                username: "fresh".to_string(),
                email: "fresh@example.com".to_string(),
                password: "password123".to_string(),
                phone: None,
                nickname: None,
                status: None,
                roles: None,
            })
            .await
            .unwrap();
        assert_eq!(created.roles, vec![DEFAULT_ROLE]);
        assert_eq!(created.nickname.as_deref(), Some("fresh"));

        let dup = users
            .create(UserCreate {
                username: "fresh".to_string(),
                email: "other@example.com".to_string(),
                password: "password123".to_string(),
                phone: None,
                nickname: None,
                status: None,
                roles: None,
            })
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_rejects_malformed_email() {
        let users = service();
        let result = users
            .create(UserCreate {
                username: "fresh".to_string(),
                email: "not-an-email".to_string(),
                password: "password123".to_string(),
                phone: None,
                nickname: None,
                status: None,
                roles: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn batch_delete_reports_per_item_outcomes() {
        let users = service();
        let result = users
            .batch_delete(&[
                "7".to_string(),   // deletable
                "999".to_string(), // absent
                "1".to_string(),   // protected bootstrap account
            ])
            .await
            .unwrap();

        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 2);
        let failed_ids: Vec<_> = result.errors.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(failed_ids, vec!["999", "1"]);
    }

    #[tokio::test]
    async fn assign_roles_replaces_wholesale() {
        let users = service();
        let updated = users
            .assign_roles("7", vec!["editor".to_string()])
            .await
            .unwrap();
        // Previous role set is gone, not merged
        assert_eq!(updated.roles, vec!["editor"]);
    }
}
