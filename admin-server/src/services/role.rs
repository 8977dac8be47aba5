//! Role Administration Service

use std::sync::Arc;

use serde::Deserialize;
use shared::models::{Role, RoleCreate, RoleDetail, RoleOption, RoleStatus, RoleType, RoleUpdate};
use shared::{PageQuery, Paginated};

use crate::store::{Directory, NewRole, RolePatch};
use crate::utils::{AppError, AppResult};

/// Query filter for role listing
#[derive(Debug, Default, Deserialize)]
pub struct RoleListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Matches against name, code and description (case-insensitive)
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub status: Option<RoleStatus>,
    #[serde(default, rename = "type")]
    pub kind: Option<RoleType>,
}

/// CRUD orchestration for roles
#[derive(Clone)]
pub struct RoleService {
    directory: Arc<dyn Directory>,
}

impl RoleService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Count role holders from one users snapshot
    async fn user_counts(&self, roles: &[Role]) -> AppResult<Vec<u64>> {
        let users = self.directory.users().await?;
        Ok(roles
            .iter()
            .map(|role| {
                users
                    .iter()
                    .filter(|u| u.roles.contains(&role.code))
                    .count() as u64
            })
            .collect())
    }

    /// List roles sorted by `sort`, each with its assigned-user count.
    pub async fn list(&self, query: RoleListQuery) -> AppResult<Paginated<RoleDetail>> {
        let mut roles = self.directory.roles().await?;

        if let Some(keyword) = query.keyword.as_deref().map(str::to_lowercase) {
            roles.retain(|r| {
                r.name.to_lowercase().contains(&keyword)
                    || r.code.to_lowercase().contains(&keyword)
                    || r.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&keyword))
            });
        }
        if let Some(status) = query.status {
            roles.retain(|r| r.status == status);
        }
        if let Some(kind) = query.kind {
            roles.retain(|r| r.kind == kind);
        }

        roles.sort_by_key(|r| r.sort);

        let page = PageQuery::from_parts(query.page, query.limit);
        let total = roles.len() as u64;
        let limit = page.limit();
        let page_roles: Vec<Role> = roles
            .into_iter()
            .skip(page.offset())
            .take(limit as usize)
            .collect();

        let counts = self.user_counts(&page_roles).await?;
        let items = page_roles
            .into_iter()
            .zip(counts)
            .map(|(role, user_count)| RoleDetail { role, user_count })
            .collect();

        Ok(Paginated::new(items, total, page.page, limit))
    }

    pub async fn get(&self, id: &str) -> AppResult<RoleDetail> {
        let role = self
            .directory
            .role(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
        let user_count = self.directory.user_count_for_role(&role.code).await?;
        Ok(RoleDetail { role, user_count })
    }

    pub async fn create(&self, dto: RoleCreate) -> AppResult<Role> {
        let role = self
            .directory
            .create_role(NewRole {
                name: dto.name,
                code: dto.code,
                description: dto.description,
                kind: dto.kind.unwrap_or(RoleType::Custom),
                status: dto.status.unwrap_or(RoleStatus::Active),
                sort: dto.sort,
                permissions: dto.permissions,
            })
            .await?;
        Ok(role)
    }

    pub async fn update(&self, id: &str, dto: RoleUpdate) -> AppResult<Role> {
        let role = self
            .directory
            .update_role(
                id,
                RolePatch {
                    name: dto.name,
                    code: dto.code,
                    description: dto.description,
                    kind: dto.kind,
                    status: dto.status,
                    sort: dto.sort,
                    permissions: dto.permissions,
                },
            )
            .await?;
        Ok(role)
    }

    /// Delete a role. System roles and roles with assigned users are
    /// protected; both failures surface as `Conflict`.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.directory.delete_role(id).await?;
        Ok(())
    }

    /// Replace the role's permission set wholesale (never merged).
    pub async fn assign_permissions(&self, id: &str, permissions: Vec<String>) -> AppResult<Role> {
        let role = self
            .directory
            .update_role(
                id,
                RolePatch {
                    permissions: Some(permissions),
                    ..Default::default()
                },
            )
            .await?;
        Ok(role)
    }

    /// Active roles as select options, sorted by `sort`.
    ///
    /// The seeded super-administrator role is marked disabled so it cannot
    /// be handed out from the console.
    pub async fn options(&self) -> AppResult<Vec<RoleOption>> {
        let mut roles = self.directory.roles().await?;
        roles.retain(|r| r.status == RoleStatus::Active);
        roles.sort_by_key(|r| r.sort);

        Ok(roles
            .into_iter()
            .map(|r| RoleOption {
                disabled: r.kind == RoleType::System && r.code == "super_admin",
                id: r.id,
                name: r.name,
                code: r.code,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDirectory;

    fn service() -> RoleService {
        RoleService::new(Arc::new(MemoryDirectory::seeded()))
    }

    #[tokio::test]
    async fn list_sorts_and_counts_users() {
        let roles = service();
        let page = roles.list(RoleListQuery::default()).await.unwrap();

        assert_eq!(page.total, 8);
        assert_eq!(page.items[0].role.code, "super_admin");
        assert_eq!(page.items[0].user_count, 1);

        // Three users hold the editor role across the seed
        let editor = page
            .items
            .iter()
            .find(|r| r.role.code == "editor")
            .expect("editor role seeded");
        assert_eq!(editor.user_count, 3);
    }

    #[tokio::test]
    async fn list_filters_by_kind() {
        let roles = service();
        let mut query = RoleListQuery::default();
        query.kind = Some(RoleType::System);
        let page = roles.list(query).await.unwrap();

        assert_eq!(page.total, 4);
        assert!(page.items.iter().all(|r| r.role.kind == RoleType::System));
    }

    #[tokio::test]
    async fn delete_system_role_is_conflict_regardless_of_user_count() {
        let roles = service();
        // guest is a system role; give it zero holders first
        let err = roles.delete("7").await.expect_err("must be rejected");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_unused_custom_role_succeeds() {
        let roles = service();
        // test_role is custom and has no holders
        roles.delete("8").await.expect("delete should succeed");
        let err = roles.get("8").await.expect_err("role is gone");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn assign_permissions_replaces_wholesale() {
        let roles = service();
        let updated = roles
            .assign_permissions("4", vec!["dashboard".to_string()])
            .await
            .unwrap();
        assert_eq!(updated.permissions, vec!["dashboard"]);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_code() {
        let roles = service();
        let dup = roles
            .create(RoleCreate {
                name: "clone".to_string(),
                code: "editor".to_string(),
                description: None,
                kind: None,
                status: None,
                sort: None,
                permissions: vec![],
            })
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn options_exclude_inactive_and_disable_super_admin() {
        let roles = service();
        let options = roles.options().await.unwrap();

        // test_role is inactive and must not appear
        assert_eq!(options.len(), 7);
        assert!(options.iter().all(|o| o.code != "test_role"));

        let super_admin = options.iter().find(|o| o.code == "super_admin").unwrap();
        assert!(super_admin.disabled);
        assert!(options.iter().filter(|o| o.code != "super_admin").all(|o| !o.disabled));
    }
}
