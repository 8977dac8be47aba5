//! Permission Administration Service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::models::{
    Permission, PermissionCreate, PermissionNode, PermissionStatus, PermissionType,
    PermissionUpdate,
};

use crate::rbac;
use crate::store::{Directory, NewPermission, PermissionPatch};
use crate::utils::{AppError, AppResult};

/// Query filter for permission listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionListQuery {
    /// Matches against name, code and description (case-insensitive)
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<PermissionType>,
    #[serde(default)]
    pub status: Option<PermissionStatus>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// When true, the filtered result is returned as a forest instead of a
    /// flat list
    #[serde(default)]
    pub tree: bool,
}

/// Flat or tree-shaped listing result
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PermissionList {
    Flat(Vec<Permission>),
    Tree(Vec<PermissionNode>),
}

/// CRUD orchestration for the permission catalogue
#[derive(Clone)]
pub struct PermissionService {
    directory: Arc<dyn Directory>,
}

impl PermissionService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// List permissions with keyword/type/status/parent filtering.
    ///
    /// With `tree=true` the filtered subset is returned as a forest;
    /// children whose parents were filtered out surface as roots.
    pub async fn list(&self, query: PermissionListQuery) -> AppResult<PermissionList> {
        let mut permissions = self.directory.permissions().await?;

        if let Some(keyword) = query.keyword.as_deref().map(str::to_lowercase) {
            permissions.retain(|p| {
                p.name.to_lowercase().contains(&keyword)
                    || p.code.to_lowercase().contains(&keyword)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&keyword))
            });
        }
        if let Some(kind) = query.kind {
            permissions.retain(|p| p.kind == kind);
        }
        if let Some(status) = query.status {
            permissions.retain(|p| p.status == status);
        }
        if let Some(parent_id) = &query.parent_id {
            permissions.retain(|p| p.parent_id.as_ref() == Some(parent_id));
        }

        if query.tree {
            return Ok(PermissionList::Tree(rbac::build_tree(&permissions)));
        }

        permissions.sort_by_key(|p| p.sort);
        Ok(PermissionList::Flat(permissions))
    }

    pub async fn get(&self, id: &str) -> AppResult<Permission> {
        self.directory
            .permission(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))
    }

    pub async fn create(&self, dto: PermissionCreate) -> AppResult<Permission> {
        let permission = self
            .directory
            .create_permission(NewPermission {
                name: dto.name,
                code: dto.code,
                kind: dto.kind,
                parent_id: dto.parent_id,
                path: dto.path,
                component: dto.component,
                icon: dto.icon,
                sort: dto.sort,
                status: dto.status.unwrap_or(PermissionStatus::Active),
                description: dto.description,
            })
            .await?;
        Ok(permission)
    }

    /// Update a permission. Reassigning the parent re-checks existence and
    /// cycle-freedom of the parent chain.
    pub async fn update(&self, id: &str, dto: PermissionUpdate) -> AppResult<Permission> {
        let permission = self
            .directory
            .update_permission(
                id,
                PermissionPatch {
                    name: dto.name,
                    code: dto.code,
                    kind: dto.kind,
                    parent_id: dto.parent_id,
                    path: dto.path,
                    component: dto.component,
                    icon: dto.icon,
                    sort: dto.sort,
                    status: dto.status,
                    description: dto.description,
                },
            )
            .await?;
        Ok(permission)
    }

    /// Delete a permission; only childless permissions can go.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.directory.delete_permission(id).await?;
        Ok(())
    }

    /// Forest of all active permissions.
    pub async fn tree(&self) -> AppResult<Vec<PermissionNode>> {
        let mut permissions = self.directory.permissions().await?;
        permissions.retain(|p| p.status == PermissionStatus::Active);
        Ok(rbac::build_tree(&permissions))
    }

    /// Forest of active `menu` permissions, used to render nested menus.
    pub async fn menu_tree(&self) -> AppResult<Vec<PermissionNode>> {
        let mut permissions = self.directory.permissions().await?;
        permissions.retain(|p| p.status == PermissionStatus::Active && p.kind == PermissionType::Menu);
        Ok(rbac::build_tree(&permissions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDirectory;

    fn service() -> PermissionService {
        PermissionService::new(Arc::new(MemoryDirectory::seeded()))
    }

    #[tokio::test]
    async fn flat_list_is_sorted_by_sort() {
        let permissions = service();
        let result = permissions.list(PermissionListQuery::default()).await.unwrap();

        let PermissionList::Flat(flat) = result else {
            panic!("expected flat list");
        };
        assert_eq!(flat.len(), 30);
        // dashboard carries sort 0 and comes first
        assert_eq!(flat[0].code, "dashboard");
        assert!(flat.windows(2).all(|w| w[0].sort <= w[1].sort));
    }

    #[tokio::test]
    async fn tree_nests_children_under_parents() {
        let permissions = service();
        let tree = permissions.tree().await.unwrap();

        let system = tree
            .iter()
            .find(|n| n.permission.code == "system")
            .expect("system root");
        let user_mgmt = system
            .children
            .iter()
            .find(|n| n.permission.code == "user-management")
            .expect("user management under system");
        let codes: Vec<_> = user_mgmt
            .children
            .iter()
            .map(|n| n.permission.code.clone())
            .collect();
        assert_eq!(codes, vec!["user:view", "user:create", "user:update", "user:delete"]);
    }

    #[tokio::test]
    async fn menu_tree_keeps_subtrees_of_filtered_parents() {
        let permissions = service();
        let tree = permissions.menu_tree().await.unwrap();

        // Only menu permissions appear, and every node is a menu
        fn assert_menus(nodes: &[PermissionNode]) {
            for node in nodes {
                assert_eq!(node.permission.kind, PermissionType::Menu);
                assert_menus(&node.children);
            }
        }
        assert_menus(&tree);

        // Buttons/apis are gone but menu children stay nested
        let system = tree.iter().find(|n| n.permission.code == "system").unwrap();
        assert!(system
            .children
            .iter()
            .any(|n| n.permission.code == "user-management"));
    }

    #[tokio::test]
    async fn filtered_tree_promotes_orphans_to_roots() {
        let permissions = service();
        let query = PermissionListQuery {
            kind: Some(PermissionType::Api),
            tree: true,
            ..Default::default()
        };
        let result = permissions.list(query).await.unwrap();

        let PermissionList::Tree(tree) = result else {
            panic!("expected tree");
        };
        // All api permissions have menu parents, which the filter removed;
        // each one surfaces as a root rather than disappearing
        assert!(tree.iter().all(|n| n.children.is_empty()));
        assert!(tree.iter().any(|n| n.permission.code == "user:view"));
    }

    #[tokio::test]
    async fn reparenting_onto_descendant_is_conflict() {
        let permissions = service();
        // Seed: permission 3's parent is 2; pushing 2 under 3 closes a loop
        let err = permissions
            .update(
                "2",
                PermissionUpdate {
                    parent_id: Some("3".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("cycle must be rejected");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_with_children_is_conflict() {
        let permissions = service();
        let err = permissions.delete("2").await.expect_err("has children");
        assert!(matches!(err, AppError::Conflict(_)));

        // A leaf deletes fine
        permissions.delete("30").await.expect("leaf delete");
    }

    #[tokio::test]
    async fn create_checks_code_uniqueness_and_parent_existence() {
        let permissions = service();

        let dup = permissions
            .create(PermissionCreate {
                name: "重复".to_string(),
                code: "user:view".to_string(),
                kind: PermissionType::Api,
                parent_id: None,
                path: None,
                component: None,
                icon: None,
                sort: None,
                status: None,
                description: None,
            })
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let orphan = permissions
            .create(PermissionCreate {
                name: "孤儿".to_string(),
                code: "orphan:new".to_string(),
                kind: PermissionType::Api,
                parent_id: Some("404".to_string()),
                path: None,
                component: None,
                icon: None,
                sort: None,
                status: None,
                description: None,
            })
            .await;
        assert!(matches!(orphan, Err(AppError::NotFound(_))));
    }
}
