//! In-Memory Directory
//!
//! [`MemoryDirectory`] keeps the three collections behind a single coarse
//! `parking_lot::RwLock`. Every mutating call performs its constraint
//! checks and the write under one guard, so two concurrent requests cannot
//! interleave a uniqueness check with each other's commit. Reads clone a
//! snapshot; no lock is held while callers filter or build trees.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use shared::models::{Permission, Role, RoleType, User};

use super::{
    Directory, NewPermission, NewRole, NewUser, PROTECTED_USERNAMES, PermissionPatch, RolePatch,
    StoreError, StoreResult, UserPatch, seed,
};
use crate::rbac;

/// Guarded in-memory store, cheap to clone
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    next_user_id: u64,
    next_role_id: u64,
    next_permission_id: u64,
}

impl Inner {
    /// Monotonic id allocation; ids are never reused after a delete
    fn next_id(counter: &mut u64, records: impl Iterator<Item = u64>) -> String {
        let floor = records.max().map(|max| max + 1).unwrap_or(1);
        *counter = (*counter).max(floor);
        let id = counter.to_string();
        *counter += 1;
        id
    }

    fn alloc_user_id(&mut self) -> String {
        let ids = self.users.iter().filter_map(|u| u.id.parse::<u64>().ok());
        Self::next_id(&mut self.next_user_id, ids)
    }

    fn alloc_role_id(&mut self) -> String {
        let ids = self.roles.iter().filter_map(|r| r.id.parse::<u64>().ok());
        Self::next_id(&mut self.next_role_id, ids)
    }

    fn alloc_permission_id(&mut self) -> String {
        let ids = self
            .permissions
            .iter()
            .filter_map(|p| p.id.parse::<u64>().ok());
        Self::next_id(&mut self.next_permission_id, ids)
    }
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory populated with the bootstrap dataset
    ///
    /// All seeded accounts share the password `password123`.
    pub fn seeded() -> Self {
        let (permissions, roles, users) = seed::records();
        let directory = Self::new();
        {
            let mut inner = directory.inner.write();
            inner.permissions = permissions;
            inner.roles = roles;
            inner.users = users;
        }
        directory
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    // ========== Users ==========

    async fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().users.clone())
    }

    async fn user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.inner.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, draft: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write();

        if inner.users.iter().any(|u| u.username == draft.username) {
            return Err(StoreError::Conflict("Username already exists".into()));
        }
        if inner.users.iter().any(|u| u.email == draft.email) {
            return Err(StoreError::Conflict("Email already exists".into()));
        }

        let now = Utc::now();
        let user = User {
            id: inner.alloc_user_id(),
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            phone: draft.phone,
            avatar: draft.avatar,
            nickname: draft.nickname,
            status: draft.status,
            email_verified: draft.email_verified,
            last_login_at: None,
            roles: draft.roles,
            permissions: draft.permissions,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<User> {
        let mut inner = self.inner.write();

        let index = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("User {id} not found")))?;

        if let Some(username) = &patch.username
            && inner
                .users
                .iter()
                .any(|u| u.id != id && &u.username == username)
        {
            return Err(StoreError::Conflict("Username already exists".into()));
        }
        if let Some(email) = &patch.email
            && inner.users.iter().any(|u| u.id != id && &u.email == email)
        {
            return Err(StoreError::Conflict("Email already exists".into()));
        }

        let user = &mut inner.users[index];
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(phone) = patch.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(nickname) = patch.nickname {
            user.nickname = Some(nickname);
        }
        if let Some(status) = patch.status {
            user.status = status;
        }
        if let Some(roles) = patch.roles {
            user.roles = roles;
        }
        if let Some(permissions) = patch.permissions {
            user.permissions = permissions;
        }
        if let Some(last_login_at) = patch.last_login_at {
            user.last_login_at = Some(last_login_at);
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();

        let index = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("User {id} not found")))?;

        if PROTECTED_USERNAMES.contains(&inner.users[index].username.as_str()) {
            return Err(StoreError::Conflict(
                "Cannot delete administrator account".into(),
            ));
        }

        inner.users.remove(index);
        Ok(())
    }

    // ========== Roles ==========

    async fn roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.inner.read().roles.clone())
    }

    async fn role(&self, id: &str) -> StoreResult<Option<Role>> {
        Ok(self.inner.read().roles.iter().find(|r| r.id == id).cloned())
    }

    async fn role_by_code(&self, code: &str) -> StoreResult<Option<Role>> {
        Ok(self
            .inner
            .read()
            .roles
            .iter()
            .find(|r| r.code == code)
            .cloned())
    }

    async fn create_role(&self, draft: NewRole) -> StoreResult<Role> {
        let mut inner = self.inner.write();

        if inner.roles.iter().any(|r| r.code == draft.code) {
            return Err(StoreError::Conflict("Role code already exists".into()));
        }

        let now = Utc::now();
        let sort = draft.sort.unwrap_or(inner.roles.len() as i32 + 1);
        let role = Role {
            id: inner.alloc_role_id(),
            name: draft.name,
            code: draft.code,
            description: draft.description,
            kind: draft.kind,
            status: draft.status,
            sort,
            permissions: draft.permissions,
            created_at: now,
            updated_at: now,
        };
        inner.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, id: &str, patch: RolePatch) -> StoreResult<Role> {
        let mut inner = self.inner.write();

        let index = inner
            .roles
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Role {id} not found")))?;

        if let Some(code) = &patch.code
            && inner.roles.iter().any(|r| r.id != id && &r.code == code)
        {
            return Err(StoreError::Conflict("Role code already exists".into()));
        }

        let role = &mut inner.roles[index];
        if let Some(name) = patch.name {
            role.name = name;
        }
        if let Some(code) = patch.code {
            role.code = code;
        }
        if let Some(description) = patch.description {
            role.description = Some(description);
        }
        if let Some(kind) = patch.kind {
            role.kind = kind;
        }
        if let Some(status) = patch.status {
            role.status = status;
        }
        if let Some(sort) = patch.sort {
            role.sort = sort;
        }
        if let Some(permissions) = patch.permissions {
            role.permissions = permissions;
        }
        role.updated_at = Utc::now();

        Ok(role.clone())
    }

    async fn delete_role(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();

        let index = inner
            .roles
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Role {id} not found")))?;

        // System roles are protected regardless of how many users hold them
        if inner.roles[index].kind == RoleType::System {
            return Err(StoreError::Conflict("Cannot delete system role".into()));
        }

        let code = inner.roles[index].code.clone();
        let in_use = inner.users.iter().any(|u| u.roles.contains(&code));
        if in_use {
            return Err(StoreError::Conflict(
                "Role is in use and cannot be deleted".into(),
            ));
        }

        inner.roles.remove(index);
        Ok(())
    }

    async fn user_count_for_role(&self, code: &str) -> StoreResult<u64> {
        Ok(self
            .inner
            .read()
            .users
            .iter()
            .filter(|u| u.roles.iter().any(|r| r == code))
            .count() as u64)
    }

    // ========== Permissions ==========

    async fn permissions(&self) -> StoreResult<Vec<Permission>> {
        Ok(self.inner.read().permissions.clone())
    }

    async fn permission(&self, id: &str) -> StoreResult<Option<Permission>> {
        Ok(self
            .inner
            .read()
            .permissions
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create_permission(&self, draft: NewPermission) -> StoreResult<Permission> {
        let mut inner = self.inner.write();

        if inner.permissions.iter().any(|p| p.code == draft.code) {
            return Err(StoreError::Conflict(
                "Permission code already exists".into(),
            ));
        }
        if let Some(parent_id) = &draft.parent_id
            && !inner.permissions.iter().any(|p| &p.id == parent_id)
        {
            return Err(StoreError::NotFound("Parent permission not found".into()));
        }

        let now = Utc::now();
        let sort = draft.sort.unwrap_or(inner.permissions.len() as i32 + 1);
        let permission = Permission {
            id: inner.alloc_permission_id(),
            name: draft.name,
            code: draft.code,
            kind: draft.kind,
            parent_id: draft.parent_id,
            path: draft.path,
            component: draft.component,
            icon: draft.icon,
            sort,
            status: draft.status,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        inner.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn update_permission(&self, id: &str, patch: PermissionPatch) -> StoreResult<Permission> {
        let mut inner = self.inner.write();

        let index = inner
            .permissions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Permission {id} not found")))?;

        if let Some(code) = &patch.code
            && inner
                .permissions
                .iter()
                .any(|p| p.id != id && &p.code == code)
        {
            return Err(StoreError::Conflict(
                "Permission code already exists".into(),
            ));
        }

        if let Some(parent_id) = &patch.parent_id {
            if !inner.permissions.iter().any(|p| &p.id == parent_id) {
                return Err(StoreError::NotFound("Parent permission not found".into()));
            }
            if rbac::would_create_cycle(id, parent_id, &inner.permissions) {
                return Err(StoreError::Conflict(
                    "Cannot set a permission's parent to one of its descendants".into(),
                ));
            }
        }

        let permission = &mut inner.permissions[index];
        if let Some(name) = patch.name {
            permission.name = name;
        }
        if let Some(code) = patch.code {
            permission.code = code;
        }
        if let Some(kind) = patch.kind {
            permission.kind = kind;
        }
        if let Some(parent_id) = patch.parent_id {
            permission.parent_id = Some(parent_id);
        }
        if let Some(path) = patch.path {
            permission.path = Some(path);
        }
        if let Some(component) = patch.component {
            permission.component = Some(component);
        }
        if let Some(icon) = patch.icon {
            permission.icon = Some(icon);
        }
        if let Some(sort) = patch.sort {
            permission.sort = sort;
        }
        if let Some(status) = patch.status {
            permission.status = status;
        }
        if let Some(description) = patch.description {
            permission.description = Some(description);
        }
        permission.updated_at = Utc::now();

        Ok(permission.clone())
    }

    async fn delete_permission(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();

        let index = inner
            .permissions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Permission {id} not found")))?;

        let has_children = inner
            .permissions
            .iter()
            .any(|p| p.parent_id.as_deref() == Some(id));
        if has_children {
            return Err(StoreError::Conflict(
                "Permission has child permissions and cannot be deleted".into(),
            ));
        }

        inner.permissions.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PermissionStatus, PermissionType, RoleStatus, UserStatus};

    fn new_user(username: &str, email: &str, roles: &[&str]) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone: None,
            nickname: None,
            avatar: None,
            status: UserStatus::Active,
            email_verified: false,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: vec![],
        }
    }

    fn new_role(code: &str, kind: RoleType) -> NewRole {
        NewRole {
            name: code.to_string(),
            code: code.to_string(),
            description: None,
            kind,
            status: RoleStatus::Active,
            sort: None,
            permissions: vec![],
        }
    }

    fn new_permission(code: &str, parent_id: Option<&str>) -> NewPermission {
        NewPermission {
            name: code.to_string(),
            code: code.to_string(),
            kind: PermissionType::Api,
            parent_id: parent_id.map(str::to_string),
            path: None,
            component: None,
            icon: None,
            sort: None,
            status: PermissionStatus::Active,
            description: None,
        }
    }

    #[tokio::test]
    async fn user_uniqueness_is_enforced() {
        let store = MemoryDirectory::new();
        store
            .create_user(new_user("alice", "alice@example.com", &[]))
            .await
            .unwrap();

        let dup_name = store
            .create_user(new_user("alice", "other@example.com", &[]))
            .await;
        assert!(matches!(dup_name, Err(StoreError::Conflict(_))));

        let dup_mail = store
            .create_user(new_user("bob", "alice@example.com", &[]))
            .await;
        assert!(matches!(dup_mail, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryDirectory::new();
        let first = store
            .create_user(new_user("one", "one@example.com", &[]))
            .await
            .unwrap();
        store.delete_user(&first.id).await.unwrap();

        let second = store
            .create_user(new_user("two", "two@example.com", &[]))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn system_role_delete_is_rejected_even_with_no_users() {
        let store = MemoryDirectory::new();
        let role = store
            .create_role(new_role("builtin", RoleType::System))
            .await
            .unwrap();
        assert_eq!(store.user_count_for_role("builtin").await.unwrap(), 0);

        let result = store.delete_role(&role.id).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn role_in_use_cannot_be_deleted() {
        let store = MemoryDirectory::new();
        let role = store
            .create_role(new_role("editor", RoleType::Custom))
            .await
            .unwrap();
        store
            .create_user(new_user("amy", "amy@example.com", &["editor"]))
            .await
            .unwrap();

        let blocked = store.delete_role(&role.id).await;
        assert!(matches!(blocked, Err(StoreError::Conflict(_))));

        // Once the only holder drops the role the delete goes through
        let user = store.user_by_username("amy").await.unwrap().unwrap();
        store
            .update_user(
                &user.id,
                UserPatch {
                    roles: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.delete_role(&role.id).await.unwrap();
    }

    #[tokio::test]
    async fn bootstrap_accounts_cannot_be_deleted() {
        let store = MemoryDirectory::new();
        let admin = store
            .create_user(new_user("superadmin", "root@example.com", &[]))
            .await
            .unwrap();

        let result = store.delete_user(&admin.id).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn reparenting_onto_descendant_is_rejected() {
        let store = MemoryDirectory::new();
        let parent = store.create_permission(new_permission("p", None)).await.unwrap();
        let child = store
            .create_permission(new_permission("c", Some(&parent.id)))
            .await
            .unwrap();

        let cycle = store
            .update_permission(
                &parent.id,
                PermissionPatch {
                    parent_id: Some(child.id.clone()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(cycle, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn permission_with_children_cannot_be_deleted() {
        let store = MemoryDirectory::new();
        let parent = store.create_permission(new_permission("p", None)).await.unwrap();
        store
            .create_permission(new_permission("c", Some(&parent.id)))
            .await
            .unwrap();

        let blocked = store.delete_permission(&parent.id).await;
        assert!(matches!(blocked, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn dangling_parent_reference_is_rejected_on_create() {
        let store = MemoryDirectory::new();
        let result = store.create_permission(new_permission("x", Some("404"))).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
