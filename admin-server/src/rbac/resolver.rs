//! Effective-Permission Resolver
//!
//! Computes a user's full permission set: direct grants ∪ the permissions
//! of every assigned role. The set is recomputed from the directory on
//! demand and never cached, so it always reflects current store state.

use std::collections::HashSet;
use std::sync::Arc;

use shared::models::{Role, User};

use crate::store::{Directory, StoreError};
use crate::utils::AppError;

/// Resolution error
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("User {0} not found")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::UserNotFound(id) => AppError::NotFound(format!("User {id} not found")),
            ResolveError::Store(e) => e.into(),
        }
    }
}

/// Union of direct and role-derived permission codes, deduplicated in
/// first-seen order (direct grants first, then roles in assignment order).
///
/// Role codes that do not resolve to an existing role are skipped — stale
/// assignments must not break resolution.
pub fn effective_permissions(user: &User, roles: &[Role]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut resolved: Vec<String> = Vec::new();

    for code in &user.permissions {
        if seen.insert(code) {
            resolved.push(code.clone());
        }
    }

    for role_code in &user.roles {
        let Some(role) = roles.iter().find(|r| &r.code == role_code) else {
            continue;
        };
        for code in &role.permissions {
            if seen.insert(code) {
                resolved.push(code.clone());
            }
        }
    }

    resolved
}

/// Directory-backed resolver
#[derive(Clone)]
pub struct Resolver {
    directory: Arc<dyn Directory>,
}

impl Resolver {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Resolve the effective permission codes of `user_id`.
    pub async fn resolve(&self, user_id: &str) -> Result<Vec<String>, ResolveError> {
        let user = self
            .directory
            .user(user_id)
            .await?
            .ok_or_else(|| ResolveError::UserNotFound(user_id.to_string()))?;
        self.resolve_for(&user).await
    }

    /// Resolve for an already-loaded user record.
    pub async fn resolve_for(&self, user: &User) -> Result<Vec<String>, ResolveError> {
        let roles = self.directory.roles().await?;
        Ok(effective_permissions(user, &roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::{RoleStatus, RoleType, UserStatus};

    fn role(code: &str, permissions: &[&str]) -> Role {
        let now = Utc::now();
        Role {
            id: code.to_string(),
            name: code.to_string(),
            code: code.to_string(),
            description: None,
            kind: RoleType::Custom,
            status: RoleStatus::Active,
            sort: 1,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user(direct: &[&str], roles: &[&str]) -> User {
        let now = Utc::now();
        User {
            id: "u1".to_string(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: String::new(),
            phone: None,
            avatar: None,
            nickname: None,
            status: UserStatus::Active,
            email_verified: true,
            last_login_at: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: direct.iter().map(|p| p.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unions_direct_and_role_permissions() {
        let roles = vec![role("r", &["p1", "p2"])];
        let resolved = effective_permissions(&user(&["p3"], &["r"]), &roles);
        assert_eq!(resolved, vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn deduplicates_in_first_seen_order() {
        let roles = vec![role("a", &["p1", "p2"]), role("b", &["p2", "p3"])];
        let resolved = effective_permissions(&user(&["p2"], &["a", "b"]), &roles);
        assert_eq!(resolved, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn unknown_role_codes_are_skipped() {
        let roles = vec![role("known", &["p1"])];
        let resolved = effective_permissions(&user(&[], &["ghost", "known"]), &roles);
        assert_eq!(resolved, vec!["p1"]);
    }

    #[test]
    fn result_is_superset_of_direct_and_role_grants() {
        let roles = vec![role("a", &["p1", "p4"]), role("b", &["p5"])];
        let u = user(&["p0", "p4"], &["a", "b"]);
        let resolved = effective_permissions(&u, &roles);

        for direct in &u.permissions {
            assert!(resolved.contains(direct));
        }
        for r in &roles {
            for p in &r.permissions {
                assert!(resolved.contains(p));
            }
        }
    }
}
