//! Bootstrap Dataset
//!
//! The directory the console ships with: the permission catalogue, the
//! built-in roles and a set of demo accounts covering every account status.
//! All accounts share the password `password123` (hashed once at boot).

use chrono::{DateTime, TimeZone, Utc};
use shared::models::{
    Permission, PermissionStatus, PermissionType, Role, RoleStatus, RoleType, User, UserStatus,
};

use crate::auth::password;

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn menu(
    id: &str,
    name: &str,
    code: &str,
    parent: Option<&str>,
    path: &str,
    component: &str,
    icon: &str,
    sort: i32,
) -> Permission {
    Permission {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        kind: PermissionType::Menu,
        parent_id: parent.map(str::to_string),
        path: Some(path.to_string()),
        component: Some(component.to_string()),
        icon: Some(icon.to_string()),
        sort,
        status: PermissionStatus::Active,
        description: None,
        created_at: at(2023, 1, 1),
        updated_at: at(2023, 1, 1),
    }
}

fn op(id: &str, name: &str, code: &str, kind: PermissionType, parent: &str, sort: i32) -> Permission {
    Permission {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        kind,
        parent_id: Some(parent.to_string()),
        path: None,
        component: None,
        icon: None,
        sort,
        status: PermissionStatus::Active,
        description: None,
        created_at: at(2023, 1, 1),
        updated_at: at(2023, 1, 1),
    }
}

#[allow(clippy::too_many_arguments)]
fn role(
    id: &str,
    name: &str,
    code: &str,
    description: &str,
    kind: RoleType,
    status: RoleStatus,
    sort: i32,
    permissions: &[&str],
) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        description: Some(description.to_string()),
        kind,
        status,
        sort,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        created_at: at(2023, 1, 1),
        updated_at: at(2023, 1, 1),
    }
}

#[allow(clippy::too_many_arguments)]
fn account(
    id: &str,
    username: &str,
    nickname: &str,
    status: UserStatus,
    email_verified: bool,
    roles: &[&str],
    permissions: &[&str],
    created_at: DateTime<Utc>,
    password_hash: &str,
) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: password_hash.to_string(),
        phone: None,
        avatar: None,
        nickname: Some(nickname.to_string()),
        status,
        email_verified,
        last_login_at: None,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        created_at,
        updated_at: created_at,
    }
}

/// Produce the bootstrap records
pub fn records() -> (Vec<Permission>, Vec<Role>, Vec<User>) {
    use PermissionType::{Api, Button};

    let permissions = vec![
        // 系统管理
        menu("1", "系统管理", "system", None, "/system", "Layout", "system", 1),
        // 用户管理
        menu("2", "用户管理", "user-management", Some("1"), "/system/user", "views/system/user/index", "user", 1),
        op("3", "查看用户", "user:view", Api, "2", 1),
        op("4", "创建用户", "user:create", Button, "2", 2),
        op("5", "编辑用户", "user:update", Button, "2", 3),
        op("6", "删除用户", "user:delete", Button, "2", 4),
        // 角色管理
        menu("7", "角色管理", "role-management", Some("1"), "/system/role", "views/system/role/index", "role", 2),
        op("8", "查看角色", "role:view", Api, "7", 1),
        op("9", "创建角色", "role:create", Button, "7", 2),
        op("10", "编辑角色", "role:update", Button, "7", 3),
        op("11", "删除角色", "role:delete", Button, "7", 4),
        // 权限管理
        menu("12", "权限管理", "permission-management", Some("1"), "/system/permission", "views/system/permission/index", "permission", 3),
        op("13", "查看权限", "permission:view", Api, "12", 1),
        op("14", "创建权限", "permission:create", Button, "12", 2),
        op("15", "编辑权限", "permission:update", Button, "12", 3),
        op("16", "删除权限", "permission:delete", Button, "12", 4),
        // 仪表盘
        menu("17", "仪表盘", "dashboard", None, "/dashboard", "views/dashboard/index", "dashboard", 0),
        // 内容管理
        menu("18", "内容管理", "content", None, "/content", "Layout", "content", 2),
        menu("19", "文章管理", "article-management", Some("18"), "/content/article", "views/content/article/index", "article", 1),
        op("20", "查看文章", "article:view", Api, "19", 1),
        op("21", "创建文章", "article:create", Button, "19", 2),
        op("22", "编辑文章", "article:update", Button, "19", 3),
        op("23", "删除文章", "article:delete", Button, "19", 4),
        op("24", "发布文章", "article:publish", Button, "19", 5),
        // 系统设置
        menu("25", "系统设置", "system-config", Some("1"), "/system/config", "views/system/config/index", "config", 4),
        op("26", "查看配置", "config:view", Api, "25", 1),
        op("27", "修改配置", "config:update", Button, "25", 2),
        // 系统日志
        menu("28", "系统日志", "system-log", Some("1"), "/system/log", "views/system/log/index", "log", 5),
        op("29", "查看日志", "log:view", Api, "28", 1),
        op("30", "清理日志", "log:clear", Button, "28", 2),
    ];

    let roles = vec![
        role(
            "1",
            "超级管理员",
            "super_admin",
            "系统超级管理员，拥有所有权限",
            RoleType::System,
            RoleStatus::Active,
            1,
            &[
                "dashboard",
                "user:view", "user:create", "user:update", "user:delete",
                "role:view", "role:create", "role:update", "role:delete",
                "permission:view", "permission:create", "permission:update", "permission:delete",
                "article:view", "article:create", "article:update", "article:delete", "article:publish",
                "config:view", "config:update",
                "log:view", "log:clear",
            ],
        ),
        role(
            "2",
            "系统管理员",
            "admin",
            "系统管理员，拥有大部分管理权限",
            RoleType::System,
            RoleStatus::Active,
            2,
            &[
                "dashboard",
                "user:view", "user:create", "user:update", "user:delete",
                "role:view", "permission:view",
                "article:view", "article:create", "article:update", "article:delete", "article:publish",
                "config:view", "log:view",
            ],
        ),
        role(
            "3",
            "内容管理员",
            "content_admin",
            "内容管理员，负责内容相关的管理工作",
            RoleType::Custom,
            RoleStatus::Active,
            3,
            &["dashboard", "article:view", "article:create", "article:update", "article:delete", "article:publish"],
        ),
        role(
            "4",
            "内容编辑",
            "editor",
            "内容编辑，可以创建和编辑内容",
            RoleType::Custom,
            RoleStatus::Active,
            4,
            &["dashboard", "article:view", "article:create", "article:update"],
        ),
        role(
            "5",
            "普通用户",
            "user",
            "普通用户，只有基本的查看权限",
            RoleType::System,
            RoleStatus::Active,
            5,
            &["dashboard", "article:view"],
        ),
        role(
            "6",
            "审核员",
            "reviewer",
            "审核员，负责内容审核工作",
            RoleType::Custom,
            RoleStatus::Active,
            6,
            &["dashboard", "article:view", "article:update", "article:publish"],
        ),
        role(
            "7",
            "访客",
            "guest",
            "访客角色，仅有最基本的查看权限",
            RoleType::System,
            RoleStatus::Active,
            7,
            &["dashboard"],
        ),
        role(
            "8",
            "测试角色",
            "test_role",
            "测试用角色，用于功能测试",
            RoleType::Custom,
            RoleStatus::Inactive,
            8,
            &["dashboard", "user:view"],
        ),
    ];

    // One argon2 hash shared by every demo account
    let hash = password::hash("password123").expect("failed to hash seed password");

    let users = vec![
        account("1", "superadmin", "超级管理员", UserStatus::Active, true, &["super_admin"], &[], at(2023, 1, 1), &hash),
        account("2", "admin", "管理员", UserStatus::Active, true, &["admin"], &[], at(2023, 1, 1), &hash),
        account("3", "contentadmin", "内容管理员", UserStatus::Active, true, &["content_admin"], &[], at(2023, 1, 15), &hash),
        account("4", "editor1", "编辑小王", UserStatus::Active, true, &["editor"], &[], at(2023, 2, 1), &hash),
        account("5", "editor2", "编辑小赵", UserStatus::Active, false, &["editor"], &[], at(2023, 2, 15), &hash),
        account("6", "reviewer", "审核员", UserStatus::Active, true, &["reviewer"], &[], at(2023, 3, 1), &hash),
        account("7", "user1", "普通用户1", UserStatus::Active, true, &["user"], &[], at(2023, 3, 15), &hash),
        account("8", "user2", "普通用户2", UserStatus::Inactive, false, &["user"], &[], at(2023, 4, 1), &hash),
        account("9", "testuser1", "测试用户1", UserStatus::Pending, false, &["user"], &[], at(2023, 4, 15), &hash),
        account("10", "banneduser", "被封用户", UserStatus::Banned, true, &["user"], &[], at(2023, 2, 1), &hash),
        // 多角色用户，带一条额外的直接权限
        account("11", "multiuser", "多角色用户", UserStatus::Active, true, &["editor", "reviewer"], &["user:view"], at(2023, 3, 20), &hash),
        account("12", "guest", "访客用户", UserStatus::Active, false, &["guest"], &[], at(2023, 5, 1), &hash),
    ];

    (permissions, roles, users)
}
