//! End-to-end RBAC tests: guard semantics, admin CRUD invariants,
//! permission tree endpoints

mod common;

use http::StatusCode;
use serde_json::json;

use common::{app, login, request};

#[tokio::test]
async fn guard_rejects_callers_without_the_required_code() {
    let app = app();
    // user1 only holds dashboard + article:view through the `user` role
    let token = login(&app, "user1", "password123").await;

    let (status, body) = request(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn guard_passes_any_one_of_the_required_codes() {
    let app = app();
    let admin_token = login(&app, "superadmin", "password123").await;

    // A role granting user:update but NOT role:view
    let (status, _) = request(
        &app,
        "POST",
        "/api/roles",
        Some(&admin_token),
        Some(json!({
            "name": "用户专员",
            "code": "user_clerk",
            "permissions": ["user:view", "user:update"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "username": "clerk",
            "email": "clerk@example.com",
            "password": "password123",
            "roles": ["user_clerk"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let clerk_token = login(&app, "clerk", "password123").await;

    // /api/roles/options requires role:view OR user:update - the clerk
    // holds only the second and must pass
    let (status, _) = request(&app, "GET", "/api/roles/options", Some(&clerk_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The plain role listing requires role:view and stays closed
    let (status, _) = request(&app, "GET", "/api/roles", Some(&clerk_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn permission_revocation_takes_effect_immediately() {
    let app = app();
    let super_token = login(&app, "superadmin", "password123").await;
    let admin_token = login(&app, "admin", "password123").await;

    // Works while the admin role still carries user:view
    let (status, _) = request(&app, "GET", "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Strip the role down to the dashboard (wholesale replace)
    let (status, _) = request(
        &app,
        "POST",
        "/api/roles/2/permissions",
        Some(&super_token),
        Some(json!({"permissions": ["dashboard"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The old token is still valid, but the guard re-resolves permissions
    // from the store and must now refuse
    let (status, _) = request(&app, "GET", "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_listing_carries_pagination_envelope() {
    let app = app();
    let token = login(&app, "admin", "password123").await;

    let (status, body) = request(&app, "GET", "/api/users?page=2&limit=5", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["total"], 12);
    assert_eq!(data["page"], 2);
    assert_eq!(data["limit"], 5);
    assert_eq!(data["totalPages"], 3);
    assert_eq!(data["hasNext"], true);
    assert_eq!(data["hasPrev"], true);
    assert_eq!(data["items"].as_array().map(Vec::len), Some(5));

    // Password hashes never leak through the API
    assert!(data["items"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn user_filters_narrow_the_listing() {
    let app = app();
    let token = login(&app, "admin", "password123").await;

    let (_, body) = request(
        &app,
        "GET",
        "/api/users?status=banned",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["username"], "banneduser");

    let (_, body) = request(
        &app,
        "GET",
        "/api/users?role=editor&keyword=editor",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn deleting_a_system_role_is_a_conflict() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    let (status, body) = request(&app, "DELETE", "/api/roles/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot delete system role");
}

#[tokio::test]
async fn deleting_a_role_in_use_is_a_conflict() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    // editor is custom but held by three seeded users
    let (status, _) = request(&app, "DELETE", "/api/roles/4", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cyclic_permission_reparenting_is_a_conflict() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    // Seed: permission 3's parent is 2. Setting 2's parent to 3 closes a loop.
    let (status, body) = request(
        &app,
        "PATCH",
        "/api/permissions/2",
        Some(&token),
        Some(json!({"parentId": "3"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn permission_tree_is_nested_and_sorted() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    let (status, body) = request(&app, "GET", "/api/permissions/tree", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let roots = body["data"].as_array().expect("tree roots");
    // dashboard has sort 0 and leads the forest
    assert_eq!(roots[0]["code"], "dashboard");

    let system = roots
        .iter()
        .find(|n| n["code"] == "system")
        .expect("system root");
    let children: Vec<_> = system["children"]
        .as_array()
        .expect("system children")
        .iter()
        .map(|c| c["code"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        children,
        vec![
            "user-management",
            "role-management",
            "permission-management",
            "system-config",
            "system-log"
        ]
    );
}

#[tokio::test]
async fn menu_tree_contains_only_menu_permissions() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    let (status, body) = request(&app, "GET", "/api/permissions/menu-tree", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    fn assert_menu(node: &serde_json::Value) {
        assert_eq!(node["type"], "menu");
        for child in node["children"].as_array().into_iter().flatten() {
            assert_menu(child);
        }
    }
    for root in body["data"].as_array().expect("roots") {
        assert_menu(root);
    }
}

#[tokio::test]
async fn batch_delete_reports_each_item() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/users/batch-delete",
        Some(&token),
        Some(json!({"ids": ["7", "999", "1"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["success"], 1);
    assert_eq!(data["failed"], 2);
    let errors = data["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["id"], "999");
    assert_eq!(errors[1]["id"], "1");
}

#[tokio::test]
async fn assigning_roles_replaces_and_reshapes_permissions() {
    let app = app();
    let admin_token = login(&app, "superadmin", "password123").await;

    // user1 starts with the `user` role only
    let (status, body) = request(
        &app,
        "POST",
        "/api/users/7/roles",
        Some(&admin_token),
        Some(json!({"roles": ["content_admin"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["roles"][0], "content_admin");

    // The fresh session reflects the new role's permission set
    let token = login(&app, "user1", "password123").await;
    let (_, profile) = request(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    let codes: Vec<_> = profile["data"]["permissions"]
        .as_array()
        .expect("permissions")
        .iter()
        .map(|p| p["code"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(codes.contains(&"article:publish".to_string()));
}

#[tokio::test]
async fn duplicate_role_code_is_a_conflict() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({"name": "复制品", "code": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_entities_return_not_found() {
    let app = app();
    let token = login(&app, "superadmin", "password123").await;

    let (status, _) = request(&app, "GET", "/api/users/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "GET", "/api/roles/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "GET", "/api/permissions/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
