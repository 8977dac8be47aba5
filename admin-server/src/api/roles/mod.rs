//! Role API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_any_permission;
use crate::core::ServerState;

/// Role router - each route group declares its required permission codes
pub fn router() -> Router<ServerState> {
    let view_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_any_permission(&["role:view"])));

    // The options list also serves the user-edit screen, so either
    // role:view or user:update unlocks it
    let options_routes = Router::new()
        .route("/options", get(handler::options))
        .layer(middleware::from_fn(require_any_permission(&[
            "role:view",
            "user:update",
        ])));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_any_permission(&["role:create"])));

    let update_routes = Router::new()
        .route("/{id}", patch(handler::update))
        .route("/{id}/permissions", post(handler::assign_permissions))
        .layer(middleware::from_fn(require_any_permission(&["role:update"])));

    let delete_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_any_permission(&["role:delete"])));

    Router::new().nest(
        "/api/roles",
        view_routes
            .merge(options_routes)
            .merge(create_routes)
            .merge(update_routes)
            .merge(delete_routes),
    )
}
