//! Permission API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_any_permission;
use crate::core::ServerState;

/// Permission router - each route group declares its required permission codes
pub fn router() -> Router<ServerState> {
    let view_routes = Router::new()
        .route("/", get(handler::list))
        .route("/tree", get(handler::tree))
        .route("/menu-tree", get(handler::menu_tree))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_any_permission(&[
            "permission:view",
        ])));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_any_permission(&[
            "permission:create",
        ])));

    let update_routes = Router::new()
        .route("/{id}", patch(handler::update))
        .layer(middleware::from_fn(require_any_permission(&[
            "permission:update",
        ])));

    let delete_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_any_permission(&[
            "permission:delete",
        ])));

    Router::new().nest(
        "/api/permissions",
        view_routes
            .merge(create_routes)
            .merge(update_routes)
            .merge(delete_routes),
    )
}
