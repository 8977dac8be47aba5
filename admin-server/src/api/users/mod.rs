//! User API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_any_permission;
use crate::core::ServerState;

/// User router - each route group declares its required permission codes
pub fn router() -> Router<ServerState> {
    let view_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_any_permission(&["user:view"])));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_any_permission(&["user:create"])));

    let update_routes = Router::new()
        .route("/{id}", patch(handler::update))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/roles", post(handler::assign_roles))
        .layer(middleware::from_fn(require_any_permission(&["user:update"])));

    let delete_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .route("/batch-delete", post(handler::batch_delete))
        .layer(middleware::from_fn(require_any_permission(&["user:delete"])));

    Router::new().nest(
        "/api/users",
        view_routes
            .merge(create_routes)
            .merge(update_routes)
            .merge(delete_routes),
    )
}
