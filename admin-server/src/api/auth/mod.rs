//! Auth API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Auth router
///
/// login/register/refresh are public (listed in
/// [`crate::auth::PUBLIC_ROUTES`]); logout and profile require
/// authentication but no specific permission.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/refresh", post(handler::refresh))
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/profile", get(handler::profile))
}
