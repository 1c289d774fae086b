//! Admin profile routes

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use crate::auth::{require_admin_access, session_guard};

/// Creates the admin profile router.
/// Listing needs ADMINS:VIEW; mutations are SUPER_ADMIN only (checked in
/// the handlers).
pub fn admin_routes() -> Router {
    Router::new()
        .route(
            "/api/v1/admins",
            get(handlers::list_admin_profiles).post(handlers::create_admin_profile),
        )
        .route("/api/v1/admins/:id", patch(handlers::update_admin_profile))
        .route(
            "/api/v1/admins/:id/toggle",
            post(handlers::toggle_admin_profile),
        )
        .route_layer(middleware::from_fn(require_admin_access))
        .route_layer(middleware::from_fn(session_guard))
}
