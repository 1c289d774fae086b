//! Story routes - public reads, role-gated writes

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::auth::session_guard;

pub fn stories_routes() -> Router {
    let editors = Router::new()
        .route("/api/v1/stories", post(handlers::create_story))
        .route(
            "/api/v1/stories/:id",
            put(handlers::update_story).delete(handlers::delete_story),
        )
        .route_layer(middleware::from_fn(session_guard));

    Router::new()
        .route("/api/v1/stories", get(handlers::get_stories))
        .route("/api/v1/stories/:id", get(handlers::get_story_by_id))
        .merge(editors)
}
