//! Contact settings and message routes

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::auth::{require_admin_access, session_guard};

pub fn contact_settings_routes() -> Router {
    let admin = Router::new()
        .route(
            "/api/v1/contact-settings/all",
            get(handlers::list_contact_settings),
        )
        .route(
            "/api/v1/contact-settings",
            post(handlers::create_contact_setting).put(handlers::upsert_contact_setting),
        )
        .route(
            "/api/v1/contact-settings/:id",
            put(handlers::update_contact_setting).delete(handlers::delete_contact_setting),
        )
        .route(
            "/api/v1/contact-settings/:id/toggle",
            post(handlers::toggle_contact_setting),
        )
        .route_layer(middleware::from_fn(require_admin_access))
        .route_layer(middleware::from_fn(session_guard));

    Router::new()
        .route(
            "/api/v1/contact-settings",
            get(handlers::get_contact_setting),
        )
        .merge(admin)
}

pub fn messages_routes() -> Router {
    let admin = Router::new()
        .route("/api/v1/messages", get(handlers::get_messages))
        .route(
            "/api/v1/messages/:id",
            get(handlers::get_message)
                .patch(handlers::update_message)
                .delete(handlers::delete_message),
        )
        .route(
            "/api/v1/messages/:id/read",
            post(handlers::mark_message_read),
        )
        .route(
            "/api/v1/messages/:id/archive",
            post(handlers::archive_message),
        )
        .route_layer(middleware::from_fn(require_admin_access))
        .route_layer(middleware::from_fn(session_guard));

    Router::new()
        .route("/api/v1/messages", post(handlers::create_message))
        .merge(admin)
}
