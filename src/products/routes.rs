//! Product routes - public reads, permission-gated writes

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::auth::{require_admin_access, session_guard};

pub fn products_routes() -> Router {
    let admin = Router::new()
        .route(
            "/api/v1/products/add-product",
            post(handlers::create_product),
        )
        .route(
            "/api/v1/products/update-product/:id",
            patch(handlers::update_product),
        )
        .route(
            "/api/v1/products/delete-product/:id",
            delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(require_admin_access))
        .route_layer(middleware::from_fn(session_guard));

    Router::new()
        .route("/api/v1/products", get(handlers::get_products))
        .route("/api/v1/products/:id", get(handlers::get_product_by_id))
        .merge(admin)
}
