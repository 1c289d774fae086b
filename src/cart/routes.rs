//! Cart routes - every endpoint requires a resolved session

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::auth::session_guard;

pub fn cart_routes() -> Router {
    Router::new()
        .route("/api/v1/cart", get(handlers::get_cart))
        .route("/api/v1/cart/add-cart", post(handlers::add_to_cart))
        .route("/api/v1/cart/merge-carts", post(handlers::merge_carts))
        .route(
            "/api/v1/cart/update-cart/:id",
            patch(handlers::update_cart_item),
        )
        .route(
            "/api/v1/cart/delete-cart/:id",
            delete(handlers::remove_from_cart),
        )
        .route("/api/v1/cart/clear-cart", delete(handlers::clear_cart))
        .route_layer(middleware::from_fn(session_guard))
}
