//! Order routes - every endpoint requires a resolved session

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;
use crate::auth::session_guard;

pub fn orders_routes() -> Router {
    Router::new()
        .route("/api/v1/orders/create-order", post(handlers::create_order))
        .route("/api/v1/orders/get-all", get(handlers::get_user_orders))
        .route("/api/v1/orders/:id", get(handlers::get_order_by_id))
        .route(
            "/api/v1/orders/delete-order/:id",
            delete(handlers::delete_order),
        )
        .route(
            "/api/v1/orders/return-order/:id",
            post(handlers::return_order),
        )
        .route(
            "/api/v1/orders/status-order/:id",
            put(handlers::update_order_status),
        )
        .route(
            "/api/v1/orders/cancel-order/:id",
            post(handlers::cancel_order),
        )
        .route_layer(middleware::from_fn(session_guard))
}
