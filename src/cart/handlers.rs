//! Cart handlers

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{AddToCartRequest, MergeCartsRequest, UpdateCartItemRequest};
use super::services::CartService;
use crate::auth::CurrentUser;
use crate::common::{ApiError, ApiResponse, AppState};
use crate::products::models::Product;

async fn ensure_product_exists(state: &AppState, product_id: &str) -> Result<(), ApiError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if product.is_none() {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }
    Ok(())
}

/// GET /api/v1/cart
pub async fn get_cart(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let service = CartService::new(state.db.clone());

    match service.find_by_user(&user.id).await? {
        Some(cart) => {
            let expanded = service.expand(cart).await?;
            Ok(ApiResponse::ok(
                serde_json::to_value(expanded).map_err(|e| {
                    ApiError::InternalServer(format!("failed to encode cart: {}", e))
                })?,
                "Cart fetched successfully",
            ))
        }
        None => Ok(ApiResponse::ok(
            serde_json::json!({ "items": [] }),
            "Cart fetched successfully",
        )),
    }
}

/// POST /api/v1/cart/add-cart
pub async fn add_to_cart(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.product_id.is_empty() || payload.quantity < 1 {
        return Err(ApiError::BadRequest(
            "Product ID and quantity are required".to_string(),
        ));
    }

    ensure_product_exists(&state, &payload.product_id).await?;

    let service = CartService::new(state.db.clone());
    let cart = service
        .add_item(&user.id, &payload.product_id, payload.quantity)
        .await?;

    info!(
        user_id = %user.id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        "Item added to cart"
    );

    Ok(ApiResponse::ok(cart, "Item added to cart"))
}

/// POST /api/v1/cart/merge-carts
///
/// Reconciles a client-held cart into the persisted one. Quantities for
/// products already in the cart are accumulated, so replaying the same
/// local cart adds its quantities again.
pub async fn merge_carts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<MergeCartsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.local_cart.iter().any(|item| item.quantity < 1) {
        return Err(ApiError::BadRequest(
            "Cart item quantities must be at least 1".to_string(),
        ));
    }

    let service = CartService::new(state.db.clone());
    let cart = service.merge(&user.id, &payload.local_cart).await?;
    let expanded = service.expand(cart).await?;

    info!(
        user_id = %user.id,
        incoming_items = payload.local_cart.len(),
        "Carts merged"
    );

    Ok(ApiResponse::ok(
        serde_json::to_value(expanded)
            .map_err(|e| ApiError::InternalServer(format!("failed to encode cart: {}", e)))?,
        "Carts merged successfully",
    ))
}

/// PATCH /api/v1/cart/update-cart/:id
pub async fn update_cart_item(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.quantity < 1 {
        return Err(ApiError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let service = CartService::new(state.db.clone());
    let cart = service
        .update_item(&user.id, &product_id, payload.quantity)
        .await?;

    Ok(ApiResponse::ok(cart, "Cart updated"))
}

/// DELETE /api/v1/cart/delete-cart/:id
pub async fn remove_from_cart(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let service = CartService::new(state.db.clone());
    let cart = service.remove_item(&user.id, &product_id).await?;

    Ok(ApiResponse::ok(cart, "Item removed from cart"))
}

/// DELETE /api/v1/cart/clear-cart
pub async fn clear_cart(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let service = CartService::new(state.db.clone());
    service.clear(&user.id).await?;

    info!(user_id = %user.id, "Cart cleared");

    Ok(ApiResponse::ok((), "Cart cleared"))
}
