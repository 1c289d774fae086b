//! Order handlers

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{
    CreateOrderRequest, Order, OrderItem, UpdateOrderStatusRequest, CANCELLABLE_STATUSES,
    ORDER_STATUSES,
};
use crate::auth::models::Role;
use crate::auth::permissions::authorize_roles;
use crate::auth::CurrentUser;
use crate::cart::models::CartItem;
use crate::cart::services::CartService;
use crate::common::pagination::PageQuery;
use crate::common::{
    generate_order_id, ApiError, ApiResponse, AppState, Pagination,
};
use crate::products::models::Product;

const STAFF_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::SubAdmin];

async fn find_order(state: &AppState, order_id: &str) -> Result<Order, ApiError> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
}

/// Owner may act on their own order; staff roles on any
fn ensure_owner_or_staff(order: &Order, user: &CurrentUser) -> Result<(), ApiError> {
    if order.user_id == user.id || STAFF_ROLES.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not have access to this order".to_string(),
        ))
    }
}

/// Snapshot products for the given lines and compute the order total
async fn build_order_items(
    state: &AppState,
    lines: &[CartItem],
) -> Result<(Vec<OrderItem>, f64), ApiError> {
    let mut items = Vec::new();
    let mut total = 0.0;

    for line in lines {
        if line.quantity < 1 {
            return Err(ApiError::BadRequest(
                "Order item quantities must be at least 1".to_string(),
            ));
        }

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(&line.product_id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| {
                ApiError::BadRequest(format!("Product not found: {}", line.product_id))
            })?;

        let unit_price = (product.price - product.discount).max(0.0);
        total += unit_price * line.quantity as f64;

        items.push(OrderItem {
            product_id: product.id,
            name: product.name,
            price: unit_price,
            quantity: line.quantity,
        });
    }

    Ok((items, total))
}

/// POST /api/v1/orders/create-order
///
/// Builds the order from an explicit item list, or from the caller's cart
/// when no list is given (the cart is cleared afterwards in that case).
pub async fn create_order(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let cart_service = CartService::new(state.db.clone());

    let (lines, from_cart) = match payload.items {
        Some(items) if !items.is_empty() => (items, false),
        _ => {
            let cart = cart_service
                .find_by_user(&user.id)
                .await?
                .ok_or_else(|| ApiError::BadRequest("Cart is empty".to_string()))?;
            let lines = cart.line_items();
            if lines.is_empty() {
                return Err(ApiError::BadRequest("Cart is empty".to_string()));
            }
            (lines, true)
        }
    };

    let (items, total) = build_order_items(&state, &lines).await?;
    let items_json = serde_json::to_string(&items)
        .map_err(|e| ApiError::InternalServer(format!("failed to encode order items: {}", e)))?;

    let order_id = generate_order_id();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, items, total, status, shipping_address, created_at, updated_at)
        VALUES (?, ?, ?, ?, 'PENDING', ?, ?, ?)
        "#,
    )
    .bind(&order_id)
    .bind(&user.id)
    .bind(&items_json)
    .bind(total)
    .bind(&payload.shipping_address)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if from_cart {
        // checkout consumed the cart
        let _ = cart_service.clear(&user.id).await;
    }

    info!(order_id = %order_id, user_id = %user.id, total, "Order created");

    let order = find_order(&state, &order_id).await?;
    Ok(ApiResponse::created(order, "Order created successfully"))
}

/// GET /api/v1/orders/get-all - the caller's orders
pub async fn get_user_orders(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Query(params): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let (page, limit, offset) = params.resolve(10);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(&user.id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "orders": orders,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Orders fetched successfully",
    ))
}

/// GET /api/v1/orders/:id
pub async fn get_order_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let order = find_order(&state, &order_id).await?;
    ensure_owner_or_staff(&order, &user)?;

    Ok(ApiResponse::ok(order, "Order fetched successfully"))
}

/// POST /api/v1/orders/cancel-order/:id
pub async fn cancel_order(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let order = find_order(&state, &order_id).await?;
    ensure_owner_or_staff(&order, &user)?;

    if !CANCELLABLE_STATUSES.contains(&order.status.as_str()) {
        return Err(ApiError::BadRequest(
            "Order can no longer be cancelled".to_string(),
        ));
    }

    sqlx::query("UPDATE orders SET status = 'CANCELLED', updated_at = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(&order.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(order_id = %order.id, "Order cancelled");

    let order = find_order(&state, &order_id).await?;
    Ok(ApiResponse::ok(order, "Order cancelled successfully"))
}

/// POST /api/v1/orders/return-order/:id
pub async fn return_order(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let order = find_order(&state, &order_id).await?;
    ensure_owner_or_staff(&order, &user)?;

    if order.status != "DELIVERED" {
        return Err(ApiError::BadRequest(
            "Only delivered orders can be returned".to_string(),
        ));
    }

    sqlx::query("UPDATE orders SET status = 'RETURNED', updated_at = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(&order.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(order_id = %order.id, "Order returned");

    let order = find_order(&state, &order_id).await?;
    Ok(ApiResponse::ok(order, "Order returned successfully"))
}

/// PUT /api/v1/orders/status-order/:id (staff roles)
pub async fn update_order_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, STAFF_ROLES)?;

    let status = payload.status.trim().to_uppercase();
    if !ORDER_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unknown order status: {}",
            payload.status
        )));
    }

    let order = find_order(&state, &order_id).await?;

    sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(&status)
        .bind(Utc::now().to_rfc3339())
        .bind(&order.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(order_id = %order.id, status = %status, "Order status updated");

    let order = find_order(&state, &order_id).await?;
    Ok(ApiResponse::ok(order, "Order status updated successfully"))
}

/// DELETE /api/v1/orders/delete-order/:id
pub async fn delete_order(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let order = find_order(&state, &order_id).await?;
    ensure_owner_or_staff(&order, &user)?;

    sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(&order.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(order_id = %order.id, "Order deleted");

    Ok(ApiResponse::ok((), "Order deleted successfully"))
}
