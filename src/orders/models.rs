//! Order data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::cart::models::CartItem;

pub const ORDER_STATUSES: &[&str] = &[
    "PENDING",
    "PROCESSING",
    "SHIPPED",
    "DELIVERED",
    "CANCELLED",
    "RETURNED",
];

/// Statuses an owner can still cancel from
pub const CANCELLABLE_STATUSES: &[&str] = &["PENDING", "PROCESSING"];

/// Snapshot of a product at checkout time; later catalog edits do not
/// change past orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Order database model. `items` is a JSON array of `OrderItem` snapshots.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: String,
    pub total: f64,
    pub status: String,
    pub shipping_address: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Order {
    pub fn line_items(&self) -> Vec<OrderItem> {
        serde_json::from_str(&self.items).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Explicit item list; when absent the order is built from the cart
    pub items: Option<Vec<CartItem>>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}
