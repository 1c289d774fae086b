//! Cart data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::products::models::Product;

/// One line item: a product reference and its quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Cart database model. Line items live in a JSON column so a cart mutation
/// is always a single row replace; `revision` supports the compare-and-swap
/// write discipline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub items: String,
    pub revision: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Cart {
    pub fn line_items(&self) -> Vec<CartItem> {
        serde_json::from_str(&self.items).unwrap_or_default()
    }
}

/// Line item with the referenced product expanded
#[derive(Debug, Serialize)]
pub struct ExpandedCartItem {
    pub product_id: String,
    pub quantity: i64,
    pub product: Option<Product>,
}

/// Cart as returned to clients, with product details attached
#[derive(Debug, Serialize)]
pub struct ExpandedCart {
    pub id: String,
    pub user_id: String,
    pub items: Vec<ExpandedCartItem>,
    pub revision: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct MergeCartsRequest {
    pub local_cart: Vec<CartItem>,
}
