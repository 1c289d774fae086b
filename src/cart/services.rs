//! Cart persistence and the merge engine.
//!
//! Every write goes through a compare-and-swap on the cart's revision
//! counter with a bounded retry, so two concurrent mutations for the same
//! user cannot silently lose an update.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::models::{Cart, CartItem, ExpandedCart, ExpandedCartItem};
use crate::common::{generate_cart_id, ApiError};
use crate::products::models::Product;

const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Reconcile a client-held item list into the persisted line items.
///
/// With no persisted cart the client list is taken verbatim - duplicate
/// product references in it are NOT collapsed. Against an existing cart,
/// each incoming pair increments the matching line's quantity (never
/// replaces it) or appends a new line. Merging the same list twice
/// therefore doubles the merged quantities; the operation is deliberately
/// not idempotent.
pub fn merge_items(existing: Option<&[CartItem]>, incoming: &[CartItem]) -> Vec<CartItem> {
    match existing {
        None => incoming.to_vec(),
        Some(existing) => {
            let mut merged = existing.to_vec();
            for item in incoming {
                match merged
                    .iter_mut()
                    .find(|line| line.product_id == item.product_id)
                {
                    Some(line) => line.quantity += item.quantity,
                    None => merged.push(item.clone()),
                }
            }
            merged
        }
    }
}

pub struct CartService {
    db: SqlitePool,
}

impl CartService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<Cart>, ApiError> {
        sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn create(&self, user_id: &str, items: &[CartItem]) -> Result<bool, ApiError> {
        let cart_id = generate_cart_id();
        let now = Utc::now().to_rfc3339();
        let items_json = serde_json::to_string(items)
            .map_err(|e| ApiError::InternalServer(format!("failed to encode cart items: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO carts (id, user_id, items, revision, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&cart_id)
        .bind(user_id)
        .bind(&items_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(result.rows_affected() == 1)
    }

    /// Conditional replace of the line items; false means the revision moved
    async fn replace_items(&self, cart: &Cart, items: &[CartItem]) -> Result<bool, ApiError> {
        let items_json = serde_json::to_string(items)
            .map_err(|e| ApiError::InternalServer(format!("failed to encode cart items: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE carts
            SET items = ?, revision = revision + 1, updated_at = ?
            WHERE id = ? AND revision = ?
            "#,
        )
        .bind(&items_json)
        .bind(Utc::now().to_rfc3339())
        .bind(&cart.id)
        .bind(cart.revision)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(result.rows_affected() == 1)
    }

    /// Merge a client-held cart into the user's persisted cart
    pub async fn merge(&self, user_id: &str, incoming: &[CartItem]) -> Result<Cart, ApiError> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            match self.find_by_user(user_id).await? {
                None => {
                    let items = merge_items(None, incoming);
                    if self.create(user_id, &items).await? {
                        break;
                    }
                    // another request created the cart first; merge into it
                    debug!(user_id = %user_id, attempt, "Cart appeared concurrently, retrying merge");
                }
                Some(cart) => {
                    let items = merge_items(Some(&cart.line_items()), incoming);
                    if self.replace_items(&cart, &items).await? {
                        break;
                    }
                    debug!(user_id = %user_id, attempt, "Cart revision moved, retrying merge");
                }
            }
            if attempt + 1 == MAX_WRITE_ATTEMPTS {
                warn!(user_id = %user_id, "Cart merge exhausted its retries");
                return Err(ApiError::Conflict(
                    "Cart was modified concurrently, please retry".to_string(),
                ));
            }
        }

        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("cart disappeared after merge".to_string()))
    }

    /// Add a single item, aggregating the quantity onto an existing line
    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Cart, ApiError> {
        let incoming = [CartItem {
            product_id: product_id.to_string(),
            quantity,
        }];
        self.merge(user_id, &incoming).await
    }

    /// Replace the quantity of an existing line item
    pub async fn update_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Cart, ApiError> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let cart = self
                .find_by_user(user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

            let mut items = cart.line_items();
            let line = items
                .iter_mut()
                .find(|line| line.product_id == product_id)
                .ok_or_else(|| ApiError::NotFound("Product not found in cart".to_string()))?;
            line.quantity = quantity;

            if self.replace_items(&cart, &items).await? {
                return self.expect_cart(user_id).await;
            }
            debug!(user_id = %user_id, attempt, "Cart revision moved, retrying update");
        }

        Err(ApiError::Conflict(
            "Cart was modified concurrently, please retry".to_string(),
        ))
    }

    /// Drop a line item; removing an absent product is not an error
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> Result<Cart, ApiError> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let cart = self
                .find_by_user(user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

            let items: Vec<CartItem> = cart
                .line_items()
                .into_iter()
                .filter(|line| line.product_id != product_id)
                .collect();

            if self.replace_items(&cart, &items).await? {
                return self.expect_cart(user_id).await;
            }
            debug!(user_id = %user_id, attempt, "Cart revision moved, retrying removal");
        }

        Err(ApiError::Conflict(
            "Cart was modified concurrently, please retry".to_string(),
        ))
    }

    pub async fn clear(&self, user_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Cart not found".to_string()));
        }
        Ok(())
    }

    async fn expect_cart(&self, user_id: &str) -> Result<Cart, ApiError> {
        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("cart disappeared after write".to_string()))
    }

    /// Attach product details to every line item
    pub async fn expand(&self, cart: Cart) -> Result<ExpandedCart, ApiError> {
        let mut items = Vec::new();
        for line in cart.line_items() {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
                .bind(&line.product_id)
                .fetch_optional(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;

            items.push(ExpandedCartItem {
                product_id: line.product_id,
                quantity: line.quantity,
                product,
            });
        }

        Ok(ExpandedCart {
            id: cart.id,
            user_id: cart.user_id,
            items,
            revision: cart.revision,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }
}
