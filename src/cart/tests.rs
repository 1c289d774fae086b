//! Tests for the cart module
//!
//! The merge arithmetic is pure, so its contract - including the deliberate
//! non-idempotence - is pinned down here without a database. The service
//! tests run against an in-memory database.

#[cfg(test)]
mod tests {
    use super::super::models::CartItem;
    use super::super::services::{merge_items, CartService};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    fn item(product_id: &str, quantity: i64) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations");
        sqlx::query(
            "INSERT INTO users (id, user_name, full_name, email, password_hash) \
             VALUES ('U_CART01', 'cartuser', 'Cart User', 'cart@example.com', 'x')",
        )
        .execute(&pool)
        .await
        .expect("insert user");
        pool
    }

    #[test]
    fn test_merge_into_empty_cart_keeps_order_and_quantities() {
        let incoming = vec![item("P_A", 2), item("P_B", 1)];
        let merged = merge_items(None, &incoming);
        assert_eq!(merged, vec![item("P_A", 2), item("P_B", 1)]);
    }

    #[test]
    fn test_merge_into_empty_cart_does_not_collapse_duplicates() {
        // A client list with repeated product references is stored as-is
        let incoming = vec![item("P_A", 2), item("P_A", 3)];
        let merged = merge_items(None, &incoming);
        assert_eq!(merged, vec![item("P_A", 2), item("P_A", 3)]);
    }

    #[test]
    fn test_merge_increments_existing_quantities() {
        let existing = vec![item("P_A", 1)];
        let incoming = vec![item("P_A", 2), item("P_B", 4)];
        let merged = merge_items(Some(&existing), &incoming);
        assert_eq!(merged, vec![item("P_A", 3), item("P_B", 4)]);
    }

    #[test]
    fn test_merge_is_not_idempotent() {
        // 1 + 2 + 2 = 5, not 3: replaying the same local cart adds again
        let existing = vec![item("P_A", 1)];
        let incoming = vec![item("P_A", 2)];
        let once = merge_items(Some(&existing), &incoming);
        let twice = merge_items(Some(&once), &incoming);
        assert_eq!(twice, vec![item("P_A", 5)]);
    }

    #[test]
    fn test_merge_preserves_existing_line_order() {
        let existing = vec![item("P_A", 1), item("P_B", 1)];
        let incoming = vec![item("P_C", 1), item("P_B", 2)];
        let merged = merge_items(Some(&existing), &incoming);
        assert_eq!(
            merged,
            vec![item("P_A", 1), item("P_B", 3), item("P_C", 1)]
        );
    }

    #[tokio::test]
    async fn test_service_merge_creates_then_accumulates() {
        let pool = memory_pool().await;
        let service = CartService::new(pool);

        let cart = service
            .merge("U_CART01", &[item("P_A", 2), item("P_B", 1)])
            .await
            .expect("first merge");
        assert_eq!(cart.line_items(), vec![item("P_A", 2), item("P_B", 1)]);
        assert_eq!(cart.revision, 0);

        let cart = service
            .merge("U_CART01", &[item("P_A", 2)])
            .await
            .expect("second merge");
        assert_eq!(cart.line_items(), vec![item("P_A", 4), item("P_B", 1)]);
        assert_eq!(cart.revision, 1);
    }

    #[tokio::test]
    async fn test_service_update_and_remove() {
        let pool = memory_pool().await;
        let service = CartService::new(pool);

        service
            .merge("U_CART01", &[item("P_A", 2), item("P_B", 1)])
            .await
            .expect("seed");

        let cart = service
            .update_item("U_CART01", "P_A", 7)
            .await
            .expect("update");
        assert_eq!(cart.line_items()[0], item("P_A", 7));

        let cart = service
            .remove_item("U_CART01", "P_A")
            .await
            .expect("remove");
        assert_eq!(cart.line_items(), vec![item("P_B", 1)]);
    }

    #[tokio::test]
    async fn test_service_update_missing_line_is_not_found() {
        let pool = memory_pool().await;
        let service = CartService::new(pool);

        service
            .merge("U_CART01", &[item("P_A", 1)])
            .await
            .expect("seed");

        let result = service.update_item("U_CART01", "P_MISSING", 2).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_service_clear_then_missing() {
        let pool = memory_pool().await;
        let service = CartService::new(pool);

        service
            .merge("U_CART01", &[item("P_A", 1)])
            .await
            .expect("seed");
        service.clear("U_CART01").await.expect("clear");

        assert!(service.find_by_user("U_CART01").await.expect("find").is_none());
        assert!(service.clear("U_CART01").await.is_err());
    }
}
