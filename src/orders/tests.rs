//! Tests for the orders module

#[cfg(test)]
mod tests {
    use super::super::models::*;

    #[test]
    fn test_status_sets() {
        assert!(ORDER_STATUSES.contains(&"PENDING"));
        assert!(ORDER_STATUSES.contains(&"RETURNED"));
        assert!(!ORDER_STATUSES.contains(&"REFUNDED"));

        assert!(CANCELLABLE_STATUSES.contains(&"PENDING"));
        assert!(CANCELLABLE_STATUSES.contains(&"PROCESSING"));
        assert!(!CANCELLABLE_STATUSES.contains(&"SHIPPED"));
    }

    #[test]
    fn test_order_line_items_round_trip() {
        let items = vec![
            OrderItem {
                product_id: "P_000001".to_string(),
                name: "Dupatta".to_string(),
                price: 1199.0,
                quantity: 2,
            },
            OrderItem {
                product_id: "P_000002".to_string(),
                name: "Bangles".to_string(),
                price: 250.0,
                quantity: 1,
            },
        ];

        let order = Order {
            id: "O_000001".to_string(),
            user_id: "U_000001".to_string(),
            items: serde_json::to_string(&items).unwrap(),
            total: 2648.0,
            status: "PENDING".to_string(),
            shipping_address: None,
            created_at: None,
            updated_at: None,
        };

        assert_eq!(order.line_items(), items);
    }

    #[test]
    fn test_order_with_malformed_items_reads_empty() {
        let order = Order {
            id: "O_000002".to_string(),
            user_id: "U_000001".to_string(),
            items: "{broken".to_string(),
            total: 0.0,
            status: "PENDING".to_string(),
            shipping_address: None,
            created_at: None,
            updated_at: None,
        };

        assert!(order.line_items().is_empty());
    }
}
