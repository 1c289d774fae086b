//! Tests for the products module

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use crate::common::Validator;

    fn valid_request() -> CreateProductRequest {
        CreateProductRequest {
            name: "Handwoven Dupatta".to_string(),
            description: Some("Block-printed cotton".to_string()),
            price: 1299.0,
            discount: Some(100.0),
            stock_quantity: Some(25),
            sku: "DUP-001".to_string(),
            category: Some("textiles".to_string()),
            brand: None,
            product_number: None,
            image_url: None,
            additional_images: Some(vec!["/img/dupatta-1.jpg".to_string()]),
        }
    }

    #[test]
    fn test_create_product_validation_success() {
        let request = valid_request();
        let result = request.validate(&request);
        assert!(result.is_valid, "valid product should pass validation");
    }

    #[test]
    fn test_create_product_requires_name_and_sku() {
        let mut request = valid_request();
        request.name = "  ".to_string();
        request.sku = String::new();

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "name"));
        assert!(result.errors.iter().any(|e| e.field == "sku"));
    }

    #[test]
    fn test_create_product_rejects_non_positive_price() {
        let mut request = valid_request();
        request.price = 0.0;

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "price"));
    }

    #[test]
    fn test_create_product_rejects_negative_discount_and_stock() {
        let mut request = valid_request();
        request.discount = Some(-1.0);
        request.stock_quantity = Some(-5);

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "discount"));
        assert!(result.errors.iter().any(|e| e.field == "stock_quantity"));
    }

    #[test]
    fn test_gallery_decodes_json_array() {
        let product = Product {
            id: "P_000001".to_string(),
            product_number: 1,
            name: "Test".to_string(),
            description: String::new(),
            price: 10.0,
            discount: 0.0,
            stock_quantity: 1,
            sku: "T-1".to_string(),
            category: None,
            brand: None,
            image_url: String::new(),
            additional_images: r#"["/a.jpg","/b.jpg"]"#.to_string(),
            created_at: None,
            updated_at: None,
        };

        assert_eq!(product.gallery(), vec!["/a.jpg", "/b.jpg"]);
    }
}
