use super::models::CreateProductRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateProductRequest> for CreateProductRequest {
    fn validate(&self, data: &CreateProductRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Product name is required");
        }
        if data.name.len() > 255 {
            result.add_error("name", "Product name must not exceed 255 characters");
        }
        if data.sku.trim().is_empty() {
            result.add_error("sku", "SKU is required");
        }
        if data.price <= 0.0 {
            result.add_error("price", "Price must be greater than zero");
        }
        if let Some(discount) = data.discount {
            if discount < 0.0 {
                result.add_error("discount", "Discount must not be negative");
            }
        }
        if let Some(stock) = data.stock_quantity {
            if stock < 0 {
                result.add_error("stock_quantity", "Stock quantity must not be negative");
            }
        }

        result
    }
}
