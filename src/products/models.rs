//! Product data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Product database model. `additional_images` is a JSON array of URLs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: String,
    pub product_number: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: f64,
    pub stock_quantity: i64,
    pub sku: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub image_url: String,
    pub additional_images: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Product {
    pub fn gallery(&self) -> Vec<String> {
        serde_json::from_str(&self.additional_images).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub sku: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub product_number: Option<i64>,
    pub image_url: Option<String>,
    pub additional_images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub additional_images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}
