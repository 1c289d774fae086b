//! Product handlers

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
    CreateProductRequest, Product, ProductListQuery, UpdateProductRequest,
};
use crate::auth::permissions::require_permission;
use crate::auth::{AdminGate, CurrentUser};
use crate::common::{
    generate_product_id, ApiError, ApiResponse, AppState, Pagination, Validator,
};

async fn find_product(state: &AppState, product_id: &str) -> Result<Product, ApiError> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}

/// GET /api/v1/products - list with search, filters and pagination
pub async fn get_products(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let mut conditions: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        conditions.push("(name LIKE ? OR description LIKE ? OR sku LIKE ?)");
        let pattern = format!("%{}%", search);
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }
    if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
        conditions.push("category = ?");
        binds.push(category.to_string());
    }
    if let Some(brand) = params.brand.as_deref().filter(|b| !b.is_empty()) {
        conditions.push("brand = ?");
        binds.push(brand.to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM products {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind);
    }
    let total = count_query
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let list_sql = format!(
        "SELECT * FROM products {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut list_query = sqlx::query_as::<_, Product>(&list_sql);
    for bind in &binds {
        list_query = list_query.bind(bind);
    }
    let products = list_query
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "products": products,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Products fetched successfully",
    ))
}

/// GET /api/v1/products/:id
pub async fn get_product_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let product = find_product(&state, &product_id).await?;
    Ok(ApiResponse::ok(product, "Product fetched successfully"))
}

/// POST /api/v1/products/add-product (PRODUCTS:CREATE)
pub async fn create_product(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "PRODUCTS", "CREATE").await?;

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let sku = payload.sku.trim().to_string();

    // Assign the next product number when the caller did not pick one
    let product_number = match payload.product_number {
        Some(n) => n,
        None => {
            let latest: Option<i64> =
                sqlx::query_scalar("SELECT MAX(product_number) FROM products")
                    .fetch_one(&state.db)
                    .await
                    .map_err(ApiError::DatabaseError)?;
            latest.unwrap_or(0) + 1
        }
    };

    let conflict: Option<(String,)> =
        sqlx::query_as("SELECT id FROM products WHERE sku = ? OR product_number = ?")
            .bind(&sku)
            .bind(product_number)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;
    if conflict.is_some() {
        return Err(ApiError::Conflict(
            "SKU or product number already exists".to_string(),
        ));
    }

    let gallery_json = serde_json::to_string(&payload.additional_images.unwrap_or_default())
        .map_err(|e| ApiError::InternalServer(format!("failed to encode gallery: {}", e)))?;

    let product_id = generate_product_id();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO products (
            id, product_number, name, description, price, discount, stock_quantity,
            sku, category, brand, image_url, additional_images, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product_id)
    .bind(product_number)
    .bind(payload.name.trim())
    .bind(payload.description.as_deref().map(str::trim).unwrap_or(""))
    .bind(payload.price)
    .bind(payload.discount.unwrap_or(0.0))
    .bind(payload.stock_quantity.unwrap_or(0))
    .bind(&sku)
    .bind(&payload.category)
    .bind(&payload.brand)
    .bind(payload.image_url.as_deref().unwrap_or(""))
    .bind(&gallery_json)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(product_id = %product_id, sku = %sku, "Product created");

    let product = find_product(&state, &product_id).await?;
    Ok(ApiResponse::created(product, "Product created successfully"))
}

/// PATCH /api/v1/products/update-product/:id (PRODUCTS:UPDATE)
pub async fn update_product(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "PRODUCTS", "UPDATE").await?;

    let product = find_product(&state, &product_id).await?;

    if let Some(sku) = payload.sku.as_deref().map(str::trim) {
        if sku.is_empty() {
            return Err(ApiError::ValidationError("SKU cannot be empty".to_string()));
        }
        let conflict: Option<(String,)> =
            sqlx::query_as("SELECT id FROM products WHERE sku = ? AND id != ?")
                .bind(sku)
                .bind(&product.id)
                .fetch_optional(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;
        if conflict.is_some() {
            return Err(ApiError::Conflict("SKU already exists".to_string()));
        }
    }
    if let Some(price) = payload.price {
        if price <= 0.0 {
            return Err(ApiError::ValidationError(
                "Price must be greater than zero".to_string(),
            ));
        }
    }

    let mut updates: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Product name cannot be empty".to_string(),
            ));
        }
        updates.push("name = ?");
        binds.push(name.trim().to_string());
    }
    if let Some(description) = &payload.description {
        updates.push("description = ?");
        binds.push(description.trim().to_string());
    }
    if let Some(price) = payload.price {
        updates.push("price = ?");
        binds.push(price.to_string());
    }
    if let Some(discount) = payload.discount {
        updates.push("discount = ?");
        binds.push(discount.to_string());
    }
    if let Some(stock) = payload.stock_quantity {
        updates.push("stock_quantity = ?");
        binds.push(stock.to_string());
    }
    if let Some(sku) = payload.sku.as_deref().map(str::trim) {
        updates.push("sku = ?");
        binds.push(sku.to_string());
    }
    if let Some(category) = &payload.category {
        updates.push("category = ?");
        binds.push(category.clone());
    }
    if let Some(brand) = &payload.brand {
        updates.push("brand = ?");
        binds.push(brand.clone());
    }
    if let Some(image_url) = &payload.image_url {
        updates.push("image_url = ?");
        binds.push(image_url.clone());
    }
    if let Some(gallery) = &payload.additional_images {
        updates.push("additional_images = ?");
        binds.push(
            serde_json::to_string(gallery).map_err(|e| {
                ApiError::InternalServer(format!("failed to encode gallery: {}", e))
            })?,
        );
    }

    if updates.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one field is required to update".to_string(),
        ));
    }

    updates.push("updated_at = ?");
    binds.push(Utc::now().to_rfc3339());

    let sql = format!("UPDATE products SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }
    query
        .bind(&product.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let updated = find_product(&state, &product_id).await?;
    Ok(ApiResponse::ok(updated, "Product updated successfully"))
}

/// DELETE /api/v1/products/delete-product/:id (PRODUCTS:DELETE)
pub async fn delete_product(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "PRODUCTS", "DELETE").await?;

    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(&product_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    info!(product_id = %product_id, "Product deleted");

    Ok(ApiResponse::ok((), "Product deleted successfully"))
}
