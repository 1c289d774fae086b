//! Admin profile handlers

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
    normalize_permissions, AdminProfile, AdminProfileListing, CreateAdminProfileRequest,
    UpdateAdminProfileRequest,
};
use crate::auth::models::Role;
use crate::auth::permissions::{authorize_roles, require_permission};
use crate::auth::{AdminGate, CurrentUser};
use crate::common::pagination::PageQuery;
use crate::common::{
    generate_admin_profile_id, ApiError, ApiResponse, AppState, Pagination,
};

async fn find_profile(state: &AppState, id: &str) -> Result<AdminProfile, ApiError> {
    sqlx::query_as::<_, AdminProfile>("SELECT * FROM admin_profiles WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Admin profile not found".to_string()))
}

/// GET /api/v1/admins
pub async fn list_admin_profiles(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Query(params): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "ADMINS", "VIEW").await?;

    let (page, limit, offset) = params.resolve(20);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_profiles")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let admins = sqlx::query_as::<_, AdminProfileListing>(
        r#"
        SELECT a.id, a.user_id, u.user_name, u.email, u.role,
               a.is_active, a.permissions, a.created_at
        FROM admin_profiles a
        JOIN users u ON u.id = a.user_id
        ORDER BY a.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "admins": admins,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Admin profiles fetched successfully",
    ))
}

/// POST /api/v1/admins
///
/// SUPER_ADMIN only: attaches a profile to a user and promotes the user to
/// the requested admin tier.
pub async fn create_admin_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<CreateAdminProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, &[Role::SuperAdmin])?;

    let role = match Role::parse(&payload.role) {
        Some(role @ (Role::Admin | Role::SubAdmin)) => role,
        _ => {
            return Err(ApiError::BadRequest(
                "Role must be ADMIN or SUB_ADMIN".to_string(),
            ))
        }
    };

    let target: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(&payload.user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    if target.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM admin_profiles WHERE user_id = ?")
            .bind(&payload.user_id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Admin profile already exists for this user".to_string(),
        ));
    }

    let permissions = normalize_permissions(&payload.permissions.unwrap_or_default());
    let permissions_json = serde_json::to_string(&permissions)
        .map_err(|e| ApiError::InternalServer(format!("failed to encode permissions: {}", e)))?;

    let profile_id = generate_admin_profile_id();
    let now = Utc::now().to_rfc3339();
    let is_active = payload.is_active.unwrap_or(true) as i64;

    sqlx::query(
        r#"
        INSERT INTO admin_profiles (id, user_id, is_active, permissions, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&profile_id)
    .bind(&payload.user_id)
    .bind(is_active)
    .bind(&permissions_json)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(&now)
        .bind(&payload.user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        profile_id = %profile_id,
        user_id = %payload.user_id,
        role = %role.as_str(),
        "Admin profile created"
    );

    let created = find_profile(&state, &profile_id).await?;
    Ok(ApiResponse::created(created, "Admin profile created successfully"))
}

/// PATCH /api/v1/admins/:id
pub async fn update_admin_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(profile_id): Path<String>,
    Json(payload): Json<UpdateAdminProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, &[Role::SuperAdmin])?;

    let profile = find_profile(&state, &profile_id).await?;

    let permissions_json = match &payload.permissions {
        Some(entries) => serde_json::to_string(&normalize_permissions(entries))
            .map_err(|e| ApiError::InternalServer(format!("failed to encode permissions: {}", e)))?,
        None => profile.permissions.clone(),
    };
    let is_active = payload.is_active.map(|a| a as i64).unwrap_or(profile.is_active);

    sqlx::query(
        "UPDATE admin_profiles SET permissions = ?, is_active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&permissions_json)
    .bind(is_active)
    .bind(Utc::now().to_rfc3339())
    .bind(&profile_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let updated = find_profile(&state, &profile_id).await?;
    Ok(ApiResponse::ok(updated, "Admin profile updated successfully"))
}

/// POST /api/v1/admins/:id/toggle
pub async fn toggle_admin_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, &[Role::SuperAdmin])?;

    let profile = find_profile(&state, &profile_id).await?;
    let next_active = if profile.is_active == 0 { 1 } else { 0 };

    sqlx::query("UPDATE admin_profiles SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(next_active)
        .bind(Utc::now().to_rfc3339())
        .bind(&profile_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let updated = find_profile(&state, &profile_id).await?;
    let message = if next_active == 1 {
        "Admin profile activated"
    } else {
        "Admin profile deactivated"
    };
    Ok(ApiResponse::ok(updated, message))
}
