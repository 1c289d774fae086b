//! Contact settings and message handlers

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
    ContactMessage, ContactSetting, ContactSettingPayload, CreateMessageRequest,
    MessageListQuery, UpdateMessageRequest, MESSAGE_STATUSES,
};
use crate::auth::permissions::require_permission;
use crate::auth::{AdminGate, CurrentUser};
use crate::common::pagination::PageQuery;
use crate::common::{
    generate_contact_setting_id, generate_message_id, ApiError, ApiResponse, AppState,
    Pagination,
};

// ============================================================================
// Contact settings
// ============================================================================

async fn find_setting(state: &AppState, id: &str) -> Result<ContactSetting, ApiError> {
    sqlx::query_as::<_, ContactSetting>("SELECT * FROM contact_settings WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Contact settings not found".to_string()))
}

async fn find_active_setting(state: &AppState) -> Result<Option<ContactSetting>, ApiError> {
    sqlx::query_as::<_, ContactSetting>(
        "SELECT * FROM contact_settings WHERE is_active = 1 ORDER BY created_at DESC LIMIT 1",
    )
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)
}

async fn insert_setting(
    state: &AppState,
    payload: &ContactSettingPayload,
) -> Result<String, ApiError> {
    let id = generate_contact_setting_id();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO contact_settings (
            id, headline, subheading, address, phone, email, hours, map_embed,
            is_active, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(payload.headline.as_deref().map(str::trim).unwrap_or("Get in touch"))
    .bind(&payload.subheading)
    .bind(&payload.address)
    .bind(&payload.phone)
    .bind(payload.email.as_deref().map(|e| e.trim().to_lowercase()))
    .bind(&payload.hours)
    .bind(&payload.map_embed)
    .bind(payload.is_active.unwrap_or(true) as i64)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(id)
}

async fn apply_setting_update(
    state: &AppState,
    setting: &ContactSetting,
    payload: &ContactSettingPayload,
) -> Result<(), ApiError> {
    let mut updates: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(headline) = &payload.headline {
        updates.push("headline = ?");
        binds.push(headline.trim().to_string());
    }
    if let Some(subheading) = &payload.subheading {
        updates.push("subheading = ?");
        binds.push(subheading.clone());
    }
    if let Some(address) = &payload.address {
        updates.push("address = ?");
        binds.push(address.clone());
    }
    if let Some(phone) = &payload.phone {
        updates.push("phone = ?");
        binds.push(phone.clone());
    }
    if let Some(email) = &payload.email {
        updates.push("email = ?");
        binds.push(email.trim().to_lowercase());
    }
    if let Some(hours) = &payload.hours {
        updates.push("hours = ?");
        binds.push(hours.clone());
    }
    if let Some(map_embed) = &payload.map_embed {
        updates.push("map_embed = ?");
        binds.push(map_embed.clone());
    }
    if let Some(is_active) = payload.is_active {
        updates.push("is_active = ?");
        binds.push((is_active as i64).to_string());
    }

    if updates.is_empty() {
        return Ok(());
    }

    updates.push("updated_at = ?");
    binds.push(Utc::now().to_rfc3339());

    let sql = format!(
        "UPDATE contact_settings SET {} WHERE id = ?",
        updates.join(", ")
    );
    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }
    query
        .bind(&setting.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(())
}

/// GET /api/v1/contact-settings - public, latest active record
pub async fn get_contact_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let data = match find_active_setting(&state).await? {
        Some(setting) => serde_json::to_value(setting)
            .map_err(|e| ApiError::InternalServer(format!("failed to encode settings: {}", e)))?,
        None => serde_json::json!({}),
    };

    Ok(ApiResponse::ok(data, "Contact settings fetched"))
}

/// GET /api/v1/contact-settings/all (CMS:READ)
pub async fn list_contact_settings(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Query(params): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "CMS", "READ").await?;

    let (page, limit, offset) = params.resolve(20);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_settings")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let items = sqlx::query_as::<_, ContactSetting>(
        "SELECT * FROM contact_settings ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "items": items,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Contact settings fetched",
    ))
}

/// POST /api/v1/contact-settings (CMS:CREATE)
pub async fn create_contact_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Json(payload): Json<ContactSettingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "CMS", "CREATE").await?;

    if find_active_setting(&state).await?.is_some() {
        return Err(ApiError::Conflict(
            "Active contact settings already exist. Deactivate or update the existing record."
                .to_string(),
        ));
    }

    let id = insert_setting(&state, &payload).await?;
    info!(setting_id = %id, "Contact settings created");

    let created = find_setting(&state, &id).await?;
    Ok(ApiResponse::created(created, "Contact settings created"))
}

/// PUT /api/v1/contact-settings/:id (CMS:UPDATE)
pub async fn update_contact_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
    Json(payload): Json<ContactSettingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "CMS", "UPDATE").await?;

    let setting = find_setting(&state, &id).await?;
    apply_setting_update(&state, &setting, &payload).await?;

    let updated = find_setting(&state, &id).await?;
    Ok(ApiResponse::ok(updated, "Contact settings updated"))
}

/// POST /api/v1/contact-settings/:id/toggle (CMS:UPDATE)
pub async fn toggle_contact_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "CMS", "UPDATE").await?;

    let setting = find_setting(&state, &id).await?;
    let next_active = if setting.is_active == 0 { 1 } else { 0 };

    sqlx::query("UPDATE contact_settings SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(next_active)
        .bind(Utc::now().to_rfc3339())
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let updated = find_setting(&state, &id).await?;
    let message = if next_active == 1 {
        "Contact settings activated"
    } else {
        "Contact settings deactivated"
    };
    Ok(ApiResponse::ok(updated, message))
}

/// DELETE /api/v1/contact-settings/:id (CMS:DELETE)
pub async fn delete_contact_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "CMS", "DELETE").await?;

    let result = sqlx::query("DELETE FROM contact_settings WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Contact settings not found".to_string()));
    }

    Ok(ApiResponse::ok((), "Contact settings deleted"))
}

/// PUT /api/v1/contact-settings (CMS:UPDATE)
/// Upsert kept for the dashboard's existing save flow
pub async fn upsert_contact_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Json(payload): Json<ContactSettingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "CMS", "UPDATE").await?;

    let id = match find_active_setting(&state).await? {
        Some(setting) => {
            apply_setting_update(&state, &setting, &payload).await?;
            setting.id
        }
        None => insert_setting(&state, &payload).await?,
    };

    let saved = find_setting(&state, &id).await?;
    Ok(ApiResponse::ok(saved, "Contact settings saved"))
}

// ============================================================================
// Contact-form messages
// ============================================================================

async fn find_message(state: &AppState, id: &str) -> Result<ContactMessage, ApiError> {
    sqlx::query_as::<_, ContactMessage>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))
}

async fn set_message_status(
    state: &AppState,
    user: &CurrentUser,
    gate: &AdminGate,
    id: &str,
    status: &str,
) -> Result<ContactMessage, ApiError> {
    require_permission(state, user, Some(gate), "MESSAGES", "UPDATE").await?;

    let message = find_message(state, id).await?;
    let handled_by = gate.profile.as_ref().map(|p| p.id.clone());

    sqlx::query("UPDATE messages SET status = ?, handled_by = ? WHERE id = ?")
        .bind(status)
        .bind(&handled_by)
        .bind(&message.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    find_message(state, id).await
}

/// POST /api/v1/messages - public contact-form submission
pub async fn create_message(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let name = payload.name.trim().to_string();
    let body = payload.body.trim().to_string();
    if name.is_empty() || body.is_empty() {
        return Err(ApiError::BadRequest(
            "Name and message body are required".to_string(),
        ));
    }

    let id = generate_message_id();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO messages (id, name, email, subject, body, status, created_at)
        VALUES (?, ?, ?, ?, ?, 'new', ?)
        "#,
    )
    .bind(&id)
    .bind(&name)
    .bind(payload.email.as_deref().map(|e| e.trim().to_lowercase()))
    .bind(payload.subject.as_deref().map(str::trim))
    .bind(&body)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(message_id = %id, "Contact message received");

    let created = find_message(&state, &id).await?;
    Ok(ApiResponse::created(created, "Message sent successfully"))
}

/// GET /api/v1/messages (MESSAGES:READ)
pub async fn get_messages(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Query(params): Query<MessageListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "MESSAGES", "READ").await?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(status) if MESSAGE_STATUSES.contains(&status) => Some(status.to_string()),
        Some(status) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown message status: {}",
                status
            )))
        }
        None => None,
    };

    let (where_clause, bind) = match &status {
        Some(status) => ("WHERE status = ?", Some(status.clone())),
        None => ("", None),
    };

    let count_sql = format!("SELECT COUNT(*) FROM messages {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(bind) = &bind {
        count_query = count_query.bind(bind);
    }
    let total = count_query
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let list_sql = format!(
        "SELECT * FROM messages {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut list_query = sqlx::query_as::<_, ContactMessage>(&list_sql);
    if let Some(bind) = &bind {
        list_query = list_query.bind(bind);
    }
    let messages = list_query
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "messages": messages,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Messages fetched successfully",
    ))
}

/// GET /api/v1/messages/:id (MESSAGES:READ)
pub async fn get_message(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "MESSAGES", "READ").await?;

    let message = find_message(&state, &id).await?;
    Ok(ApiResponse::ok(message, "Message fetched successfully"))
}

/// PATCH /api/v1/messages/:id (MESSAGES:UPDATE)
pub async fn update_message(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "MESSAGES", "UPDATE").await?;

    let message = find_message(&state, &id).await?;

    if let Some(status) = payload.status.as_deref() {
        if !MESSAGE_STATUSES.contains(&status) {
            return Err(ApiError::BadRequest(format!(
                "Unknown message status: {}",
                status
            )));
        }
    }

    let mut updates: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(subject) = &payload.subject {
        updates.push("subject = ?");
        binds.push(subject.trim().to_string());
    }
    if let Some(body) = &payload.body {
        updates.push("body = ?");
        binds.push(body.trim().to_string());
    }
    if let Some(status) = &payload.status {
        updates.push("status = ?");
        binds.push(status.clone());
    }

    if updates.is_empty() {
        return Ok(ApiResponse::ok(message, "Message updated"));
    }

    let sql = format!("UPDATE messages SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }
    query
        .bind(&message.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let updated = find_message(&state, &id).await?;
    Ok(ApiResponse::ok(updated, "Message updated"))
}

/// POST /api/v1/messages/:id/read (MESSAGES:UPDATE)
pub async fn mark_message_read(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let message = set_message_status(&state, &user, &gate, &id, "read").await?;
    Ok(ApiResponse::ok(message, "Message marked as read"))
}

/// POST /api/v1/messages/:id/archive (MESSAGES:UPDATE)
pub async fn archive_message(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let message = set_message_status(&state, &user, &gate, &id, "archived").await?;
    Ok(ApiResponse::ok(message, "Message archived"))
}

/// DELETE /api/v1/messages/:id (MESSAGES:DELETE)
pub async fn delete_message(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    require_permission(&state, &user, Some(&gate), "MESSAGES", "DELETE").await?;

    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Message not found".to_string()));
    }

    Ok(ApiResponse::ok((), "Message deleted"))
}
