//! Story handlers

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{CreateStoryRequest, Story, StoryListQuery, UpdateStoryRequest};
use crate::auth::models::Role;
use crate::auth::permissions::authorize_roles;
use crate::auth::CurrentUser;
use crate::common::{
    generate_story_id, ApiError, ApiResponse, AppState, Pagination, Validator,
};

const EDITOR_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::SubAdmin];

async fn find_story(state: &AppState, story_id: &str) -> Result<Story, ApiError> {
    sqlx::query_as::<_, Story>("SELECT * FROM stories WHERE id = ?")
        .bind(story_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Story not found".to_string()))
}

/// GET /api/v1/stories
pub async fn get_stories(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<StoryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let (where_clause, pattern) = match params.search.as_deref().filter(|s| !s.is_empty()) {
        Some(search) => (
            "WHERE (title LIKE ? OR content LIKE ?)",
            Some(format!("%{}%", search)),
        ),
        None => ("", None),
    };

    let count_sql = format!("SELECT COUNT(*) FROM stories {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(pattern) = &pattern {
        count_query = count_query.bind(pattern).bind(pattern);
    }
    let total = count_query
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let list_sql = format!(
        "SELECT * FROM stories {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut list_query = sqlx::query_as::<_, Story>(&list_sql);
    if let Some(pattern) = &pattern {
        list_query = list_query.bind(pattern).bind(pattern);
    }
    let stories = list_query
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "stories": stories,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Stories fetched",
    ))
}

/// GET /api/v1/stories/:id
pub async fn get_story_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(story_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let story = find_story(&state, &story_id).await?;
    Ok(ApiResponse::ok(story, "Story fetched successfully"))
}

/// POST /api/v1/stories (editor roles)
pub async fn create_story(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<CreateStoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, EDITOR_ROLES)?;

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let title = payload.title.trim().to_string();

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM stories WHERE title = ?")
        .bind(&title)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Title already exists".to_string()));
    }

    let story_id = generate_story_id();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO stories (id, title, content, image, story_date, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&story_id)
    .bind(&title)
    .bind(payload.content.trim())
    .bind(payload.image.as_deref().unwrap_or(""))
    .bind(payload.date.as_deref().unwrap_or(&now))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(story_id = %story_id, "Story created");

    let story = find_story(&state, &story_id).await?;
    Ok(ApiResponse::created(story, "Story created successfully"))
}

/// PUT /api/v1/stories/:id (editor roles)
pub async fn update_story(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(story_id): Path<String>,
    Json(payload): Json<UpdateStoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, EDITOR_ROLES)?;

    let story = find_story(&state, &story_id).await?;

    let mut updates: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(title) = payload.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        if title != story.title {
            let exists: Option<(String,)> =
                sqlx::query_as("SELECT id FROM stories WHERE title = ? AND id != ?")
                    .bind(title)
                    .bind(&story.id)
                    .fetch_optional(&state.db)
                    .await
                    .map_err(ApiError::DatabaseError)?;
            if exists.is_some() {
                return Err(ApiError::Conflict("Title already exists".to_string()));
            }
            updates.push("title = ?");
            binds.push(title.to_string());
        }
    }
    if let Some(content) = payload.content.as_deref().map(str::trim) {
        if content.len() < 10 {
            return Err(ApiError::ValidationError(
                "Content must be at least 10 characters".to_string(),
            ));
        }
        updates.push("content = ?");
        binds.push(content.to_string());
    }
    if let Some(date) = &payload.date {
        updates.push("story_date = ?");
        binds.push(date.clone());
    }
    if let Some(image) = &payload.image {
        updates.push("image = ?");
        binds.push(image.clone());
    }
    if let Some(is_active) = payload.is_active {
        updates.push("is_active = ?");
        binds.push((is_active as i64).to_string());
    }

    if updates.is_empty() {
        return Ok(ApiResponse::ok(story, "Story updated successfully"));
    }

    updates.push("updated_at = ?");
    binds.push(Utc::now().to_rfc3339());

    let sql = format!("UPDATE stories SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }
    query
        .bind(&story.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let updated = find_story(&state, &story_id).await?;
    Ok(ApiResponse::ok(updated, "Story updated successfully"))
}

/// DELETE /api/v1/stories/:id (editor roles)
pub async fn delete_story(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Path(story_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    authorize_roles(&user, EDITOR_ROLES)?;

    let result = sqlx::query("DELETE FROM stories WHERE id = ?")
        .bind(&story_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Story not found".to_string()));
    }

    info!(story_id = %story_id, "Story deleted");

    Ok(ApiResponse::ok((), "Story deleted successfully"))
}
