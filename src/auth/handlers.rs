//! Authentication handlers

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::cookies::{self, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use super::error::AuthError;
use super::extractors::{AdminGate, CurrentUser};
use super::models::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, Role, UpdateAccountRequest, User, UserListQuery,
};
use super::permissions;
use super::tokens;
use crate::common::{
    generate_user_id, safe_email_log, ApiError, ApiResponse, AppState, Pagination,
};
use crate::services::email;

/// One-time verification/reset tokens stay valid this long
const TEMPORARY_TOKEN_TTL_MINUTES: i64 = 20;

/// Bounded wait on credential-store lookups in the login/registration path
const LOOKUP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

async fn find_user_by_email(state: &AppState, email: &str) -> Result<Option<User>, ApiError> {
    let lookup = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db);

    timeout(LOOKUP_TIMEOUT, lookup)
        .await
        .map_err(|_| ApiError::InternalServer("credential store lookup timed out".to_string()))?
        .map_err(ApiError::DatabaseError)
}

async fn find_user_by_id(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))
}

fn expiry_in(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes)).to_rfc3339()
}

fn is_expired(expiry: &Option<String>) -> bool {
    match expiry.as_deref().and_then(|e| DateTime::parse_from_rfc3339(e).ok()) {
        Some(expiry) => expiry < Utc::now(),
        None => true,
    }
}

/// POST /api/v1/auth/register
///
/// Creates a CUSTOMER account, issues an email-verification token and mails
/// the verification link.
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let user_name = payload.user_name.trim().to_lowercase();
    let full_name = payload.full_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if user_name.is_empty() || full_name.is_empty() || email.is_empty() || payload.password.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Username, full name, email, and password are required".to_string(),
        ));
    }

    if find_user_by_email(&state, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let existing_name: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE user_name = ?")
            .bind(&user_name)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;
    if existing_name.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))?;

    let user_id = generate_user_id();
    let now = Utc::now().to_rfc3339();
    let (raw_token, hashed_token) = tokens::generate_temporary_token();
    let token_expiry = expiry_in(TEMPORARY_TOKEN_TTL_MINUTES);

    sqlx::query(
        r#"
        INSERT INTO users (
            id, user_name, full_name, email, password_hash, phone_number, role,
            is_email_verified, email_verification_token, email_verification_expiry,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, 'CUSTOMER', 0, ?, ?, ?, ?)
        "#,
    )
    .bind(&user_id)
    .bind(&user_name)
    .bind(&full_name)
    .bind(&email)
    .bind(&password_hash)
    .bind(payload.phone_number.as_deref().unwrap_or(""))
    .bind(&hashed_token)
    .bind(&token_expiry)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let verification_url = format!(
        "{}/api/v1/auth/verify-email/{}",
        state.base_url, raw_token
    );
    email::queue_email(
        &email,
        "Verify your email address",
        &email::verification_email(&user_name, &verification_url),
    );

    info!(
        user_id = %user_id,
        email = %safe_email_log(&email),
        "User registered"
    );

    let created = find_user_by_id(&state, &user_id).await?;
    Ok(ApiResponse::created(created, "User registered successfully"))
}

/// GET /api/v1/auth/verify-email/:token
pub async fn verify_email(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if token.is_empty() {
        return Err(ApiError::BadRequest(
            "Token is required to verify email".to_string(),
        ));
    }

    let hashed = tokens::hash_temporary_token(&token);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_verification_token = ?")
        .bind(&hashed)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = match user {
        Some(u) if !is_expired(&u.email_verification_expiry) => u,
        _ => return Err(ApiError::BadRequest("Invalid or expired token".to_string())),
    };

    sqlx::query(
        r#"
        UPDATE users
        SET is_email_verified = 1,
            email_verification_token = NULL,
            email_verification_expiry = NULL,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(&user.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(user_id = %user.id, "Email verified");

    Ok(ApiResponse::ok((), "User verified successfully"))
}

/// POST /api/v1/auth/login
///
/// Issues the access/refresh pair and sets both credential cookies. The
/// stored refresh token is replaced, which revokes any earlier session.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = find_user_by_email(&state, &payload.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| {
            warn!(email = %safe_email_log(&payload.email), "Login failed: unknown email");
            ApiError::Unauthorized("Invalid email or password".to_string())
        })?;

    let password_ok = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::InternalServer(format!("password verification failed: {}", e)))?;
    if !password_ok {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let pair = tokens::issue_token_pair(&state, &user.id).await?;

    info!(user_id = %user.id, "User logged in");

    let jar = jar
        .add(cookies::access_cookie(&state, pair.access_token))
        .add(cookies::refresh_cookie(&state, pair.refresh_token));

    let user = find_user_by_id(&state, &user.id).await?;
    Ok((
        jar,
        ApiResponse::ok(
            serde_json::json!({ "user": user }),
            "User logged in successfully",
        ),
    ))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(&user.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    debug!(user_id = %user.id, "User logged out");

    let jar = jar
        .add(cookies::removal_cookie(&state, ACCESS_TOKEN_COOKIE))
        .add(cookies::removal_cookie(&state, REFRESH_TOKEN_COOKIE));

    Ok((jar, ApiResponse::ok((), "User logged out successfully")))
}

/// POST /api/v1/auth/refresh-token
///
/// Rotates the token pair. The presented refresh token (cookie or body)
/// must match the single active value persisted on the user record.
pub async fn refresh_access_token(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let incoming = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| payload.and_then(|Json(p)| p.refresh_token));

    let incoming = incoming
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".to_string()))?;

    let claims = tokens::decode_token(&incoming, &state.refresh_token_secret)
        .map_err(|_| AuthError::RefreshCredentialInvalid)?;

    let user = find_user_by_id(&state, &claims.sub)
        .await
        .map_err(|_| ApiError::from(AuthError::RefreshCredentialInvalid))?;

    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        warn!(user_id = %user.id, "Refresh rejected: token superseded");
        return Err(AuthError::RefreshCredentialSuperseded.into());
    }

    let pair = tokens::issue_token_pair(&state, &user.id).await?;

    debug!(user_id = %user.id, "Token pair rotated");

    let jar = jar
        .add(cookies::access_cookie(&state, pair.access_token.clone()))
        .add(cookies::refresh_cookie(&state, pair.refresh_token.clone()));

    Ok((
        jar,
        ApiResponse::ok(
            serde_json::json!({
                "access_token": pair.access_token,
                "refresh_token": pair.refresh_token,
            }),
            "Access token refreshed",
        ),
    ))
}

/// POST /api/v1/auth/resend-verification
pub async fn resend_verification(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let record = find_user_by_id(&state, &user.id).await?;
    if record.is_email_verified != 0 {
        return Err(ApiError::Conflict("Email is already verified!".to_string()));
    }

    let (raw_token, hashed_token) = tokens::generate_temporary_token();
    sqlx::query(
        r#"
        UPDATE users
        SET email_verification_token = ?, email_verification_expiry = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&hashed_token)
    .bind(expiry_in(TEMPORARY_TOKEN_TTL_MINUTES))
    .bind(Utc::now().to_rfc3339())
    .bind(&record.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let verification_url = format!(
        "{}/api/v1/auth/verify-email/{}",
        state.base_url, raw_token
    );
    email::queue_email(
        &record.email,
        "Please verify your email",
        &email::verification_email(&record.user_name, &verification_url),
    );

    Ok(ApiResponse::ok((), "Mail has been sent to your mail ID"))
}

/// POST /api/v1/auth/forgot-password
///
/// Always answers with the same message so the endpoint does not reveal
/// which addresses have accounts.
pub async fn forgot_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    const RESPONSE: &str = "Password reset mail has been sent on your mail id";

    let user = match find_user_by_email(&state, &payload.email.trim().to_lowercase()).await? {
        Some(user) => user,
        None => return Ok(ApiResponse::ok((), RESPONSE)),
    };

    let (raw_token, hashed_token) = tokens::generate_temporary_token();
    sqlx::query(
        r#"
        UPDATE users
        SET password_reset_token = ?, password_reset_expiry = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&hashed_token)
    .bind(expiry_in(TEMPORARY_TOKEN_TTL_MINUTES))
    .bind(Utc::now().to_rfc3339())
    .bind(&user.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let reset_url = format!("{}/{}", state.forgot_password_redirect_url, raw_token);
    email::queue_email(
        &user.email,
        "Password reset request",
        &email::password_reset_email(&user.user_name, &reset_url),
    );

    Ok(ApiResponse::ok((), RESPONSE))
}

/// POST /api/v1/auth/reset-password/:token
pub async fn reset_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.new_password.is_empty() {
        return Err(ApiError::BadRequest("New password is required".to_string()));
    }

    let hashed = tokens::hash_temporary_token(&token);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE password_reset_token = ?")
        .bind(&hashed)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = match user {
        Some(u) if !is_expired(&u.password_reset_expiry) => u,
        _ => return Err(ApiError::BadRequest("Token is invalid or expired".to_string())),
    };

    let password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))?;

    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = ?,
            password_reset_token = NULL,
            password_reset_expiry = NULL,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&password_hash)
    .bind(Utc::now().to_rfc3339())
    .bind(&user.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(user_id = %user.id, "Password reset");

    Ok(ApiResponse::ok((), "Password reset successfully"))
}

/// POST /api/v1/auth/change-password
pub async fn change_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.old_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Old password and new password are required".to_string(),
        ));
    }

    let record = find_user_by_id(&state, &user.id).await?;
    let password_ok = bcrypt::verify(&payload.old_password, &record.password_hash)
        .map_err(|e| ApiError::InternalServer(format!("password verification failed: {}", e)))?;
    if !password_ok {
        return Err(ApiError::BadRequest("Invalid old password".to_string()));
    }

    let password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))?;

    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(Utc::now().to_rfc3339())
        .bind(&record.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok((), "Password changed successfully"))
}

/// GET /api/v1/auth/me
pub async fn me(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let record = find_user_by_id(&state, &user.id).await?;
    Ok(ApiResponse::ok(record, "Current user fetched successfully"))
}

/// PATCH /api/v1/auth/update-account
pub async fn update_account(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.full_name.is_none()
        && payload.email.is_none()
        && payload.phone_number.is_none()
        && payload.address.is_none()
    {
        return Err(ApiError::BadRequest(
            "At least one field is required to update".to_string(),
        ));
    }

    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(full_name) = &payload.full_name {
        updates.push("full_name = ?");
        params.push(full_name.trim().to_string());
    }
    if let Some(email) = &payload.email {
        updates.push("email = ?");
        params.push(email.trim().to_lowercase());
    }
    if let Some(phone_number) = &payload.phone_number {
        updates.push("phone_number = ?");
        params.push(phone_number.clone());
    }
    if let Some(address) = &payload.address {
        updates.push("address = ?");
        params.push(address.clone());
    }
    updates.push("updated_at = ?");
    params.push(Utc::now().to_rfc3339());

    let sql = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query
        .bind(&user.id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Email already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let updated = find_user_by_id(&state, &user.id).await?;
    Ok(ApiResponse::ok(updated, "Account details updated successfully"))
}

/// GET /api/v1/auth/users
///
/// Admin listing with free-text search and role filter
pub async fn get_all_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: CurrentUser,
    gate: AdminGate,
    Query(params): Query<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    permissions::require_permission(&state, &user, Some(&gate), "USERS", "VIEW").await?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let role = match &params.role {
        Some(r) => Some(
            Role::parse(r)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown role: {}", r)))?,
        ),
        None => None,
    };

    let mut conditions: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
        conditions.push("(full_name LIKE ? OR user_name LIKE ? OR email LIKE ?)");
        let pattern = format!("%{}%", q);
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }
    if let Some(role) = role {
        conditions.push("role = ?");
        binds.push(role.as_str().to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind);
    }
    let total = count_query
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let list_sql = format!(
        "SELECT * FROM users {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut list_query = sqlx::query_as::<_, User>(&list_sql);
    for bind in &binds {
        list_query = list_query.bind(bind);
    }
    let users = list_query
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "users": users,
            "pagination": Pagination::new(page, limit, total),
        }),
        "Users fetched successfully",
    ))
}
