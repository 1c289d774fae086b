//! Per-request guards.
//!
//! `session_guard` resolves the caller's identity from the access cookie or
//! Authorization header, transparently re-issuing the access credential from
//! the refresh cookie when it has expired. `require_admin_access` layers the
//! admin-dashboard gate on top of an already resolved identity.

use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::cookies::{self, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use super::error::AuthError;
use super::extractors::{AdminGate, CurrentUser};
use super::models::{Role, User};
use super::tokens;
use crate::admin::models::AdminProfile;
use crate::common::{safe_email_log, ApiError, AppState};

/// Bounded wait for credential-store lookups during authentication
const IDENTITY_LOOKUP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Session guard middleware.
///
/// State machine: a valid access token resolves the identity directly; an
/// expired one triggers exactly one refresh attempt against the refresh
/// cookie, which must match the value persisted on the user record. On a
/// successful refresh the replacement access cookie rides on the response
/// next to whatever the handler produced.
pub async fn session_guard(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).to_string());

    let access_token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or(bearer);

    let Some(access_token) = access_token else {
        warn!("Authentication failed: no access token provided");
        return Err(AuthError::NoCredential.into());
    };

    match tokens::decode_token(&access_token, &state.access_token_secret) {
        Ok(claims) => {
            let user = resolve_identity(&state, &claims.sub).await?;
            debug!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                "Access token accepted"
            );
            request.extensions_mut().insert(CurrentUser::from(&user));
            Ok(next.run(request).await)
        }
        Err(AuthError::ExpiredCredential) => {
            refresh_and_continue(&state, &jar, request, next).await
        }
        Err(e) => {
            warn!(error = %e, "JWT token validation failed");
            Err(e.into())
        }
    }
}

/// The refresh leg of the session guard, attempted exactly once per request.
async fn refresh_and_continue(
    state: &AppState,
    jar: &CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let refresh_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AuthError::RefreshCredentialMissing)?;

    let claims = tokens::decode_token(&refresh_token, &state.refresh_token_secret)
        .map_err(|_| AuthError::RefreshCredentialInvalid)?;

    let user = resolve_identity(state, &claims.sub).await?;

    // The stored value is the single active refresh token; anything else has
    // been superseded by a later login or refresh.
    if user.refresh_token.as_deref() != Some(refresh_token.as_str()) {
        warn!(user_id = %user.id, "Stale refresh token presented");
        return Err(AuthError::RefreshCredentialSuperseded.into());
    }

    let fresh_access = tokens::sign_access_token(state, &user.id)?;
    debug!(user_id = %user.id, "Access token re-issued from refresh token");

    request.extensions_mut().insert(CurrentUser::from(&user));
    let response = next.run(request).await;

    // The replacement credential composes with the handler's own response
    // headers instead of replacing them.
    let refreshed = CookieJar::new().add(cookies::access_cookie(state, fresh_access));
    Ok((refreshed, response).into_response())
}

async fn resolve_identity(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    let lookup = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db);

    timeout(IDENTITY_LOOKUP_TIMEOUT, lookup)
        .await
        .map_err(|_| {
            warn!(user_id = %user_id, "Credential store lookup timed out");
            ApiError::InternalServer("credential store lookup timed out".to_string())
        })?
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "Authentication failed: user not found");
            AuthError::IdentityNotFound.into()
        })
}

/// Admin-dashboard gate, layered inside `session_guard`.
///
/// CUSTOMER is always rejected, SUPER_ADMIN passes without a profile,
/// ADMIN/SUB_ADMIN need an existing, active admin profile. The loaded
/// profile is attached for reuse by permission checks downstream.
pub async fn require_admin_access(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    match user.role {
        Role::Customer => {
            warn!(user_id = %user.id, "Customer attempted admin access");
            Err(ApiError::Forbidden(
                "Customers cannot access admin dashboard".to_string(),
            ))
        }
        Role::SuperAdmin => {
            request.extensions_mut().insert(AdminGate { profile: None });
            Ok(next.run(request).await)
        }
        Role::Admin | Role::SubAdmin => {
            let profile = sqlx::query_as::<_, AdminProfile>(
                "SELECT * FROM admin_profiles WHERE user_id = ?",
            )
            .bind(&user.id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

            match profile {
                Some(p) if p.is_active != 0 => {
                    request
                        .extensions_mut()
                        .insert(AdminGate { profile: Some(p) });
                    Ok(next.run(request).await)
                }
                _ => {
                    warn!(user_id = %user.id, "Admin profile missing or inactive");
                    Err(AuthError::AdminAccountInactiveOrMissing.into())
                }
            }
        }
    }
}
