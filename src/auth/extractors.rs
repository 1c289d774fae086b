//! Request-context extractors for identities resolved by the guards

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use super::models::{Role, User};
use crate::admin::models::AdminProfile;
use crate::common::ApiError;

/// Identity resolved by `session_guard` and attached to the request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Admin context attached by `require_admin_access`.
/// `profile` is None exactly when the caller is SUPER_ADMIN.
#[derive(Debug, Clone)]
pub struct AdminGate {
    pub profile: Option<AdminProfile>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminGate
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminGate>()
            .cloned()
            .ok_or_else(|| ApiError::Forbidden("Admin access required".to_string()))
    }
}
