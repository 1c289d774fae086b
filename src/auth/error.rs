//! Typed rejections for the session guard and authorization gates.
//!
//! Every variant is terminal for the current request; the only built-in
//! recovery path is the single refresh attempt inside the session guard,
//! which maps an `ExpiredCredential` into either a fresh access token or
//! one of the refresh failures below.

use thiserror::Error;

use crate::common::ApiError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No access token provided")]
    NoCredential,
    #[error("Invalid access token")]
    InvalidCredential,
    #[error("Access token expired")]
    ExpiredCredential,
    #[error("Refresh token not provided")]
    RefreshCredentialMissing,
    #[error("Invalid or expired refresh token")]
    RefreshCredentialInvalid,
    #[error("Refresh token is expired or used")]
    RefreshCredentialSuperseded,
    #[error("User not found for this token")]
    IdentityNotFound,
    #[error("insufficient permissions")]
    InsufficientRole,
    #[error("Your admin account is inactive or not configured")]
    AdminAccountInactiveOrMissing,
    #[error("Admin profile not found")]
    AdminProfileMissing,
    #[error("Your admin account is inactive")]
    AdminProfileInactive,
    #[error("Missing permission {module}:{right}")]
    MissingPermission { module: String, right: String },
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientRole
            | AuthError::AdminAccountInactiveOrMissing
            | AuthError::AdminProfileMissing
            | AuthError::AdminProfileInactive
            | AuthError::MissingPermission { .. } => ApiError::Forbidden(err.to_string()),
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}
