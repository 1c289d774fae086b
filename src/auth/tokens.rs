//! Token issuer: signed access/refresh JWTs and one-time e-mail tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;

use super::error::AuthError;
use crate::common::{ApiError, AppState};

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Both halves of a freshly issued session
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign(user_id: &str, secret: &str, ttl: Duration) -> Result<String, ApiError> {
    let expiry = Utc::now() + ttl;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiry.timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, "JWT signing failed");
        ApiError::InternalServer(
            "Something went wrong while generating refresh and access tokens".to_string(),
        )
    })
}

pub fn sign_access_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    sign(
        user_id,
        &state.access_token_secret,
        Duration::minutes(state.access_ttl_minutes),
    )
}

pub fn sign_refresh_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    sign(
        user_id,
        &state.refresh_token_secret,
        Duration::days(state.refresh_ttl_days),
    )
}

/// Decode and verify a token against the given secret.
/// Expiry is reported separately from other failures so the session guard
/// can branch into the refresh path.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
        _ => AuthError::InvalidCredential,
    })
}

/// Issue an access/refresh pair and persist the refresh token onto the user
/// record. Overwriting the stored value is what revokes earlier sessions;
/// the pair is only returned to the caller once the write has succeeded.
pub async fn issue_token_pair(state: &AppState, user_id: &str) -> Result<TokenPair, ApiError> {
    let access_token = sign_access_token(state, user_id)?;
    let refresh_token = sign_refresh_token(state, user_id)?;

    let now = Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE users SET refresh_token = ?, updated_at = ? WHERE id = ?")
        .bind(&refresh_token)
        .bind(&now)
        .bind(user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(AuthError::IdentityNotFound.into());
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Generate a one-time e-mail token: the raw value goes into the mail, only
/// its sha256 digest is stored.
pub fn generate_temporary_token() -> (String, String) {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    let hashed = hash_temporary_token(&raw);
    (raw, hashed)
}

/// sha256 hex digest of a presented one-time token
pub fn hash_temporary_token(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}
