// Application state shared across all modules

use sqlx::SqlitePool;

/// Application state containing the database pool and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub base_url: String,
    pub forgot_password_redirect_url: String,
}
