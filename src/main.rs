// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{env, net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod auth;
mod cart;
mod common;
mod contact;
mod orders;
mod products;
mod services;
mod stories;

use common::AppState;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://shop_api.db".to_string());
    let access_token_secret = env::var("ACCESS_TOKEN_SECRET")
        .unwrap_or_else(|_| "replace_with_strong_access_secret".to_string());
    let refresh_token_secret = env::var("REFRESH_TOKEN_SECRET")
        .unwrap_or_else(|_| "replace_with_strong_refresh_secret".to_string());
    let access_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(15);
    let refresh_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(30);
    let base_url =
        env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let forgot_password_redirect_url = env::var("FORGOT_PASSWORD_REDIRECT_URL")
        .unwrap_or_else(|_| format!("{}/reset-password", base_url));

    // Cookies are host-only and plain-http in development; in production
    // they are secure and scoped to the configured domain so the dashboard
    // subdomain shares the session.
    let is_production = env::var("ENVIRONMENT")
        .map(|v| v == "production")
        .unwrap_or(false);
    let cookie_domain = if is_production {
        env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty())
    } else {
        None
    };

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        access_token_secret,
        refresh_token_secret,
        access_ttl_minutes,
        refresh_ttl_days,
        cookie_domain,
        cookie_secure: is_production,
        base_url,
        forgot_password_redirect_url,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // CATALOG ROUTES
        // ====================================================================
        .merge(products::products_routes())
        // ====================================================================
        // CART AND ORDER ROUTES
        // ====================================================================
        .merge(cart::cart_routes())
        .merge(orders::orders_routes())
        // ====================================================================
        // CMS ROUTES (Stories, Contact Settings, Messages)
        // ====================================================================
        .merge(stories::stories_routes())
        .merge(contact::contact_settings_routes())
        .merge(contact::messages_routes())
        // ====================================================================
        // ADMIN ROUTES (Admin profiles and permissions)
        // ====================================================================
        .merge(admin::admin_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(Extension(shared.clone()))
        .layer({
            // Get CORS origins from environment variable
            let cors_origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| {
                "http://localhost:5173,http://localhost:5174".to_string()
            });

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
