//! Authentication routes

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use super::{handlers, require_admin_access, session_guard};

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/v1/auth/register` - Create a customer account
/// - `POST /api/v1/auth/login` - Credential login, sets token cookies
/// - `POST /api/v1/auth/refresh-token` - Rotate the token pair
/// - `GET  /api/v1/auth/verify-email/:token` - Confirm an email address
/// - `POST /api/v1/auth/forgot-password` / `POST reset-password/:token`
/// - Session-guarded: logout, resend-verification, change-password, me,
///   update-account
/// - Admin: `GET /api/v1/auth/users` (USERS:VIEW)
pub fn auth_routes() -> Router {
    let protected = Router::new()
        .route("/api/v1/auth/logout", post(handlers::logout))
        .route(
            "/api/v1/auth/resend-verification",
            post(handlers::resend_verification),
        )
        .route(
            "/api/v1/auth/change-password",
            post(handlers::change_password),
        )
        .route("/api/v1/auth/me", get(handlers::me))
        .route(
            "/api/v1/auth/update-account",
            patch(handlers::update_account),
        )
        .route_layer(middleware::from_fn(session_guard));

    let admin = Router::new()
        .route("/api/v1/auth/users", get(handlers::get_all_users))
        .route_layer(middleware::from_fn(require_admin_access))
        .route_layer(middleware::from_fn(session_guard));

    Router::new()
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/login", post(handlers::login))
        .route(
            "/api/v1/auth/refresh-token",
            post(handlers::refresh_access_token),
        )
        .route(
            "/api/v1/auth/verify-email/:token",
            get(handlers::verify_email),
        )
        .route(
            "/api/v1/auth/forgot-password",
            post(handlers::forgot_password),
        )
        .route(
            "/api/v1/auth/reset-password/:token",
            post(handlers::reset_password),
        )
        .merge(protected)
        .merge(admin)
}
