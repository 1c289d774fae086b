//! Cookie carriage for the access and refresh credentials.
//!
//! Both cookies are httponly and same-site restricted; in production they
//! are additionally marked secure and scoped to the configured domain so a
//! dashboard subdomain can share the session.

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::common::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn build(
    state: &AppState,
    name: &'static str,
    value: String,
    max_age: time::Duration,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age);

    if let Some(domain) = &state.cookie_domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

pub fn access_cookie(state: &AppState, token: String) -> Cookie<'static> {
    build(
        state,
        ACCESS_TOKEN_COOKIE,
        token,
        time::Duration::minutes(state.access_ttl_minutes),
    )
}

pub fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    build(
        state,
        REFRESH_TOKEN_COOKIE,
        token,
        time::Duration::days(state.refresh_ttl_days),
    )
}

/// Expired replacement used to clear a credential cookie on logout
pub fn removal_cookie(state: &AppState, name: &'static str) -> Cookie<'static> {
    build(state, name, String::new(), time::Duration::ZERO)
}
