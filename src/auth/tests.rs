//! Tests for the auth module
//!
//! Covers the token issuer, the refresh single-session property, role and
//! permission checks, and the credential cookies.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::admin::models::PermissionEntry;
    use crate::auth::extractors::CurrentUser;
    use crate::auth::models::Role;
    use crate::auth::{cookies, permissions, tokens};
    use crate::common::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    fn test_state(db: SqlitePool) -> AppState {
        AppState {
            db,
            access_token_secret: "access_secret".to_string(),
            refresh_token_secret: "refresh_secret".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 30,
            cookie_domain: None,
            cookie_secure: false,
            base_url: "http://localhost:8080".to_string(),
            forgot_password_redirect_url: "http://localhost:5173/reset".to_string(),
        }
    }

    async fn memory_state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations");
        test_state(pool)
    }

    async fn insert_user(state: &AppState, id: &str) {
        sqlx::query(
            "INSERT INTO users (id, user_name, full_name, email, password_hash) \
             VALUES (?, ?, 'Test User', ?, 'x')",
        )
        .bind(id)
        .bind(format!("user{}", id))
        .bind(format!("{}@example.com", id))
        .execute(&state.db)
        .await
        .expect("insert user");
    }

    fn customer(role: Role) -> CurrentUser {
        CurrentUser {
            id: "U_000001".to_string(),
            user_name: "tester".to_string(),
            email: "tester@example.com".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_access_token_round_trip() {
        let state = test_state(SqlitePool::connect_lazy("sqlite::memory:").unwrap());
        let token = tokens::sign_access_token(&state, "U_ABC123").expect("sign");
        let claims = tokens::decode_token(&token, &state.access_token_secret).expect("decode");
        assert_eq!(claims.sub, "U_ABC123");
    }

    #[tokio::test]
    async fn test_decode_fails_with_wrong_secret() {
        let state = test_state(SqlitePool::connect_lazy("sqlite::memory:").unwrap());
        let token = tokens::sign_access_token(&state, "U_ABC123").expect("sign");
        let err = tokens::decode_token(&token, "some_other_secret").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredential);
    }

    #[test]
    fn test_expired_token_reported_as_expired() {
        use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

        let claims = tokens::Claims {
            sub: "U_ABC123".to_string(),
            exp: 1_000_000, // 1970, long past
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"access_secret"),
        )
        .unwrap();

        let err = tokens::decode_token(&token, "access_secret").unwrap_err();
        assert_eq!(err, AuthError::ExpiredCredential);
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let err = tokens::decode_token("not-a-jwt", "access_secret").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredential);
    }

    #[test]
    fn test_temporary_token_hashing() {
        let (raw, hashed) = tokens::generate_temporary_token();
        assert_ne!(raw, hashed);
        assert_eq!(tokens::hash_temporary_token(&raw), hashed);
        assert_eq!(raw.len(), 40); // 20 random bytes, hex encoded
    }

    #[tokio::test]
    async fn test_issue_token_pair_persists_refresh_token() {
        let state = memory_state().await;
        insert_user(&state, "U_PAIR01").await;

        let pair = tokens::issue_token_pair(&state, "U_PAIR01").await.expect("pair");

        let stored: Option<String> =
            sqlx::query_scalar("SELECT refresh_token FROM users WHERE id = 'U_PAIR01'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(stored.as_deref(), Some(pair.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_second_login_supersedes_first_refresh_token() {
        let state = memory_state().await;
        insert_user(&state, "U_PAIR02").await;

        let first = tokens::issue_token_pair(&state, "U_PAIR02").await.expect("pair");
        // jsonwebtoken only has second-level expiry resolution; force distinct
        // tokens by waiting past the second boundary
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let second = tokens::issue_token_pair(&state, "U_PAIR02").await.expect("pair");
        assert_ne!(first.refresh_token, second.refresh_token);

        // Only the latest value survives; a guard comparing the first token
        // against the store must now treat it as superseded
        let stored: Option<String> =
            sqlx::query_scalar("SELECT refresh_token FROM users WHERE id = 'U_PAIR02'")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(stored.as_deref(), Some(second.refresh_token.as_str()));
        assert_ne!(stored.as_deref(), Some(first.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_issue_token_pair_rejects_unknown_identity() {
        let state = memory_state().await;
        let result = tokens::issue_token_pair(&state, "U_MISSING").await;
        assert!(result.is_err(), "pair must not be returned without persistence");
    }

    #[test]
    fn test_authorize_roles_pass_and_fail() {
        let admin = customer(Role::Admin);
        assert!(permissions::authorize_roles(
            &admin,
            &[Role::SuperAdmin, Role::Admin, Role::SubAdmin]
        )
        .is_ok());

        let shopper = customer(Role::Customer);
        assert!(permissions::authorize_roles(
            &shopper,
            &[Role::SuperAdmin, Role::Admin, Role::SubAdmin]
        )
        .is_err());
    }

    #[test]
    fn test_permission_match_is_case_insensitive() {
        let entries = vec![PermissionEntry {
            module: "PRODUCTS".to_string(),
            rights: vec!["CREATE".to_string()],
        }];
        assert!(permissions::has_permission(&entries, "products", "create"));
        assert!(permissions::has_permission(&entries, "Products", "Create"));
        assert!(permissions::has_permission(&entries, "PRODUCTS", "CREATE"));
    }

    #[test]
    fn test_permission_miss() {
        let entries = vec![PermissionEntry {
            module: "PRODUCTS".to_string(),
            rights: vec!["VIEW".to_string()],
        }];
        assert!(!permissions::has_permission(&entries, "products", "create"));
        assert!(!permissions::has_permission(&entries, "cms", "view"));
        assert!(!permissions::has_permission(&[], "products", "view"));
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Customer, Role::SubAdmin, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("OWNER"), None);
    }

    #[tokio::test]
    async fn test_credential_cookies_are_httponly_and_scoped() {
        let mut state = test_state(SqlitePool::connect_lazy("sqlite::memory:").unwrap());
        state.cookie_secure = true;
        state.cookie_domain = Some(".example.com".to_string());

        let access = cookies::access_cookie(&state, "token-value".to_string());
        assert_eq!(access.name(), "accessToken");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        // the cookie crate strips the leading dot on read-back
        assert_eq!(access.domain(), Some("example.com"));
        assert_eq!(access.max_age(), Some(time::Duration::minutes(15)));

        let refresh = cookies::refresh_cookie(&state, "token-value".to_string());
        assert_eq!(refresh.name(), "refreshToken");
        assert_eq!(refresh.max_age(), Some(time::Duration::days(30)));
    }

    #[tokio::test]
    async fn test_removal_cookie_expires_immediately() {
        let state = test_state(SqlitePool::connect_lazy("sqlite::memory:").unwrap());
        let removal = cookies::removal_cookie(&state, cookies::ACCESS_TOKEN_COOKIE);
        assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
        assert_eq!(removal.value(), "");
    }
}
