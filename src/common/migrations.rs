// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Only drop tables if RESET_DB environment variable is set to "true"
    // This prevents data loss on server restarts
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("Dropped old tables");
    }

    create_user_tables(pool).await?;
    create_catalog_tables(pool).await?;
    create_commerce_tables(pool).await?;
    create_content_tables(pool).await?;
    create_indexes(pool).await?;

    seed_super_admin(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let tables = [
        "messages",
        "contact_settings",
        "stories",
        "orders",
        "carts",
        "products",
        "admin_profiles",
        "users",
    ];
    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Users and admin profiles
async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            user_name TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            phone_number TEXT,
            address TEXT,
            avatar TEXT,
            role TEXT NOT NULL DEFAULT 'CUSTOMER',
            is_email_verified INTEGER NOT NULL DEFAULT 0,
            email_verification_token TEXT,
            email_verification_expiry TEXT,
            password_reset_token TEXT,
            password_reset_expiry TEXT,
            refresh_token TEXT,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            is_active INTEGER NOT NULL DEFAULT 1,
            permissions TEXT NOT NULL DEFAULT '[]',
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Product catalog
async fn create_catalog_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            product_number INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL,
            discount REAL NOT NULL DEFAULT 0,
            stock_quantity INTEGER NOT NULL DEFAULT 0,
            sku TEXT NOT NULL UNIQUE,
            category TEXT,
            brand TEXT,
            image_url TEXT NOT NULL DEFAULT '',
            additional_images TEXT NOT NULL DEFAULT '[]',
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Carts and orders
/// Cart line items live in a single JSON column so every mutation is one
/// row replace; `revision` backs the compare-and-swap update discipline.
async fn create_commerce_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS carts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            items TEXT NOT NULL DEFAULT '[]',
            revision INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            items TEXT NOT NULL DEFAULT '[]',
            total REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            shipping_address TEXT,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// CMS content: stories, contact settings, contact-form messages
async fn create_content_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stories (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            image TEXT NOT NULL DEFAULT '',
            story_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_settings (
            id TEXT PRIMARY KEY,
            headline TEXT NOT NULL DEFAULT 'Get in touch',
            subheading TEXT,
            address TEXT,
            phone TEXT,
            email TEXT,
            hours TEXT,
            map_embed TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            subject TEXT,
            body TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            handled_by TEXT REFERENCES admin_profiles(id),
            created_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        "CREATE INDEX IF NOT EXISTS idx_users_user_name ON users(user_name)",
        "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
        "CREATE INDEX IF NOT EXISTS idx_users_verification_token ON users(email_verification_token)",
        "CREATE INDEX IF NOT EXISTS idx_users_reset_token ON users(password_reset_token)",
        "CREATE INDEX IF NOT EXISTS idx_admin_profiles_user ON admin_profiles(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_products_sku ON products(sku)",
        "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)",
        "CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand)",
        "CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_carts_user ON carts(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
        "CREATE INDEX IF NOT EXISTS idx_stories_created ON stories(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_contact_settings_created ON contact_settings(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_messages_status ON messages(status, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_messages_email ON messages(email, created_at)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

/// Seed the initial SUPER_ADMIN account from environment variables.
/// Only runs when SUPER_ADMIN_EMAIL and SUPER_ADMIN_PASSWORD are both set
/// and no user with that email exists yet.
async fn seed_super_admin(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let email = match env::var("SUPER_ADMIN_EMAIL") {
        Ok(v) if !v.is_empty() => v.to_lowercase(),
        _ => return Ok(()),
    };
    let password = match env::var("SUPER_ADMIN_PASSWORD") {
        Ok(v) if !v.is_empty() => v,
        _ => return Ok(()),
    };

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let password_hash = match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "Failed to hash SUPER_ADMIN_PASSWORD, skipping seed");
            return Ok(());
        }
    };

    let id = super::generate_user_id();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (
            id, user_name, full_name, email, password_hash, role,
            is_email_verified, created_at, updated_at
        )
        VALUES (?, 'superadmin', 'Super Admin', ?, ?, 'SUPER_ADMIN', 1, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    info!(user_id = %id, "Seeded SUPER_ADMIN account from environment");

    Ok(())
}
