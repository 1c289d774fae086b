//! Contact data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MESSAGE_STATUSES: &[&str] = &["new", "read", "archived"];

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactSetting {
    pub id: String,
    pub headline: String,
    pub subheading: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
    pub map_embed: Option<String>,
    pub is_active: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactSettingPayload {
    pub headline: Option<String>,
    pub subheading: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
    pub map_embed: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub status: String,
    pub handled_by: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub name: String,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}
