// src/admin/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pairing of a module name with the rights granted on it.
/// Stored uppercase; comparisons elsewhere are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionEntry {
    pub module: String,
    pub rights: Vec<String>,
}

/// Admin profile database model. `permissions` is a JSON array of
/// `PermissionEntry` values, the way other document-shaped fields are kept.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminProfile {
    pub id: String,
    pub user_id: String,
    pub is_active: i64,
    pub permissions: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl AdminProfile {
    /// Decoded permission entries; malformed JSON reads as no permissions
    pub fn permission_entries(&self) -> Vec<PermissionEntry> {
        serde_json::from_str(&self.permissions).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminProfileRequest {
    pub user_id: String,
    pub role: String,
    pub permissions: Option<Vec<PermissionEntry>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdminProfileRequest {
    pub permissions: Option<Vec<PermissionEntry>>,
    pub is_active: Option<bool>,
}

/// Listing row joined with the owning user's identity fields
#[derive(Debug, FromRow, Serialize)]
pub struct AdminProfileListing {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub role: String,
    pub is_active: i64,
    pub permissions: String,
    pub created_at: Option<String>,
}

/// Uppercase every module/right pair before storage
pub fn normalize_permissions(entries: &[PermissionEntry]) -> Vec<PermissionEntry> {
    entries
        .iter()
        .map(|entry| PermissionEntry {
            module: entry.module.trim().to_uppercase(),
            rights: entry
                .rights
                .iter()
                .map(|r| r.trim().to_uppercase())
                .collect(),
        })
        .collect()
}
