//! Role and module/right permission checks

use tracing::warn;

use super::error::AuthError;
use super::extractors::{AdminGate, CurrentUser};
use super::models::Role;
use crate::admin::models::{AdminProfile, PermissionEntry};
use crate::common::{ApiError, AppState};

pub const DEFAULT_RIGHT: &str = "VIEW";

/// Pure role membership check
pub fn authorize_roles(user: &CurrentUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        warn!(user_id = %user.id, role = %user.role.as_str(), "Role check failed");
        Err(AuthError::InsufficientRole.into())
    }
}

/// Case-insensitive match of a module/right pair against permission entries
pub fn has_permission(entries: &[PermissionEntry], module: &str, right: &str) -> bool {
    entries.iter().any(|p| {
        p.module.eq_ignore_ascii_case(module)
            && p.rights.iter().any(|r| r.eq_ignore_ascii_case(right))
    })
}

/// Fine-grained permission check.
///
/// SUPER_ADMIN bypasses. The profile attached by `require_admin_access` is
/// reused when present (its active flag was already verified there); a
/// freshly loaded profile gets its own active check.
pub async fn require_permission(
    state: &AppState,
    user: &CurrentUser,
    gate: Option<&AdminGate>,
    module: &str,
    right: &str,
) -> Result<(), ApiError> {
    if user.role == Role::SuperAdmin {
        return Ok(());
    }

    let loaded;
    let profile = match gate.and_then(|g| g.profile.as_ref()) {
        Some(profile) => profile,
        None => {
            loaded = sqlx::query_as::<_, AdminProfile>(
                "SELECT * FROM admin_profiles WHERE user_id = ?",
            )
            .bind(&user.id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or(AuthError::AdminProfileMissing)?;

            if loaded.is_active == 0 {
                return Err(AuthError::AdminProfileInactive.into());
            }
            &loaded
        }
    };

    if has_permission(&profile.permission_entries(), module, right) {
        Ok(())
    } else {
        warn!(
            user_id = %user.id,
            module = %module,
            right = %right,
            "Permission check failed"
        );
        Err(AuthError::MissingPermission {
            module: module.to_string(),
            right: right.to_string(),
        }
        .into())
    }
}
