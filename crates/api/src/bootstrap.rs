//! Startup seeding of the first super-admin account.
//!
//! A fresh database has no users and user management is super-admin only,
//! so the first account has to come from configuration.

use sitelog_core::roles::ROLE_CODE_SUPER_ADMIN;
use sitelog_db::models::user::CreateUser;
use sitelog_db::repositories::UserRepo;
use sitelog_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Credentials of the super-admin to create when it does not exist yet.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl BootstrapAdmin {
    /// Read `BOOTSTRAP_SUPERADMIN_USERNAME` and `BOOTSTRAP_SUPERADMIN_PASSWORD`.
    ///
    /// Returns `None` unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var("BOOTSTRAP_SUPERADMIN_USERNAME").ok()?;
        let password = std::env::var("BOOTSTRAP_SUPERADMIN_PASSWORD").ok()?;
        if username.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            username: username.trim().to_string(),
            password,
        })
    }
}

/// Create the configured super-admin if no live user holds that username.
///
/// Returns `true` when a user was created.
pub async fn ensure_super_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    let mut conn = pool.acquire().await?;

    if UserRepo::find_by_username(&mut conn, &admin.username)
        .await?
        .is_some()
    {
        tracing::debug!(username = %admin.username, "Bootstrap super-admin already exists");
        return Ok(false);
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &mut conn,
        &CreateUser {
            username: admin.username.clone(),
            password_hash,
            role: ROLE_CODE_SUPER_ADMIN,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap super-admin created");
    Ok(true)
}
