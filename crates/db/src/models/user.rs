//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use sitelog_core::pagination::Page;
use sitelog_core::roles::{Role, RoleCode};
use sitelog_core::types::{Date, DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub role: RoleCode,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_code(self.role)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    /// Stored role code (1 = admin, 3 = super-admin).
    pub role: RoleCode,
    pub role_name: &'static str,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role_name = user.role().name();
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            role_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub role: RoleCode,
}

/// DTO for updating a user's username and role.
#[derive(Debug)]
pub struct UpdateUser {
    pub username: String,
    pub role: RoleCode,
}

/// Filters for the paginated user listing.
#[derive(Debug, Clone)]
pub struct UserFilter {
    /// Case-insensitive username substring.
    pub search: Option<String>,
    pub role: Option<RoleCode>,
    /// Inclusive lower bound on the creation date.
    pub from_date: Option<Date>,
    /// Inclusive upper bound on the creation date.
    pub to_date: Option<Date>,
    pub page: Page,
}
