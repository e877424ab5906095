//! Browser session model (`user_sessions` table).

use sqlx::FromRow;

use sitelog_core::types::{DbId, Timestamp};

/// A server-side browser session.
///
/// `token_hash` is the SHA-256 of the opaque cookie value; `access_token`
/// is the signed token the session authenticates with.
#[derive(Debug, Clone, FromRow)]
pub struct WebSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub access_token: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub access_token: String,
    pub expires_at: Timestamp,
}
