//! Repository for the `user_sessions` table.

use sqlx::PgConnection;

use sitelog_core::types::DbId;

use crate::models::session::{CreateSession, WebSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, access_token, expires_at, created_at";

/// Provides CRUD operations for browser sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateSession,
    ) -> Result<WebSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, access_token, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(&input.access_token)
            .bind(input.expires_at)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an unexpired session by its token hash.
    pub async fn find_active_by_token_hash(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<Option<WebSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE token_hash = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, WebSession>(&query)
            .bind(token_hash)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Delete one session. Returns `true` if a row was removed.
    pub async fn delete_by_token_hash(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn cleanup_expired(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
