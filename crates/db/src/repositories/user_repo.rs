//! Repository for the `users` table.
//!
//! Soft-deleted users are invisible to every read in this module.

use sqlx::PgConnection;

use sitelog_core::types::DbId;

use crate::filters::{SqlArg, WhereBuilder};
use crate::models::user::{CreateUser, UpdateUser, User, UserFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, password_hash, role, is_deleted, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(input.role)
            .fetch_one(&mut *conn)
            .await
    }

    /// Update username and role. Returns `None` if the user is missing or deleted.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET username = $1, role = $2, updated_at = NOW()
             WHERE id = $3 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(input.role)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Replace the stored password hash. Returns `true` if a row was updated.
    pub async fn update_password(
        conn: &mut PgConnection,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW()
             WHERE id = $2 AND is_deleted = false",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a user deleted and suffix the username with
    /// ` (deleted)-<timestamp>` so the name can be registered again.
    ///
    /// Returns `true` if a live user was deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                is_deleted = true,
                username   = username || ' (deleted)-' || NOW()::TEXT,
                updated_at = NOW()
             WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a live user by id.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live user by exact username.
    pub async fn find_by_username(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE username = $1 AND is_deleted = false");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Paginated, filtered listing of live users, newest first. Returns the
    /// page and the total number of rows matching the same filters.
    pub async fn search(
        conn: &mut PgConnection,
        filter: &UserFilter,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let mut conditions = WhereBuilder::new();
        conditions
            .push_raw("is_deleted = false")
            .push_contains("username", filter.search.as_deref())
            .push_opt("role = {}", filter.role, SqlArg::SmallInt)
            .push_opt("created_at::DATE >= {}", filter.from_date, SqlArg::Date)
            .push_opt("created_at::DATE <= {}", filter.to_date, SqlArg::Date);
        let where_clause = conditions.clause();

        let count_query = format!("SELECT COUNT(*) FROM users {where_clause}");
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(&mut *conn)
            .await?;

        let limit_idx = conditions.next_index();
        let offset_idx = limit_idx + 1;
        let query = format!(
            "SELECT {COLUMNS} FROM users {where_clause} \
             ORDER BY id DESC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );
        let rows = conditions
            .bind_as(sqlx::query_as::<_, User>(&query))
            .bind(filter.page.limit())
            .bind(filter.page.offset())
            .fetch_all(&mut *conn)
            .await?;

        Ok((rows, total))
    }
}
