//! One database transaction per request.
//!
//! [`RequestTx`] begins a transaction when the handler is entered. The
//! handler commits explicitly once all of its writes succeeded; every other
//! exit (an early `?` return, a rejected extractor further down, a panic)
//! drops the transaction, and sqlx rolls it back on drop.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The request-scoped transaction.
///
/// List it after the auth extractors so rejected requests never take a
/// connection from the pool:
///
/// ```ignore
/// async fn handler(auth: RequireSuperAdminOrAdmin, mut tx: RequestTx) -> AppResult<...> {
///     let project = ProjectRepo::find_if_owner(tx.conn(), id, auth.user.scope()).await?;
///     tx.commit().await?;
///     ...
/// }
/// ```
pub struct RequestTx {
    tx: Transaction<'static, Postgres>,
}

impl RequestTx {
    pub async fn begin(pool: &sitelog_db::DbPool) -> AppResult<Self> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Connection handle to pass to repository calls.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    pub async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for RequestTx {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        RequestTx::begin(&state.pool).await
    }
}
