//! Identity extractors for API and browser requests.
//!
//! Both entry points end in [`resolve_identity`]: verify the access token,
//! then reload the user so soft-deleted accounts and changed roles take
//! effect immediately.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use sitelog_core::roles::{OwnerScope, Role};
use sitelog_core::types::DbId;
use sitelog_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::session::session_cookie_value;
use crate::state::AppState;

const UNAUTHORIZED: &str = "Unauthorized";

/// Authenticated caller of a JSON API route (`Authorization: Bearer <token>`).
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = ?user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub username: String,
    /// Current role, read from the database rather than the token.
    pub role: Role,
}

impl AuthUser {
    /// Which owners' projects this user may see and change.
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::for_user(self.user_id, self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Need token header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid token"))?;

        resolve_identity(state, token).await
    }
}

/// Verify an access token and load the live user it names.
///
/// Fails with 401 "Unauthorized" for a bad or expired token and for a
/// missing or soft-deleted user.
pub async fn resolve_identity(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let claims = validate_token(token, &state.config.jwt).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        AppError::unauthorized(UNAUTHORIZED)
    })?;

    let mut conn = state.pool.acquire().await?;
    let user = UserRepo::find_by_id(&mut conn, claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED))?;

    let role = user.role();
    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        role,
    })
}

// ---------------------------------------------------------------------------
// Browser sessions
// ---------------------------------------------------------------------------

/// Authenticated caller of a browser page, resolved from the session cookie.
///
/// On any failure the session row is destroyed, the cookie cleared, and the
/// browser redirected to `/login`.
#[derive(Debug, Clone)]
pub struct WebUser {
    pub user: AuthUser,
    /// Raw cookie value, needed to destroy the session on logout.
    pub cookie_value: String,
}

impl WebUser {
    /// Resolve the session cookie, if any, to a live user.
    ///
    /// `Ok(None)` means there is no usable session; errors are database
    /// failures only.
    pub async fn from_headers(state: &AppState, headers: &HeaderMap) -> AppResult<Option<Self>> {
        let Some(cookie_value) = session_cookie_value(headers) else {
            return Ok(None);
        };

        let session = {
            let mut conn = state.pool.acquire().await?;
            state.sessions.lookup(&mut conn, &cookie_value).await?
        };
        let Some(session) = session else {
            return Ok(None);
        };

        match resolve_identity(state, &session.access_token).await {
            Ok(user) => Ok(Some(WebUser { user, cookie_value })),
            Err(AppError::Core(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }
}

impl FromRequestParts<AppState> for WebUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match WebUser::from_headers(state, &parts.headers).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(end_session(state, &parts.headers).await),
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                Err(end_session(state, &parts.headers).await)
            }
        }
    }
}

/// Destroy whatever session the cookie names, then redirect to `/login`
/// with the cookie cleared.
pub async fn end_session(state: &AppState, headers: &HeaderMap) -> Response {
    if let Some(cookie_value) = session_cookie_value(headers) {
        let destroyed = match state.pool.acquire().await {
            Ok(mut conn) => state.sessions.destroy(&mut conn, &cookie_value).await,
            Err(e) => Err(e),
        };
        if let Err(e) = destroyed {
            tracing::warn!(error = %e, "Failed to destroy browser session");
        }
    }
    (
        [(SET_COOKIE, state.sessions.clear_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}
