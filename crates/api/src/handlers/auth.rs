//! Handlers for login and logout.
//!
//! A successful login returns a Bearer token for API clients and also sets
//! the browser session cookie, so the same call serves both surfaces.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use sitelog_db::models::user::{User, UserResponse};
use sitelog_db::repositories::UserRepo;
use sqlx::PgConnection;
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::{end_session, AuthUser};
use crate::response::ApiResponse;
use crate::session::session_cookie_value;
use crate::state::AppState;
use crate::tx::RequestTx;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/login` and the `/login` form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    mut tx: RequestTx,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<Response> {
    let (response, cookie_value) = open_session(&state, tx.conn(), &input).await?;
    tx.commit().await?;

    let cookie = state.sessions.session_cookie(&cookie_value);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::with_data("Login Success", response)),
    )
        .into_response())
}

/// POST /api/logout
///
/// Destroys the browser session named by the cookie, if any. Access tokens
/// are stateless and stay valid until they expire.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    mut tx: RequestTx,
) -> AppResult<Response> {
    if let Some(cookie_value) = session_cookie_value(&headers) {
        state.sessions.destroy(tx.conn(), &cookie_value).await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, "User logged out");
    Ok((
        [(SET_COOKIE, state.sessions.clear_cookie())],
        Json(ApiResponse::message("Logout Success")),
    )
        .into_response())
}

/// POST /login (browser form)
///
/// Redirects to `/` on success and back to `/login?error=1` otherwise.
pub async fn login_form(
    State(state): State<AppState>,
    mut tx: RequestTx,
    Form(input): Form<LoginRequest>,
) -> AppResult<Response> {
    if input.validate().is_err() {
        return Ok(Redirect::to("/login?error=1").into_response());
    }

    match open_session(&state, tx.conn(), &input).await {
        Ok((_, cookie_value)) => {
            tx.commit().await?;
            let cookie = state.sessions.session_cookie(&cookie_value);
            Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
        }
        Err(AppError::Core(_)) => Ok(Redirect::to("/login?error=1").into_response()),
        Err(other) => Err(other),
    }
}

/// POST /logout (browser form)
pub async fn logout_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    end_session(&state, &headers).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check credentials, issue a token and persist a browser session.
///
/// Returns the response payload and the new session cookie value.
async fn open_session(
    state: &AppState,
    conn: &mut PgConnection,
    input: &LoginRequest,
) -> AppResult<(LoginResponse, String)> {
    let user = authenticate(conn, input).await?;

    let access_token = generate_access_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expired = state.sessions.cleanup_expired(conn).await?;
    if expired > 0 {
        tracing::debug!(expired, "Removed expired browser sessions");
    }
    let cookie_value = state.sessions.create(conn, user.id, &access_token).await?;

    tracing::info!(user_id = user.id, role = ?user.role(), "User logged in");
    let response = LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expiry_hours * 3600,
        user: UserResponse::from(user),
    };
    Ok((response, cookie_value))
}

/// Find a live user by name and verify the password.
async fn authenticate(conn: &mut PgConnection, input: &LoginRequest) -> AppResult<User> {
    let user = UserRepo::find_by_username(conn, &input.username)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Rejected login: wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    Ok(user)
}
