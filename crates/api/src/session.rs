//! Server-side browser sessions.
//!
//! The browser holds an opaque random value in the `sitelog_session`
//! cookie. Only its SHA-256 hash is stored in `user_sessions`, next to the
//! access token the session authenticates with.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use sitelog_core::hashing::session_token_digest;
use sitelog_core::types::DbId;
use sitelog_db::models::session::{CreateSession, WebSession};
use sitelog_db::repositories::SessionRepo;
use sqlx::PgConnection;
use uuid::Uuid;

/// Name of the browser session cookie.
pub const SESSION_COOKIE_NAME: &str = "sitelog_session";

/// Default session lifetime in hours.
const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 7;

/// Browser session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in hours (default: 7).
    pub expiry_hours: i64,
    /// Whether the cookie carries the `Secure` attribute (default: true).
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Load session settings from environment variables.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `SESSION_EXPIRY_HOURS`  | `7`     |
    /// | `SESSION_COOKIE_SECURE` | `true`  |
    pub fn from_env() -> Self {
        let expiry_hours: i64 = std::env::var("SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_HOURS.to_string())
            .parse()
            .expect("SESSION_EXPIRY_HOURS must be a valid i64");

        let cookie_secure: bool = std::env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SESSION_COOKIE_SECURE must be true or false");

        Self {
            expiry_hours,
            cookie_secure,
        }
    }
}

/// Creates, looks up, and destroys browser sessions.
///
/// Built once at startup and shared through `AppState`. Every method runs on
/// a caller-supplied connection so session writes join the request
/// transaction.
#[derive(Debug, Clone)]
pub struct SessionStore {
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Persist a new session for `user_id` and return the cookie value.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        user_id: DbId,
        access_token: &str,
    ) -> Result<String, sqlx::Error> {
        let cookie_value = Uuid::new_v4().simple().to_string();
        let input = CreateSession {
            user_id,
            token_hash: session_token_digest(&cookie_value),
            access_token: access_token.to_string(),
            expires_at: Utc::now() + Duration::hours(self.config.expiry_hours),
        };
        SessionRepo::create(conn, &input).await?;
        Ok(cookie_value)
    }

    /// Find the unexpired session behind a cookie value.
    pub async fn lookup(
        &self,
        conn: &mut PgConnection,
        cookie_value: &str,
    ) -> Result<Option<WebSession>, sqlx::Error> {
        SessionRepo::find_active_by_token_hash(conn, &session_token_digest(cookie_value)).await
    }

    /// Delete the session behind a cookie value. Returns `true` if one existed.
    pub async fn destroy(
        &self,
        conn: &mut PgConnection,
        cookie_value: &str,
    ) -> Result<bool, sqlx::Error> {
        SessionRepo::delete_by_token_hash(conn, &session_token_digest(cookie_value)).await
    }

    /// Drop every expired session row.
    pub async fn cleanup_expired(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        SessionRepo::cleanup_expired(conn).await
    }

    /// `Set-Cookie` value that installs a session cookie.
    pub fn session_cookie(&self, cookie_value: &str) -> String {
        let max_age = self.config.expiry_hours * 3600;
        self.cookie(cookie_value, max_age)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
        );
        if self.config.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Read the session cookie value from the request's `Cookie` headers.
pub fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
