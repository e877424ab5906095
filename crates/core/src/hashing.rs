//! Server-side form of a browser session cookie.
//!
//! `user_sessions.token_hash` holds this digest, never the cookie value, so
//! a leaked table cannot be replayed as cookies.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a session cookie value.
pub fn session_token_digest(cookie_value: &str) -> String {
    Sha256::digest(cookie_value.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
