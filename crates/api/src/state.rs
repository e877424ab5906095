use std::sync::Arc;

use crate::config::ServerConfig;
use crate::session::SessionStore;
use crate::storage::AttachmentStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sitelog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Browser session store.
    pub sessions: Arc<SessionStore>,
    /// Attachment files on local disk.
    pub storage: Arc<AttachmentStore>,
}

impl AppState {
    /// Build the state, deriving the session and attachment stores from `config`.
    pub fn new(pool: sitelog_db::DbPool, config: ServerConfig) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session.clone()));
        let storage = Arc::new(AttachmentStore::new(config.uploads_dir.clone()));
        Self {
            pool,
            config: Arc::new(config),
            sessions,
            storage,
        }
    }
}
