//! Local-disk storage for daily-log attachments.
//!
//! Files live under the configured uploads root; the database stores paths
//! relative to it (`logs/<name>`). Content-type and size checks happen in
//! the handlers through [`sitelog_core::attachments::validate_attachment`]
//! before anything reaches this module.

use std::path::{Path, PathBuf};

use sitelog_core::attachments::{
    attachment_file_name, attachment_relative_path, is_safe_relative_path, LOG_ATTACHMENT_DIR,
};
use sitelog_core::types::{Date, DbId};

/// Errors from attachment storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The stored path would escape the uploads root.
    #[error("Unsafe attachment path: {0}")]
    UnsafePath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Attachment files under a fixed uploads root.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a log attachment and return its path relative to the root.
    pub async fn save_log_attachment(
        &self,
        log_date: Date,
        project_id: DbId,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let dir = self.root.join(LOG_ATTACHMENT_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;

        let relative = attachment_relative_path(&attachment_file_name(
            log_date,
            project_id,
            original_name,
        ));
        let full = self.resolve(&relative)?;
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|source| io_error(&full, source))?;

        tracing::debug!(path = %relative, size = bytes.len(), "Saved log attachment");
        Ok(relative)
    }

    /// Remove a stored attachment.
    ///
    /// A file that is already gone is not an error: it is logged and
    /// reported as `Ok(false)`.
    pub async fn remove(&self, relative: &str) -> Result<bool, StorageError> {
        let full = self.resolve(relative)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path = %relative, "Removed log attachment");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %relative, "Attachment already missing on disk");
                Ok(false)
            }
            Err(source) => Err(io_error(&full, source)),
        }
    }

    /// Remove several attachments after their rows are gone.
    ///
    /// Failures are logged and skipped; returns how many files were removed.
    pub async fn remove_all(&self, paths: &[String]) -> usize {
        let mut removed = 0;
        for path in paths {
            match self.remove(path).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, path = %path, "Failed to remove attachment"),
            }
        }
        removed
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if !is_safe_relative_path(relative) {
            return Err(StorageError::UnsafePath(relative.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
