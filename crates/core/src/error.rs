//! Domain errors shared by the repository and HTTP layers.

use crate::types::DbId;

/// A rule violation detected outside the database driver.
///
/// Access problems are always `Unauthorized`: the API never distinguishes
/// "not signed in" from "signed in but not allowed".
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A row that is absent or outside the caller's owner scope.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate username or a second log on the same date.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
