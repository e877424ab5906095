pub mod auth;
pub mod daily_log;
pub mod dashboard;
pub mod pages;
pub mod project;
pub mod user;

use sitelog_core::error::CoreError;
use sitelog_core::types::DbId;

use crate::error::AppError;

/// 404 for a row that is absent or outside the caller's scope.
pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}
