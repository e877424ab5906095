//! Route definitions for the `/projects` resource.
//!
//! Also nests the daily log routes under `/projects/{id}/logs`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use sitelog_core::attachments::MAX_ATTACHMENT_BYTES;

use crate::handlers::{daily_log, project};
use crate::state::AppState;

/// Headroom above the attachment cap for the text fields and multipart
/// framing, so an oversized file reaches the handler's own size check.
const LOG_FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                               -> list
/// POST   /                               -> create
/// GET    /stats                          -> stats
/// GET    /{id}                           -> get_by_id
/// PATCH  /{id}                           -> update
/// DELETE /{id}                           -> delete
///
/// GET    /{id}/stats                     -> daily_log::stats
/// GET    /{id}/logs                      -> daily_log::list
/// POST   /{id}/logs                      -> daily_log::create
/// GET    /{id}/logs/{log_id}             -> daily_log::get_by_id
/// PATCH  /{id}/logs/{log_id}             -> daily_log::update
/// DELETE /{id}/logs/{log_id}             -> daily_log::delete
/// DELETE /{id}/logs/{log_id}/files       -> daily_log::delete_file
/// ```
pub fn router() -> Router<AppState> {
    let log_routes = Router::new()
        .route("/", get(daily_log::list).post(daily_log::create))
        .route(
            "/{log_id}",
            get(daily_log::get_by_id)
                .patch(daily_log::update)
                .delete(daily_log::delete),
        )
        .route("/{log_id}/files", delete(daily_log::delete_file))
        .layer(DefaultBodyLimit::max(
            MAX_ATTACHMENT_BYTES + LOG_FORM_OVERHEAD_BYTES,
        ));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/stats", get(project::stats))
        .route(
            "/{id}",
            get(project::get_by_id)
                .patch(project::update)
                .delete(project::delete),
        )
        .route("/{id}/stats", get(daily_log::stats))
        .nest("/{id}/logs", log_routes)
}
