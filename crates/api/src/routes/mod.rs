pub mod auth;
pub mod health;
pub mod pages;
pub mod project;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /login                                           login (public)
/// /logout                                          logout (requires auth)
/// /dashboard                                       dashboard summary (requires auth)
///
/// /projects                                        list, create
/// /projects/stats                                  project stats
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/stats                             daily log stats
/// /projects/{id}/logs                              list, create (multipart)
/// /projects/{id}/logs/{log_id}                     get, update (multipart), delete
/// /projects/{id}/logs/{log_id}/files               clear attachment
///
/// /users                                           list, create (super-admin)
/// /users/{id}                                      get, update, delete
/// /users/{id}/password                             change own password
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .nest("/projects", project::router())
        .nest("/users", user::router())
}
