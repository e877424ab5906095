//! Route definitions for the `/users` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                -> list (super-admin)
/// POST   /                -> create (super-admin)
/// GET    /{id}            -> get_by_id (super-admin or self)
/// PATCH  /{id}            -> update (super-admin or self)
/// DELETE /{id}            -> delete (super-admin)
/// PATCH  /{id}/password   -> change_password (self)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list).post(user::create))
        .route(
            "/{id}",
            get(user::get_by_id)
                .patch(user::update)
                .delete(user::delete),
        )
        .route("/{id}/password", patch(user::change_password))
}
