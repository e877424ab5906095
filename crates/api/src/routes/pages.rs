//! Route definitions for the browser pages (root level, session cookie auth).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, pages};
use crate::state::AppState;

/// Page routes.
///
/// ```text
/// GET  /              -> home (signed in)
/// GET  /login         -> login form
/// POST /login         -> login_form
/// POST /logout        -> logout_form
/// GET  /project       -> project list page (super-admin or admin)
/// GET  /project/{id}  -> project page (super-admin or admin, owner)
/// GET  /user          -> user management page (super-admin)
/// GET  /user/self     -> own account page (signed in)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login).post(auth::login_form))
        .route("/logout", post(auth::logout_form))
        .route("/project", get(pages::projects))
        .route("/project/{id}", get(pages::project_detail))
        .route("/user", get(pages::users))
        .route("/user/self", get(pages::user_self))
}
