//! Server-rendered browser pages.
//!
//! Each page is a small HTML shell that names the JSON endpoint its
//! client-side script reads from; data itself always comes from `/api`.
//! Access is checked with the session cookie: a missing session redirects
//! to `/login`, a failed role check to `/`.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use sitelog_core::roles::OwnerScope;
use sitelog_core::types::DbId;
use sitelog_db::models::project::Project;
use sitelog_db::repositories::ProjectRepo;

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, WebUser};
use crate::middleware::rbac::{WebRequireSuperAdmin, WebRequireSuperAdminOrAdmin};
use crate::state::AppState;
use crate::tx::RequestTx;

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageParams {
    #[serde(default)]
    pub error: Option<String>,
}

/// GET /
pub async fn home(web: WebUser) -> Html<String> {
    render(
        "Dashboard",
        Some(&web.user),
        r#"<section data-page="dashboard" data-source="/api/dashboard"></section>"#,
    )
}

/// GET /login
///
/// A browser that already holds a valid session goes straight to `/`.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LoginPageParams>,
) -> AppResult<Response> {
    if WebUser::from_headers(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let notice = if params.error.is_some() {
        r#"<p class="error">Invalid username or password</p>"#
    } else {
        ""
    };
    let body = format!(
        r#"{notice}<form method="post" action="/login">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">Sign in</button>
</form>"#
    );
    Ok(render("Login", None, &body).into_response())
}

/// GET /project
pub async fn projects(auth: WebRequireSuperAdminOrAdmin) -> Html<String> {
    render(
        "Projects",
        Some(&auth.user.user),
        r#"<section data-page="projects" data-source="/api/projects"></section>"#,
    )
}

/// GET /project/{id}
///
/// A project outside the caller's scope sends the browser back to the list.
/// A malformed id or a failed lookup sends it to the dashboard; a page never
/// answers with an API error body.
pub async fn project_detail(
    State(state): State<AppState>,
    auth: WebRequireSuperAdminOrAdmin,
    Path(raw_id): Path<String>,
) -> Response {
    let Ok(id) = raw_id.parse::<DbId>() else {
        return Redirect::to("/").into_response();
    };
    let user = &auth.user.user;

    let project = match load_project(&state, id, user.scope()).await {
        Ok(Some(project)) => project,
        Ok(None) => return Redirect::to("/project").into_response(),
        Err(err) => {
            tracing::error!(error = %err, project_id = id, "Failed to load project page");
            return Redirect::to("/").into_response();
        }
    };

    let body = format!(
        r#"<h2>{name}</h2>
<section data-page="project" data-project-id="{id}" data-source="/api/projects/{id}/logs" data-stats="/api/projects/{id}/stats"></section>"#,
        name = escape_html(&project.name),
        id = project.id,
    );
    render("Project", Some(user), &body).into_response()
}

async fn load_project(state: &AppState, id: DbId, scope: OwnerScope) -> AppResult<Option<Project>> {
    let mut tx = RequestTx::begin(&state.pool).await?;
    let project = ProjectRepo::find_if_owner(tx.conn(), id, scope).await?;
    tx.commit().await?;
    Ok(project)
}

/// GET /user
pub async fn users(auth: WebRequireSuperAdmin) -> Html<String> {
    render(
        "Users",
        Some(&auth.user.user),
        r#"<section data-page="users" data-source="/api/users"></section>"#,
    )
}

/// GET /user/self
pub async fn user_self(web: WebUser) -> Html<String> {
    let body = format!(
        r#"<section data-page="user-self" data-source="/api/users/{id}" data-password="/api/users/{id}/password"></section>"#,
        id = web.user.user_id,
    );
    render("My Account", Some(&web.user), &body)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(title: &str, user: Option<&AuthUser>, body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            r#"<nav><a href="/">Dashboard</a> <a href="/project">Projects</a> <a href="/user/self">{username}</a>
<form method="post" action="/logout"><button type="submit">Logout</button></form></nav>"#,
            username = escape_html(&user.username),
        ),
        None => String::new(),
    };
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | Site Log</title></head>
<body>
{nav}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    ))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
