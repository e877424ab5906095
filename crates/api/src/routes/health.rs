//! Liveness report for load balancers and the deploy script.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    /// `up` or `down`.
    pub database: &'static str,
    /// Whether the attachment root is a reachable directory.
    pub uploads: &'static str,
}

fn up_down(ok: bool) -> &'static str {
    if ok {
        "up"
    } else {
        "down"
    }
}

/// GET /health
///
/// 503 while Postgres is unreachable. A missing uploads directory only
/// degrades the report; logs without files still work.
async fn report(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = sitelog_db::health_check(&state.pool).await.is_ok();
    let uploads = tokio::fs::metadata(state.storage.root())
        .await
        .is_ok_and(|meta| meta.is_dir());

    if !database {
        tracing::warn!("Postgres unreachable from /health");
    }
    if !uploads {
        tracing::warn!(root = %state.storage.root().display(), "Uploads directory missing");
    }

    let (code, status) = match (database, uploads) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (true, false) => (StatusCode::OK, "degraded"),
        (true, true) => (StatusCode::OK, "ok"),
    };
    (
        code,
        Json(HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: up_down(database),
            uploads: up_down(uploads),
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(report))
}
