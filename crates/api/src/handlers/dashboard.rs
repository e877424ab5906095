//! Handler for the dashboard summary.

use axum::Json;
use serde::Serialize;
use sitelog_core::pagination::Page;
use sitelog_db::models::daily_log::{DailyLogFilter, DailyLogListItem, LogScope};
use sitelog_db::models::project::{ProjectDetail, ProjectFilter, ProjectStats, ProjectStatusCount};
use sitelog_db::repositories::{DailyLogRepo, ProjectRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::tx::RequestTx;

const RECENT_PROJECTS: i64 = 5;
const RECENT_LOGS: i64 = 10;

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub stats: ProjectStats,
    pub status: Vec<ProjectStatusCount>,
    pub recent_projects: Vec<ProjectDetail>,
    pub recent_logs: Vec<DailyLogListItem>,
}

/// GET /api/dashboard
///
/// Everything is limited to the caller's own projects unless the caller is
/// a super-admin.
pub async fn get_dashboard(
    auth: AuthUser,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<DashboardData>>> {
    let scope = auth.scope();

    let stats = ProjectRepo::stats(tx.conn(), scope).await?;
    let status = ProjectRepo::status_breakdown(tx.conn(), scope).await?;

    let project_filter = ProjectFilter {
        search: None,
        status: None,
        from_date: None,
        to_date: None,
        page: Page::new(None, Some(RECENT_PROJECTS), RECENT_PROJECTS),
    };
    let (recent_projects, _) = ProjectRepo::search(tx.conn(), &project_filter, scope).await?;

    let log_filter = DailyLogFilter {
        search: None,
        from_date: None,
        to_date: None,
        scope: LogScope::from(scope),
        page: Page::new(None, Some(RECENT_LOGS), RECENT_LOGS),
    };
    let (recent_logs, _) = DailyLogRepo::search(tx.conn(), &log_filter).await?;

    tx.commit().await?;

    Ok(Json(ApiResponse::with_data(
        "Get Dashboard Data",
        DashboardData {
            stats,
            status,
            recent_projects,
            recent_logs,
        },
    )))
}
