//! Handlers for the `/projects` resource.
//!
//! Admins only ever see and change the projects they created; super-admins
//! are unrestricted. A project outside the caller's scope is reported as
//! not found, except by `get_by_id`, which answers 401.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitelog_core::pagination::DEFAULT_PROJECTS_PER_PAGE;
use sitelog_core::roles::OwnerScope;
use sitelog_core::types::{Amount, Date, DbId};
use sitelog_db::models::project::{
    CreateProject, Project, ProjectDetail, ProjectFilter, ProjectStats, ProjectStatusCount,
    UpdateProject,
};
use sitelog_db::models::status::{ProjectStatus, StatusId};
use sitelog_db::repositories::{DailyLogRepo, ProjectRepo};
use validator::{Validate, ValidationError};

use super::not_found;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiQuery, ValidJson};
use crate::middleware::rbac::RequireSuperAdminOrAdmin;
use crate::query::{empty_string_as_none, ProjectListParams};
use crate::response::{ApiResponse, Paginated};
use crate::state::AppState;
use crate::tx::RequestTx;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for creating or updating a project.
///
/// Updates replace every field; omitted dates clear the stored value.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_date_order"))]
pub struct ProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255 characters)"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end_date: Option<Date>,
    #[validate(custom(function = "validate_status"))]
    pub status: StatusId,
    #[validate(range(min = 0, message = "Budget must not be negative"))]
    pub budget: Amount,
}

fn validate_status(status: &StatusId) -> Result<(), ValidationError> {
    match ProjectStatus::from_id(*status) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("status").with_message("Invalid project status".into())),
    }
}

fn validate_date_order(input: &ProjectRequest) -> Result<(), ValidationError> {
    match (input.start_date, input.end_date) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::new("date_order")
            .with_message("End date must not be before start date".into())),
        _ => Ok(()),
    }
}

/// Payload of `GET /api/projects/stats`.
#[derive(Debug, Serialize)]
pub struct ProjectStatsData {
    pub stats: ProjectStats,
    pub status: Vec<ProjectStatusCount>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/projects
pub async fn list(
    auth: RequireSuperAdminOrAdmin,
    mut tx: RequestTx,
    ApiQuery(params): ApiQuery<ProjectListParams>,
) -> AppResult<Json<Paginated<ProjectDetail>>> {
    let page = params.page(DEFAULT_PROJECTS_PER_PAGE);
    let filter = ProjectFilter {
        search: params.search,
        status: params.status,
        from_date: params.from_date,
        to_date: params.to_date,
        page,
    };

    let (projects, total) = ProjectRepo::search(tx.conn(), &filter, auth.user.scope()).await?;
    tx.commit().await?;

    Ok(Json(Paginated::new(
        "Get Projects Data",
        "projects",
        projects,
        total,
        page,
    )))
}

/// GET /api/projects/stats
pub async fn stats(
    auth: RequireSuperAdminOrAdmin,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<ProjectStatsData>>> {
    let scope = auth.user.scope();
    let stats = ProjectRepo::stats(tx.conn(), scope).await?;
    let status = ProjectRepo::status_breakdown(tx.conn(), scope).await?;
    tx.commit().await?;

    Ok(Json(ApiResponse::with_data(
        "Get Project Stats",
        ProjectStatsData { stats, status },
    )))
}

/// GET /api/projects/{id}
///
/// A project owned by someone else is a 401, not a 404.
pub async fn get_by_id(
    auth: RequireSuperAdminOrAdmin,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<ProjectDetail>>> {
    let project = ProjectRepo::find_by_id(tx.conn(), id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    tx.commit().await?;

    if let OwnerScope::Owner(owner_id) = auth.user.scope() {
        if project.project.created_by != owner_id {
            tracing::debug!(
                user_id = auth.user.user_id,
                project_id = id,
                "Rejected read of a foreign project"
            );
            return Err(AppError::unauthorized("Unauthorized"));
        }
    }

    Ok(Json(ApiResponse::with_data("Get Project By ID", project)))
}

/// POST /api/projects
pub async fn create(
    auth: RequireSuperAdminOrAdmin,
    mut tx: RequestTx,
    ValidJson(input): ValidJson<ProjectRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Project>>)> {
    let create = CreateProject {
        name: input.name.trim().to_string(),
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
        status: input.status,
        budget: input.budget,
        created_by: auth.user.user_id,
    };
    let project = ProjectRepo::create(tx.conn(), &create).await?;
    tx.commit().await?;

    tracing::info!(project_id = project.id, user_id = auth.user.user_id, "Project created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Create Project Success", project)),
    ))
}

/// PATCH /api/projects/{id}
pub async fn update(
    auth: RequireSuperAdminOrAdmin,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
    ValidJson(input): ValidJson<ProjectRequest>,
) -> AppResult<Json<ApiResponse<Project>>> {
    let update = UpdateProject {
        name: input.name.trim().to_string(),
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
        status: input.status,
        budget: input.budget,
    };
    let project = ProjectRepo::update(tx.conn(), id, auth.user.scope(), &update)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    tx.commit().await?;

    tracing::info!(project_id = id, user_id = auth.user.user_id, "Project updated");
    Ok(Json(ApiResponse::with_data("Update Project Success", project)))
}

/// DELETE /api/projects/{id}
///
/// The logs go with the project through the foreign-key cascade; their
/// attachment files are removed once the deletion has committed.
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireSuperAdminOrAdmin,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<()>>> {
    ProjectRepo::find_if_owner(tx.conn(), id, auth.user.scope())
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    let files = DailyLogRepo::attachment_paths(tx.conn(), id).await?;
    ProjectRepo::delete(tx.conn(), id).await?;
    tx.commit().await?;

    let removed = state.storage.remove_all(&files).await;
    tracing::info!(
        project_id = id,
        user_id = auth.user.user_id,
        files = files.len(),
        removed,
        "Project deleted"
    );
    Ok(Json(ApiResponse::message("Delete Project Success")))
}
