//! Project entity model, DTOs, and statistics rows.

use serde::Serialize;
use sqlx::FromRow;

use sitelog_core::pagination::Page;
use sitelog_core::types::{Amount, Date, DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: StatusId,
    pub budget: Amount,
    /// Owning admin (`users.id`).
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project joined with its owner's username and status label.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub created_by_name: String,
    pub status_name: String,
}

/// DTO for creating a new project.
#[derive(Debug)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: StatusId,
    pub budget: Amount,
    pub created_by: DbId,
}

/// DTO for updating a project. Replaces every editable field; absent dates
/// clear the column.
#[derive(Debug)]
pub struct UpdateProject {
    pub name: String,
    pub description: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: StatusId,
    pub budget: Amount,
}

/// Filters for the paginated project listing.
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    /// Case-insensitive name substring.
    pub search: Option<String>,
    pub status: Option<StatusId>,
    /// Inclusive lower bound on `start_date`.
    pub from_date: Option<Date>,
    /// Inclusive upper bound on `start_date`.
    pub to_date: Option<Date>,
    pub page: Page,
}

impl ProjectFilter {
    pub fn has_date_range(&self) -> bool {
        self.from_date.is_some() || self.to_date.is_some()
    }
}

/// Aggregate figures over the projects visible to a caller.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectStats {
    pub total_project: i64,
    pub total_project_done: i64,
    pub total_project_ongoing: i64,
    pub total_budget_all_projects: i64,
    /// Rounded to 2 decimals; 0 when there are no projects.
    pub avg_budget_projects: f64,
    /// Name of the highest-budget project; the lowest id wins ties.
    pub highest_budget_project: Option<String>,
}

/// Project count for one status label.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectStatusCount {
    pub status: String,
    pub total: i64,
}
