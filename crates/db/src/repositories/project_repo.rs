//! Repository for the `projects` table.

use sqlx::PgConnection;

use sitelog_core::roles::OwnerScope;
use sitelog_core::types::DbId;

use crate::filters::{SqlArg, WhereBuilder};
use crate::models::project::{
    CreateProject, Project, ProjectDetail, ProjectFilter, ProjectStats, ProjectStatusCount,
    UpdateProject,
};
use crate::models::status::ProjectStatus;

/// Column list for plain project rows.
const COLUMNS: &str = "id, name, description, start_date, end_date, status, budget, \
    created_by, created_at, updated_at";

/// Column list for [`ProjectDetail`] rows, selected from [`DETAIL_FROM`].
const DETAIL_COLUMNS: &str = "p.id, p.name, p.description, p.start_date, p.end_date, \
    p.status, p.budget, p.created_by, p.created_at, p.updated_at, \
    u.username AS created_by_name, ps.name AS status_name";

const DETAIL_FROM: &str = "projects p \
    JOIN users u ON u.id = p.created_by \
    JOIN project_status ps ON ps.id = p.status";

/// Project queries. Owner-scoped methods bind the owner id as a nullable
/// parameter; `NULL` means unrestricted.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, description, start_date, end_date, status, budget, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status)
            .bind(input.budget)
            .bind(input.created_by)
            .fetch_one(&mut *conn)
            .await
    }

    /// Replace a project's editable fields.
    ///
    /// Returns `None` when the project does not exist or is outside `scope`.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        scope: OwnerScope,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name        = $1,
                description = $2,
                start_date  = $3,
                end_date    = $4,
                status      = $5,
                budget      = $6,
                updated_at  = NOW()
             WHERE id = $7 AND ($8::BIGINT IS NULL OR created_by = $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status)
            .bind(input.budget)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Delete a project. Its daily logs go with it (`ON DELETE CASCADE`).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a project by id, with owner username and status label.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ProjectDetail>, sqlx::Error> {
        let query = format!("SELECT {DETAIL_COLUMNS} FROM {DETAIL_FROM} WHERE p.id = $1");
        sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a project only if it is inside `scope`.
    ///
    /// Used as the ownership gate before any mutation. A missing project and
    /// a foreign project both yield `None`.
    pub async fn find_if_owner(
        conn: &mut PgConnection,
        id: DbId,
        scope: OwnerScope,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE id = $1 AND ($2::BIGINT IS NULL OR created_by = $2)"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Paginated, filtered listing. Returns the page and the total number of
    /// rows matching the same filters.
    ///
    /// Newest ids first; when a date range is given, latest `start_date`
    /// first instead.
    pub async fn search(
        conn: &mut PgConnection,
        filter: &ProjectFilter,
        scope: OwnerScope,
    ) -> Result<(Vec<ProjectDetail>, i64), sqlx::Error> {
        let mut conditions = WhereBuilder::new();
        conditions
            .push_contains("p.name", filter.search.as_deref())
            .push_opt("p.status = {}", filter.status, SqlArg::SmallInt)
            .push_opt("p.start_date >= {}", filter.from_date, SqlArg::Date)
            .push_opt("p.start_date <= {}", filter.to_date, SqlArg::Date)
            .push_opt("p.created_by = {}", scope.owner_id(), SqlArg::Id);
        let where_clause = conditions.clause();

        let count_query = format!("SELECT COUNT(*) FROM projects p {where_clause}");
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(&mut *conn)
            .await?;

        let order_by = if filter.has_date_range() {
            "p.start_date DESC NULLS LAST, p.id DESC"
        } else {
            "p.id DESC"
        };
        let limit_idx = conditions.next_index();
        let offset_idx = limit_idx + 1;
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM {DETAIL_FROM} {where_clause} \
             ORDER BY {order_by} \
             LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );
        let rows = conditions
            .bind_as(sqlx::query_as::<_, ProjectDetail>(&query))
            .bind(filter.page.limit())
            .bind(filter.page.offset())
            .fetch_all(&mut *conn)
            .await?;

        Ok((rows, total))
    }

    /// Count, budget, and status aggregates over the projects in `scope`.
    pub async fn stats(
        conn: &mut PgConnection,
        scope: OwnerScope,
    ) -> Result<ProjectStats, sqlx::Error> {
        sqlx::query_as::<_, ProjectStats>(
            "SELECT
                COUNT(*) AS total_project,
                COUNT(*) FILTER (WHERE status = $2) AS total_project_done,
                COUNT(*) FILTER (WHERE status = $3) AS total_project_ongoing,
                COALESCE(SUM(budget), 0)::BIGINT AS total_budget_all_projects,
                COALESCE(ROUND(AVG(budget), 2), 0)::FLOAT8 AS avg_budget_projects,
                (SELECT name FROM projects
                  WHERE ($1::BIGINT IS NULL OR created_by = $1)
                  ORDER BY budget DESC, id ASC
                  LIMIT 1) AS highest_budget_project
             FROM projects
             WHERE ($1::BIGINT IS NULL OR created_by = $1)",
        )
        .bind(scope.owner_id())
        .bind(ProjectStatus::Done.id())
        .bind(ProjectStatus::OnGoing.id())
        .fetch_one(&mut *conn)
        .await
    }

    /// Project count per status label, in status order.
    pub async fn status_breakdown(
        conn: &mut PgConnection,
        scope: OwnerScope,
    ) -> Result<Vec<ProjectStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatusCount>(
            "SELECT ps.name AS status, COUNT(p.id) AS total
             FROM projects p
             JOIN project_status ps ON ps.id = p.status
             WHERE ($1::BIGINT IS NULL OR p.created_by = $1)
             GROUP BY ps.id, ps.name
             ORDER BY ps.id",
        )
        .bind(scope.owner_id())
        .fetch_all(&mut *conn)
        .await
    }
}
