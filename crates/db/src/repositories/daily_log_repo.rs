//! Repository for the `daily_logs` table.

use sqlx::PgConnection;

use sitelog_core::roles::OwnerScope;
use sitelog_core::types::{Date, DbId};

use crate::filters::{SqlArg, WhereBuilder};
use crate::models::daily_log::{
    CreateDailyLog, CumulativeBalance, DailyLog, DailyLogFilter, DailyLogListItem,
    DailyLogStats, LogScope, UpdateDailyLog,
};

/// Column list for plain log rows.
const COLUMNS: &str = "id, project_id, log_date, description, issues, income, expense, \
    file, created_at, updated_at";

/// Column list for log rows selected through the `dl`/`p` join.
const JOINED_COLUMNS: &str = "dl.id, dl.project_id, dl.log_date, dl.description, dl.issues, \
    dl.income, dl.expense, dl.file, dl.created_at, dl.updated_at";

/// Daily log queries.
pub struct DailyLogRepo;

impl DailyLogRepo {
    /// Insert a new log, returning the created row.
    ///
    /// A second log for the same project and date violates
    /// `uq_daily_logs_project_date`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateDailyLog,
    ) -> Result<DailyLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO daily_logs
                (project_id, log_date, description, issues, income, expense, file)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(input.project_id)
            .bind(input.log_date)
            .bind(&input.description)
            .bind(&input.issues)
            .bind(input.income)
            .bind(input.expense)
            .bind(&input.file)
            .fetch_one(&mut *conn)
            .await
    }

    /// Replace a log's editable fields. Returns `None` if the log is gone.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateDailyLog,
    ) -> Result<Option<DailyLog>, sqlx::Error> {
        let query = format!(
            "UPDATE daily_logs SET
                log_date    = $1,
                description = $2,
                issues      = $3,
                income      = $4,
                expense     = $5,
                file        = $6,
                updated_at  = NOW()
             WHERE id = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(input.log_date)
            .bind(&input.description)
            .bind(&input.issues)
            .bind(input.income)
            .bind(input.expense)
            .bind(&input.file)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Set or clear a log's attachment path. Returns `true` if a row was updated.
    pub async fn set_file(
        conn: &mut PgConnection,
        id: DbId,
        file: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE daily_logs SET file = $1, updated_at = NOW() WHERE id = $2")
                .bind(file)
                .bind(id)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a log. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM daily_logs WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a log by its primary key.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DailyLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM daily_logs WHERE id = $1");
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find the log of a project on an exact date.
    pub async fn find_by_date(
        conn: &mut PgConnection,
        project_id: DbId,
        log_date: Date,
    ) -> Result<Option<DailyLog>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM daily_logs WHERE project_id = $1 AND log_date = $2");
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(project_id)
            .bind(log_date)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a log only if it belongs to `project_id` and that project is
    /// inside `scope`.
    pub async fn find_if_project_and_log_owner(
        conn: &mut PgConnection,
        project_id: DbId,
        log_id: DbId,
        scope: OwnerScope,
    ) -> Result<Option<DailyLog>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM daily_logs dl
             JOIN projects p ON p.id = dl.project_id
             WHERE dl.id = $1
               AND dl.project_id = $2
               AND ($3::BIGINT IS NULL OR p.created_by = $3)"
        );
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(log_id)
            .bind(project_id)
            .bind(scope.owner_id())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Paginated, filtered listing, latest `log_date` first. Returns the
    /// page and the total number of rows matching the same filters.
    pub async fn search(
        conn: &mut PgConnection,
        filter: &DailyLogFilter,
    ) -> Result<(Vec<DailyLogListItem>, i64), sqlx::Error> {
        let mut conditions = WhereBuilder::new();
        conditions
            .push_contains("dl.description", filter.search.as_deref())
            .push_opt("dl.log_date >= {}", filter.from_date, SqlArg::Date)
            .push_opt("dl.log_date <= {}", filter.to_date, SqlArg::Date);
        match filter.scope {
            LogScope::Project(id) => {
                conditions.push("dl.project_id = {}", SqlArg::Id(id));
            }
            LogScope::Owner(id) => {
                conditions.push("p.created_by = {}", SqlArg::Id(id));
            }
            LogScope::All => {}
        }
        let where_clause = conditions.clause();

        let count_query = format!(
            "SELECT COUNT(*) FROM daily_logs dl \
             JOIN projects p ON p.id = dl.project_id {where_clause}"
        );
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(&mut *conn)
            .await?;

        let limit_idx = conditions.next_index();
        let offset_idx = limit_idx + 1;
        let query = format!(
            "SELECT {JOINED_COLUMNS}, p.name AS project_name \
             FROM daily_logs dl \
             JOIN projects p ON p.id = dl.project_id {where_clause} \
             ORDER BY dl.log_date DESC, dl.id DESC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );
        let rows = conditions
            .bind_as(sqlx::query_as::<_, DailyLogListItem>(&query))
            .bind(filter.page.limit())
            .bind(filter.page.offset())
            .fetch_all(&mut *conn)
            .await?;

        Ok((rows, total))
    }

    /// Income, expense, and budget aggregates for one project.
    ///
    /// Returns `None` if the project does not exist.
    pub async fn stats(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Option<DailyLogStats>, sqlx::Error> {
        sqlx::query_as::<_, DailyLogStats>(
            "WITH totals AS (
                SELECT
                    COALESCE(SUM(income), 0)::BIGINT  AS total_income,
                    COALESCE(SUM(expense), 0)::BIGINT AS total_expense,
                    COUNT(id)                         AS total_working_days
                FROM daily_logs
                WHERE project_id = $1
             )
             SELECT
                t.total_income,
                t.total_expense,
                p.budget,
                t.total_income - t.total_expense AS balance,
                (CASE WHEN p.budget > 0
                      THEN ROUND(t.total_expense::NUMERIC / p.budget * 100, 2)
                      ELSE 0 END)::FLOAT8 AS budget_usage_percentage,
                t.total_working_days,
                (CASE WHEN t.total_working_days > 0
                      THEN ROUND(t.total_income::NUMERIC / t.total_working_days, 2)
                      ELSE 0 END)::FLOAT8 AS avg_daily_income,
                (CASE WHEN t.total_working_days > 0
                      THEN ROUND(t.total_expense::NUMERIC / t.total_working_days, 2)
                      ELSE 0 END)::FLOAT8 AS avg_daily_expense,
                (SELECT log_date FROM daily_logs WHERE project_id = $1
                  ORDER BY income DESC, log_date ASC LIMIT 1) AS highest_income_day,
                (SELECT log_date FROM daily_logs WHERE project_id = $1
                  ORDER BY expense DESC, log_date ASC LIMIT 1) AS highest_expense_day
             FROM projects p
             CROSS JOIN totals t
             WHERE p.id = $1",
        )
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Running balance of `income - expense` in date order.
    pub async fn cumulative_balance(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<CumulativeBalance>, sqlx::Error> {
        sqlx::query_as::<_, CumulativeBalance>(
            "SELECT
                log_date,
                income,
                expense,
                (SUM(income - expense) OVER (
                    ORDER BY log_date
                    ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW
                ))::BIGINT AS cumulative_balance
             FROM daily_logs
             WHERE project_id = $1
             ORDER BY log_date",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Every attachment path stored on a project's logs.
    pub async fn attachment_paths(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT file FROM daily_logs
             WHERE project_id = $1 AND file IS NOT NULL AND file <> ''
             ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
    }
}
