//! Daily log entity model, DTOs, and statistics rows.

use serde::Serialize;
use sqlx::FromRow;

use sitelog_core::pagination::Page;
use sitelog_core::roles::OwnerScope;
use sitelog_core::types::{Amount, Date, DbId, Timestamp};

/// A row from the `daily_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyLog {
    pub id: DbId,
    pub project_id: DbId,
    pub log_date: Date,
    pub description: String,
    pub issues: String,
    pub income: Amount,
    pub expense: Amount,
    /// Attachment path relative to the uploads root.
    pub file: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A daily log joined with its project's name, as returned by listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyLogListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: DailyLog,
    pub project_name: String,
}

/// DTO for creating a daily log.
#[derive(Debug)]
pub struct CreateDailyLog {
    pub project_id: DbId,
    pub log_date: Date,
    pub description: String,
    pub issues: String,
    pub income: Amount,
    pub expense: Amount,
    pub file: Option<String>,
}

/// DTO for updating a daily log. Replaces every editable field.
#[derive(Debug)]
pub struct UpdateDailyLog {
    pub log_date: Date,
    pub description: String,
    pub issues: String,
    pub income: Amount,
    pub expense: Amount,
    pub file: Option<String>,
}

/// Which logs a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogScope {
    /// Logs of one project (ownership already checked by the caller).
    Project(DbId),
    /// Logs of every project created by this user.
    Owner(DbId),
    /// Every log.
    All,
}

impl From<OwnerScope> for LogScope {
    fn from(scope: OwnerScope) -> Self {
        match scope {
            OwnerScope::All => LogScope::All,
            OwnerScope::Owner(id) => LogScope::Owner(id),
        }
    }
}

/// Filters for the paginated log listing.
#[derive(Debug, Clone)]
pub struct DailyLogFilter {
    /// Case-insensitive description substring.
    pub search: Option<String>,
    /// Inclusive lower bound on `log_date`.
    pub from_date: Option<Date>,
    /// Inclusive upper bound on `log_date`.
    pub to_date: Option<Date>,
    pub scope: LogScope,
    pub page: Page,
}

/// Aggregate figures for one project's logs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyLogStats {
    pub total_income: Amount,
    pub total_expense: Amount,
    pub budget: Amount,
    pub balance: Amount,
    /// `expense / budget * 100`, rounded to 2 decimals; 0 when budget is 0.
    pub budget_usage_percentage: f64,
    pub total_working_days: i64,
    pub avg_daily_income: f64,
    pub avg_daily_expense: f64,
    /// Earliest date among the days with the highest income.
    pub highest_income_day: Option<Date>,
    /// Earliest date among the days with the highest expense.
    pub highest_expense_day: Option<Date>,
}

/// One point of a project's running balance.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CumulativeBalance {
    pub log_date: Date,
    pub income: Amount,
    pub expense: Amount,
    pub cumulative_balance: Amount,
}
