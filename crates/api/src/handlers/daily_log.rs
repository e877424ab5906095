//! Handlers for the `/projects/{id}/logs` resource.
//!
//! Logs are only reachable through a project inside the caller's scope.
//! Create and update take `multipart/form-data` so an attachment can ride
//! along with the fields.
//!
//! Attachment files and rows are kept consistent in this order: a new file
//! is written before the row that references it and removed again if the
//! transaction fails; a replaced or cleared file is removed only after the
//! transaction has committed.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sitelog_core::attachments::{validate_attachment, ATTACHMENT_TOO_LARGE_MESSAGE};
use sitelog_core::error::CoreError;
use sitelog_core::pagination::DEFAULT_LOGS_PER_PAGE;
use sitelog_core::roles::OwnerScope;
use sitelog_core::types::{Amount, Date, DbId};
use sitelog_db::models::daily_log::{
    CreateDailyLog, CumulativeBalance, DailyLog, DailyLogFilter, DailyLogListItem, DailyLogStats,
    LogScope, UpdateDailyLog,
};
use sitelog_db::repositories::{DailyLogRepo, ProjectRepo};
use sqlx::PgConnection;
use validator::Validate;

use super::not_found;
use crate::error::{AppError, AppResult, DUPLICATE_LOG_DATE_MESSAGE};
use crate::extract::{first_validation_message, ApiQuery};
use crate::middleware::rbac::RequireSuperAdminOrAdmin;
use crate::query::LogListParams;
use crate::response::{ApiResponse, Paginated};
use crate::state::AppState;
use crate::tx::RequestTx;

// ---------------------------------------------------------------------------
// Multipart form
// ---------------------------------------------------------------------------

/// An uploaded file taken from the `file` form field.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Raw text fields and file of a log form.
#[derive(Debug, Default)]
pub struct LogForm {
    pub log_date: Option<String>,
    pub description: Option<String>,
    pub issues: Option<String>,
    pub income: Option<String>,
    pub expense: Option<String>,
    pub file: Option<Upload>,
}

/// Log fields after parsing, checked with [`Validate`].
#[derive(Debug, Validate)]
pub struct LogInput {
    pub log_date: Date,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub issues: String,
    #[validate(range(min = 0, message = "Income must not be negative"))]
    pub income: Amount,
    #[validate(range(min = 0, message = "Expense must not be negative"))]
    pub expense: Amount,
}

impl LogForm {
    /// Collect the known fields of a multipart body. Unknown fields are
    /// ignored; a file input left empty counts as no file.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = LogForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(multipart_error)?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(multipart_error)?;
                    if !file_name.is_empty() || !bytes.is_empty() {
                        form.file = Some(Upload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "log_date" | "description" | "issues" | "income" | "expense" => {
                    let value = field
                        .text()
                        .await
                        .map_err(multipart_error)?;
                    let slot = match name.as_str() {
                        "log_date" => &mut form.log_date,
                        "description" => &mut form.description,
                        "issues" => &mut form.issues,
                        "income" => &mut form.income,
                        _ => &mut form.expense,
                    };
                    *slot = Some(value);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Parse and validate the text fields, then the attachment if present.
    ///
    /// Blank amounts count as 0.
    pub fn validate(&self) -> AppResult<LogInput> {
        let log_date = match self.log_date.as_deref().map(str::trim) {
            None | Some("") => return Err(AppError::validation("Log date is required")),
            Some(raw) => Date::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::validation("Log date must be YYYY-MM-DD"))?,
        };

        let input = LogInput {
            log_date,
            description: self.description.as_deref().unwrap_or_default().trim().to_string(),
            issues: self.issues.as_deref().unwrap_or_default().trim().to_string(),
            income: parse_amount(self.income.as_deref(), "Income")?,
            expense: parse_amount(self.expense.as_deref(), "Expense")?,
        };
        input
            .validate()
            .map_err(|errors| AppError::validation(first_validation_message(&errors)))?;

        if let Some(upload) = &self.file {
            validate_attachment(&upload.content_type, upload.bytes.len())?;
        }

        Ok(input)
    }
}

/// A body cut off at the route's size limit is reported like an oversized
/// attachment; other parse failures keep axum's message.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::validation(ATTACHMENT_TOO_LARGE_MESSAGE)
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn parse_amount(raw: Option<&str>, label: &str) -> AppResult<Amount> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<Amount>()
            .map_err(|_| AppError::validation(format!("{label} must be a whole number"))),
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Payload of `GET /api/projects/{id}/stats`.
#[derive(Debug, Serialize)]
pub struct LogStatsData {
    pub stats: DailyLogStats,
    pub cumulative: Vec<CumulativeBalance>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/projects/{id}/logs
pub async fn list(
    auth: RequireSuperAdminOrAdmin,
    Path(project_id): Path<DbId>,
    mut tx: RequestTx,
    ApiQuery(params): ApiQuery<LogListParams>,
) -> AppResult<Json<Paginated<DailyLogListItem>>> {
    ensure_project(tx.conn(), project_id, auth.user.scope()).await?;

    let page = params.page(DEFAULT_LOGS_PER_PAGE);
    let filter = DailyLogFilter {
        search: params.search,
        from_date: params.from_date,
        to_date: params.to_date,
        scope: LogScope::Project(project_id),
        page,
    };
    let (logs, total) = DailyLogRepo::search(tx.conn(), &filter).await?;
    tx.commit().await?;

    Ok(Json(Paginated::new(
        "Get Daily Logs Data",
        "daily_logs",
        logs,
        total,
        page,
    )))
}

/// GET /api/projects/{id}/stats
pub async fn stats(
    auth: RequireSuperAdminOrAdmin,
    Path(project_id): Path<DbId>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<LogStatsData>>> {
    ensure_project(tx.conn(), project_id, auth.user.scope()).await?;

    let stats = DailyLogRepo::stats(tx.conn(), project_id)
        .await?
        .ok_or_else(|| not_found("Project", project_id))?;
    let cumulative = DailyLogRepo::cumulative_balance(tx.conn(), project_id).await?;
    tx.commit().await?;

    Ok(Json(ApiResponse::with_data(
        "Get Daily Log Stats",
        LogStatsData { stats, cumulative },
    )))
}

/// GET /api/projects/{id}/logs/{log_id}
pub async fn get_by_id(
    auth: RequireSuperAdminOrAdmin,
    Path((project_id, id)): Path<(DbId, DbId)>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<DailyLog>>> {
    let log = find_log(tx.conn(), project_id, id, auth.user.scope()).await?;
    tx.commit().await?;

    Ok(Json(ApiResponse::with_data("Get Daily Log By ID", log)))
}

/// POST /api/projects/{id}/logs
pub async fn create(
    State(state): State<AppState>,
    auth: RequireSuperAdminOrAdmin,
    Path(project_id): Path<DbId>,
    mut tx: RequestTx,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<DailyLog>>)> {
    let form = LogForm::read(multipart).await?;
    let input = form.validate()?;

    ensure_project(tx.conn(), project_id, auth.user.scope()).await?;
    if DailyLogRepo::find_by_date(tx.conn(), project_id, input.log_date)
        .await?
        .is_some()
    {
        return Err(duplicate_date());
    }

    let file = match &form.file {
        Some(upload) => Some(
            state
                .storage
                .save_log_attachment(input.log_date, project_id, &upload.file_name, &upload.bytes)
                .await?,
        ),
        None => None,
    };

    let create = CreateDailyLog {
        project_id,
        log_date: input.log_date,
        description: input.description,
        issues: input.issues,
        income: input.income,
        expense: input.expense,
        file: file.clone(),
    };
    let log = match insert_and_commit(tx, &create).await {
        Ok(log) => log,
        Err(err) => {
            discard_new_file(&state, file.as_deref()).await;
            return Err(err);
        }
    };

    tracing::info!(
        log_id = log.id,
        project_id,
        user_id = auth.user.user_id,
        has_file = log.file.is_some(),
        "Daily log created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Create Daily Log Success", log)),
    ))
}

/// PATCH /api/projects/{id}/logs/{log_id}
///
/// Replaces the fields. A new file replaces the stored one; without a file
/// the stored attachment is kept.
pub async fn update(
    State(state): State<AppState>,
    auth: RequireSuperAdminOrAdmin,
    Path((project_id, id)): Path<(DbId, DbId)>,
    mut tx: RequestTx,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<DailyLog>>> {
    let form = LogForm::read(multipart).await?;
    let input = form.validate()?;

    let existing = find_log(tx.conn(), project_id, id, auth.user.scope()).await?;
    if input.log_date != existing.log_date {
        let taken = DailyLogRepo::find_by_date(tx.conn(), project_id, input.log_date).await?;
        if taken.is_some_and(|other| other.id != id) {
            return Err(duplicate_date());
        }
    }

    let new_file = match &form.file {
        Some(upload) => Some(
            state
                .storage
                .save_log_attachment(input.log_date, project_id, &upload.file_name, &upload.bytes)
                .await?,
        ),
        None => None,
    };

    let update = UpdateDailyLog {
        log_date: input.log_date,
        description: input.description,
        issues: input.issues,
        income: input.income,
        expense: input.expense,
        file: new_file.clone().or_else(|| existing.file.clone()),
    };
    let log = match update_and_commit(tx, id, &update).await {
        Ok(log) => log,
        Err(err) => {
            discard_new_file(&state, new_file.as_deref()).await;
            return Err(err);
        }
    };

    if new_file.is_some() {
        if let Some(old) = &existing.file {
            state.storage.remove_all(std::slice::from_ref(old)).await;
        }
    }

    tracing::info!(log_id = id, project_id, user_id = auth.user.user_id, "Daily log updated");
    Ok(Json(ApiResponse::with_data("Update Daily Log Success", log)))
}

/// DELETE /api/projects/{id}/logs/{log_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireSuperAdminOrAdmin,
    Path((project_id, id)): Path<(DbId, DbId)>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<()>>> {
    let log = find_log(tx.conn(), project_id, id, auth.user.scope()).await?;
    DailyLogRepo::delete(tx.conn(), id).await?;
    tx.commit().await?;

    if let Some(file) = &log.file {
        state.storage.remove_all(std::slice::from_ref(file)).await;
    }

    tracing::info!(log_id = id, project_id, user_id = auth.user.user_id, "Daily log deleted");
    Ok(Json(ApiResponse::message("Delete Daily Log Success")))
}

/// DELETE /api/projects/{id}/logs/{log_id}/files
pub async fn delete_file(
    State(state): State<AppState>,
    auth: RequireSuperAdminOrAdmin,
    Path((project_id, id)): Path<(DbId, DbId)>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<()>>> {
    let log = find_log(tx.conn(), project_id, id, auth.user.scope()).await?;
    let Some(file) = log.file else {
        return Err(AppError::BadRequest("Daily log has no attachment".into()));
    };

    DailyLogRepo::set_file(tx.conn(), id, None).await?;
    tx.commit().await?;

    state.storage.remove_all(std::slice::from_ref(&file)).await;

    tracing::info!(log_id = id, project_id, user_id = auth.user.user_id, "Daily log attachment removed");
    Ok(Json(ApiResponse::message("Delete Daily Log File Success")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 404 unless the project exists inside `scope`.
async fn ensure_project(conn: &mut PgConnection, project_id: DbId, scope: OwnerScope) -> AppResult<()> {
    ProjectRepo::find_if_owner(conn, project_id, scope)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found("Project", project_id))
}

/// 404 unless the log belongs to the project and the project is in `scope`.
async fn find_log(
    conn: &mut PgConnection,
    project_id: DbId,
    id: DbId,
    scope: OwnerScope,
) -> AppResult<DailyLog> {
    DailyLogRepo::find_if_project_and_log_owner(conn, project_id, id, scope)
        .await?
        .ok_or_else(|| not_found("Daily log", id))
}

async fn insert_and_commit(mut tx: RequestTx, input: &CreateDailyLog) -> AppResult<DailyLog> {
    let log = DailyLogRepo::create(tx.conn(), input).await?;
    tx.commit().await?;
    Ok(log)
}

async fn update_and_commit(
    mut tx: RequestTx,
    id: DbId,
    input: &UpdateDailyLog,
) -> AppResult<DailyLog> {
    let log = DailyLogRepo::update(tx.conn(), id, input)
        .await?
        .ok_or_else(|| not_found("Daily log", id))?;
    tx.commit().await?;
    Ok(log)
}

/// Remove a file written for a request whose transaction did not commit.
async fn discard_new_file(state: &AppState, file: Option<&str>) {
    if let Some(path) = file {
        if let Err(e) = state.storage.remove(path).await {
            tracing::error!(error = %e, path, "Failed to remove orphaned attachment");
        }
    }
}

fn duplicate_date() -> AppError {
    AppError::Core(CoreError::Conflict(DUPLICATE_LOG_DATE_MESSAGE.into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn form(date: &str, income: &str, expense: &str) -> LogForm {
        LogForm {
            log_date: Some(date.into()),
            description: Some(" Poured foundation ".into()),
            issues: None,
            income: Some(income.into()),
            expense: Some(expense.into()),
            file: None,
        }
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Core(CoreError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parses_fields_and_trims_text() {
        let input = form("2024-03-01", "100", "").validate().unwrap();
        assert_eq!(input.log_date, Date::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(input.description, "Poured foundation");
        assert_eq!(input.issues, "");
        assert_eq!(input.income, 100);
        assert_eq!(input.expense, 0);
    }

    #[test]
    fn date_is_required_and_must_be_iso() {
        let err = form("", "1", "1").validate().unwrap_err();
        assert_eq!(validation_message(err), "Log date is required");
        let err = form("01/03/2024", "1", "1").validate().unwrap_err();
        assert_eq!(validation_message(err), "Log date must be YYYY-MM-DD");
    }

    #[test]
    fn amounts_must_be_non_negative_integers() {
        let err = form("2024-03-01", "-5", "0").validate().unwrap_err();
        assert_eq!(validation_message(err), "Income must not be negative");
        let err = form("2024-03-01", "1", "abc").validate().unwrap_err();
        assert_eq!(validation_message(err), "Expense must be a whole number");
    }

    #[test]
    fn description_is_required() {
        let mut f = form("2024-03-01", "1", "1");
        f.description = Some("   ".into());
        let err = f.validate().unwrap_err();
        assert_eq!(validation_message(err), "Description is required");
    }

    #[test]
    fn attachment_type_is_checked() {
        let mut f = form("2024-03-01", "1", "1");
        f.file = Some(Upload {
            file_name: "run.exe".into(),
            content_type: "application/x-msdownload".into(),
            bytes: vec![0; 4],
        });
        assert_matches!(f.validate(), Err(AppError::Core(CoreError::Validation(_))));
    }
}
