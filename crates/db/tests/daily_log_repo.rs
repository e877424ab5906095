//! Integration tests for the daily log repository.
//!
//! Covers the one-log-per-day constraint, ownership lookups, scoped
//! pagination, per-project statistics, and the running balance series.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use sitelog_core::pagination::Page;
use sitelog_core::roles::{OwnerScope, ROLE_CODE_ADMIN};
use sitelog_db::models::daily_log::{CreateDailyLog, DailyLogFilter, LogScope, UpdateDailyLog};
use sitelog_db::models::project::CreateProject;
use sitelog_db::models::status::ProjectStatus;
use sitelog_db::models::user::CreateUser;
use sitelog_db::repositories::{DailyLogRepo, ProjectRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Create an admin and one project owned by them. Returns `(owner_id, project_id)`.
async fn seed_project(conn: &mut PgConnection, username: &str, budget: i64) -> (i64, i64) {
    let owner = UserRepo::create(
        conn,
        &CreateUser {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: ROLE_CODE_ADMIN,
        },
    )
    .await
    .unwrap();
    let project = ProjectRepo::create(
        conn,
        &CreateProject {
            name: format!("{username} project"),
            description: "daily log tests".to_string(),
            start_date: None,
            end_date: None,
            status: ProjectStatus::OnGoing.id(),
            budget,
            created_by: owner.id,
        },
    )
    .await
    .unwrap();
    (owner.id, project.id)
}

fn new_log(project_id: i64, day: &str, income: i64, expense: i64) -> CreateDailyLog {
    CreateDailyLog {
        project_id,
        log_date: date(day),
        description: format!("work on {day}"),
        issues: String::new(),
        income,
        expense,
        file: None,
    }
}

fn filter(scope: LogScope) -> DailyLogFilter {
    DailyLogFilter {
        search: None,
        from_date: None,
        to_date: None,
        scope,
        page: Page::new(None, None, 10),
    }
}

// ---------------------------------------------------------------------------
// Uniqueness and lookups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_date_violates_unique_constraint(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "dupeowner", 0).await;
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", 1, 0))
        .await
        .unwrap();

    let err = DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", 9, 9))
        .await
        .expect_err("second log on the same date must fail");
    let db_err = err.as_database_error().expect("database error expected");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_daily_logs_project_date"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_date_allowed_across_projects(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, first) = seed_project(&mut conn, "twoprojA", 0).await;
    let (_, second) = seed_project(&mut conn, "twoprojB", 0).await;

    DailyLogRepo::create(&mut conn, &new_log(first, "2024-05-01", 1, 0))
        .await
        .unwrap();
    DailyLogRepo::create(&mut conn, &new_log(second, "2024-05-01", 1, 0))
        .await
        .unwrap();

    let found = DailyLogRepo::find_by_date(&mut conn, second, date("2024-05-01"))
        .await
        .unwrap();
    assert_eq!(found.map(|l| l.project_id), Some(second));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_amounts_are_rejected(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "negowner", 0).await;

    let result = DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", -1, 0)).await;
    assert!(result.is_err(), "income must be non-negative");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_if_project_and_log_owner(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (alice, alice_project) = seed_project(&mut conn, "logalice", 0).await;
    let (bob, bob_project) = seed_project(&mut conn, "logbob1", 0).await;
    let log = DailyLogRepo::create(&mut conn, &new_log(alice_project, "2024-05-01", 1, 0))
        .await
        .unwrap();

    let owned = DailyLogRepo::find_if_project_and_log_owner(
        &mut conn,
        alice_project,
        log.id,
        OwnerScope::Owner(alice),
    )
    .await
    .unwrap();
    assert_eq!(owned.map(|l| l.id), Some(log.id));

    let foreign_owner = DailyLogRepo::find_if_project_and_log_owner(
        &mut conn,
        alice_project,
        log.id,
        OwnerScope::Owner(bob),
    )
    .await
    .unwrap();
    assert!(foreign_owner.is_none());

    let wrong_project =
        DailyLogRepo::find_if_project_and_log_owner(&mut conn, bob_project, log.id, OwnerScope::All)
            .await
            .unwrap();
    assert!(wrong_project.is_none(), "log must belong to the given project");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_set_file(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "updowner", 0).await;
    let log = DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", 1, 0))
        .await
        .unwrap();

    let updated = DailyLogRepo::update(
        &mut conn,
        log.id,
        &UpdateDailyLog {
            log_date: date("2024-05-02"),
            description: "revised".to_string(),
            issues: "rain".to_string(),
            income: 5,
            expense: 3,
            file: Some("logs/a.png".to_string()),
        },
    )
    .await
    .unwrap()
    .expect("log should exist");
    assert_eq!(updated.log_date, date("2024-05-02"));
    assert_eq!(updated.file.as_deref(), Some("logs/a.png"));

    assert!(DailyLogRepo::set_file(&mut conn, log.id, None).await.unwrap());
    let cleared = DailyLogRepo::find_by_id(&mut conn, log.id).await.unwrap().unwrap();
    assert_eq!(cleared.file, None);
    assert_eq!(cleared.issues, "rain");
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_scopes_and_orders_by_date(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (alice, alice_project) = seed_project(&mut conn, "scopealice", 0).await;
    let (_, bob_project) = seed_project(&mut conn, "scopebob1", 0).await;
    for day in ["2024-05-03", "2024-05-01", "2024-05-02"] {
        DailyLogRepo::create(&mut conn, &new_log(alice_project, day, 1, 0))
            .await
            .unwrap();
    }
    DailyLogRepo::create(&mut conn, &new_log(bob_project, "2024-05-04", 1, 0))
        .await
        .unwrap();

    let (rows, total) = DailyLogRepo::search(&mut conn, &filter(LogScope::Project(alice_project)))
        .await
        .unwrap();
    assert_eq!(total, 3);
    let days: Vec<NaiveDate> = rows.iter().map(|r| r.log.log_date).collect();
    assert_eq!(
        days,
        vec![date("2024-05-03"), date("2024-05-02"), date("2024-05-01")]
    );
    assert_eq!(rows[0].project_name, "scopealice project");

    let (_, owner_total) = DailyLogRepo::search(&mut conn, &filter(LogScope::Owner(alice)))
        .await
        .unwrap();
    assert_eq!(owner_total, 3);

    let (_, all_total) = DailyLogRepo::search(&mut conn, &filter(LogScope::All))
        .await
        .unwrap();
    assert_eq!(all_total, 4);

    let mut ranged = filter(LogScope::All);
    ranged.from_date = Some(date("2024-05-02"));
    ranged.to_date = Some(date("2024-05-03"));
    ranged.search = Some("WORK".to_string());
    let (rows, total) = DailyLogRepo::search(&mut conn, &ranged).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows.len(), 2);
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_balance_and_budget_usage(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "statowner", 1000).await;
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", 100, 40))
        .await
        .unwrap();

    let stats = DailyLogRepo::stats(&mut conn, project_id)
        .await
        .unwrap()
        .expect("project exists");
    assert_eq!(stats.total_income, 100);
    assert_eq!(stats.total_expense, 40);
    assert_eq!(stats.budget, 1000);
    assert_eq!(stats.balance, 60);
    assert_eq!(stats.budget_usage_percentage, 4.0);
    assert_eq!(stats.total_working_days, 1);
    assert_eq!(stats.avg_daily_income, 100.0);
    assert_eq!(stats.highest_income_day, Some(date("2024-05-01")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_without_logs_or_budget(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "zeroowner", 0).await;

    let stats = DailyLogRepo::stats(&mut conn, project_id)
        .await
        .unwrap()
        .expect("project exists");
    assert_eq!(stats.total_working_days, 0);
    assert_eq!(stats.budget_usage_percentage, 0.0);
    assert_eq!(stats.avg_daily_expense, 0.0);
    assert_eq!(stats.highest_expense_day, None);

    assert!(DailyLogRepo::stats(&mut conn, project_id + 1000)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_rounding_and_tie_break(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "roundowner", 3).await;
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-02", 50, 1))
        .await
        .unwrap();
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", 50, 0))
        .await
        .unwrap();
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-03", 0, 0))
        .await
        .unwrap();

    let stats = DailyLogRepo::stats(&mut conn, project_id)
        .await
        .unwrap()
        .unwrap();
    // 100 / 3 and 1 / 3 * 100
    assert_eq!(stats.avg_daily_income, 33.33);
    assert_eq!(stats.budget_usage_percentage, 33.33);
    assert_eq!(stats.highest_income_day, Some(date("2024-05-01")));
    assert_eq!(stats.highest_expense_day, Some(date("2024-05-02")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cumulative_balance_is_running_sum(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "cumowner", 0).await;
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-02", 50, 30))
        .await
        .unwrap();
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-01", 100, 0))
        .await
        .unwrap();

    let series = DailyLogRepo::cumulative_balance(&mut conn, project_id)
        .await
        .unwrap();
    let balances: Vec<i64> = series.iter().map(|p| p.cumulative_balance).collect();
    assert_eq!(balances, vec![100, 120]);
    assert_eq!(series[0].log_date, date("2024-05-01"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attachment_paths_lists_only_stored_files(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (_, project_id) = seed_project(&mut conn, "fileowner", 0).await;
    let mut with_file = new_log(project_id, "2024-05-01", 0, 0);
    with_file.file = Some("logs/one.pdf".to_string());
    DailyLogRepo::create(&mut conn, &with_file).await.unwrap();
    DailyLogRepo::create(&mut conn, &new_log(project_id, "2024-05-02", 0, 0))
        .await
        .unwrap();

    let paths = DailyLogRepo::attachment_paths(&mut conn, project_id)
        .await
        .unwrap();
    assert_eq!(paths, vec!["logs/one.pdf".to_string()]);
}
