//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&mut PgConnection` as the first argument, so callers decide the
//! transaction boundary.

pub mod daily_log_repo;
pub mod project_repo;
pub mod session_repo;
pub mod user_repo;

pub use daily_log_repo::DailyLogRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
