//! Row models and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` entity structs matching database rows (serialized directly
//!   unless they carry secrets)
//! - input DTOs consumed by the repositories
//! - filter structs for paginated listings

pub mod daily_log;
pub mod project;
pub mod session;
pub mod status;
pub mod user;
