//! Shared query parameter types for API handlers.
//!
//! Listing endpoints accept `page`, `per_page`, `search`, an optional
//! equality filter, and a `from_date` / `to_date` range (`YYYY-MM-DD`).
//! Empty values (`?status=`) count as absent, which is what HTML forms send
//! for untouched inputs.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use sitelog_core::pagination::Page;
use sitelog_core::roles::RoleCode;
use sitelog_core::types::Date;
use sitelog_db::models::status::StatusId;

/// Deserialize an optional value, treating a blank string as `None`.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// `GET /api/projects` query (`?page=&per_page=&search=&status=&from_date=&to_date=`).
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<StatusId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to_date: Option<Date>,
}

/// `GET /api/projects/{id}/logs` query.
#[derive(Debug, Default, Deserialize)]
pub struct LogListParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to_date: Option<Date>,
}

/// `GET /api/users` query.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub role: Option<RoleCode>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to_date: Option<Date>,
}

impl ProjectListParams {
    pub fn page(&self, default_per_page: i64) -> Page {
        Page::new(self.page, self.per_page, default_per_page)
    }
}

impl LogListParams {
    pub fn page(&self, default_per_page: i64) -> Page {
        Page::new(self.page, self.per_page, default_per_page)
    }
}

impl UserListParams {
    pub fn page(&self, default_per_page: i64) -> Page {
        Page::new(self.page, self.per_page, default_per_page)
    }
}
