//! Shared response envelope types for API handlers.
//!
//! Every JSON response is `{ "error": false, "message": ..., "data"?: ... }`.
//! Paginated listings use [`Paginated`], which nests the rows under a named
//! key and repeats the total as `recordsFiltered` / `recordsTotal` for table
//! widgets.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use sitelog_core::pagination::Page;

/// Standard success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::with_data("Get Project By ID", project)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope without a `data` field.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Paginated listing envelope.
///
/// Serializes as:
///
/// ```text
/// { "error": false, "message": ...,
///   "data": { <name>: [...], "total": n, "page": p, "perPage": pp },
///   "recordsFiltered": n, "recordsTotal": n }
/// ```
#[derive(Debug)]
pub struct Paginated<T: Serialize> {
    pub message: String,
    /// Key the rows are nested under inside `data`.
    pub name: &'static str,
    pub items: Vec<T>,
    pub total: i64,
    pub page: Page,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(
        message: impl Into<String>,
        name: &'static str,
        items: Vec<T>,
        total: i64,
        page: Page,
    ) -> Self {
        Self {
            message: message.into(),
            name,
            items,
            total,
            page,
        }
    }
}

struct PageData<'a, T: Serialize>(&'a Paginated<T>);

impl<T: Serialize> Serialize for PageData<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let p = self.0;
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(p.name, &p.items)?;
        map.serialize_entry("total", &p.total)?;
        map.serialize_entry("page", &p.page.page)?;
        map.serialize_entry("perPage", &p.page.per_page)?;
        map.end()
    }
}

impl<T: Serialize> Serialize for Paginated<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("error", &false)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("data", &PageData(self))?;
        map.serialize_entry("recordsFiltered", &self.total)?;
        map.serialize_entry("recordsTotal", &self.total)?;
        map.end()
    }
}
