//! Page-number pagination used by every listing endpoint.

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// First page number.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size for `/projects`.
pub const DEFAULT_PROJECTS_PER_PAGE: i64 = 100;

/// Default page size for `/projects/{id}/logs`.
pub const DEFAULT_LOGS_PER_PAGE: i64 = 10;

/// Default page size for `/users`.
pub const DEFAULT_USERS_PER_PAGE: i64 = 10;

/// Hard ceiling on page size.
pub const MAX_PER_PAGE: i64 = 1000;

/// A resolved page request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    /// Resolve optional query values against an endpoint default.
    pub fn new(page: Option<i64>, per_page: Option<i64>, default_per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            per_page: clamp_limit(per_page, default_per_page, MAX_PER_PAGE),
        }
    }

    /// SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL `OFFSET`: `(page - 1) * per_page`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}
