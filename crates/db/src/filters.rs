//! Dynamic `WHERE` clause construction for filtered listings.
//!
//! Listing queries run twice (a `COUNT(*)` and the page itself) and must
//! apply identical conditions with identical bind order. [`WhereBuilder`]
//! records each condition together with its argument so both queries are
//! built from one source.

use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

use sitelog_core::types::{Date, DbId};

/// A bind argument for a dynamic condition.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Id(DbId),
    SmallInt(i16),
    Date(Date),
}

/// Accumulates `AND`-joined conditions with `$n` placeholders.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    args: Vec<SqlArg>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition without arguments.
    pub fn push_raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Add a condition with one argument. `{}` in `template` is replaced by
    /// the argument's placeholder.
    pub fn push(&mut self, template: &str, arg: SqlArg) -> &mut Self {
        self.args.push(arg);
        let placeholder = format!("${}", self.args.len());
        self.conditions.push(template.replace("{}", &placeholder));
        self
    }

    /// Add a condition only when `value` is present.
    pub fn push_opt<T>(
        &mut self,
        template: &str,
        value: Option<T>,
        to_arg: impl FnOnce(T) -> SqlArg,
    ) -> &mut Self {
        if let Some(v) = value {
            self.push(template, to_arg(v));
        }
        self
    }

    /// Add a case-insensitive substring match when `term` is non-empty.
    pub fn push_contains(&mut self, column: &str, term: Option<&str>) -> &mut Self {
        match term.map(str::trim) {
            Some(t) if !t.is_empty() => {
                self.push(&format!("{column} ILIKE {{}}"), SqlArg::Text(format!("%{t}%")))
            }
            _ => self,
        }
    }

    /// The rendered `WHERE ...` clause, or an empty string.
    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Placeholder index for the first argument bound after the conditions.
    pub fn next_index(&self) -> usize {
        self.args.len() + 1
    }

    /// Bind the recorded arguments, in order, to a row query.
    pub fn bind_as<'q, O>(
        &'q self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        let mut q = query;
        for arg in &self.args {
            q = match arg {
                SqlArg::Text(v) => q.bind(v.as_str()),
                SqlArg::Id(v) => q.bind(*v),
                SqlArg::SmallInt(v) => q.bind(*v),
                SqlArg::Date(v) => q.bind(*v),
            };
        }
        q
    }

    /// Bind the recorded arguments, in order, to a scalar query.
    pub fn bind_scalar<'q, O>(
        &'q self,
        query: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        let mut q = query;
        for arg in &self.args {
            q = match arg {
                SqlArg::Text(v) => q.bind(v.as_str()),
                SqlArg::Id(v) => q.bind(*v),
                SqlArg::SmallInt(v) => q.bind(*v),
                SqlArg::Date(v) => q.bind(*v),
            };
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_renders_no_clause() {
        let w = WhereBuilder::new();
        assert_eq!(w.clause(), "");
        assert_eq!(w.next_index(), 1);
    }

    #[test]
    fn placeholders_follow_argument_order() {
        let mut w = WhereBuilder::new();
        w.push_raw("is_deleted = false")
            .push("role = {}", SqlArg::SmallInt(1))
            .push("created_by = {}", SqlArg::Id(9));
        assert_eq!(
            w.clause(),
            "WHERE is_deleted = false AND role = $1 AND created_by = $2"
        );
        assert_eq!(w.next_index(), 3);
    }

    #[test]
    fn optional_conditions_are_skipped_when_absent() {
        let mut w = WhereBuilder::new();
        w.push_opt("status = {}", None::<i16>, SqlArg::SmallInt)
            .push_opt("created_by = {}", Some(4), SqlArg::Id);
        assert_eq!(w.clause(), "WHERE created_by = $1");
    }

    #[test]
    fn contains_wraps_term_and_ignores_blank() {
        let mut w = WhereBuilder::new();
        w.push_contains("p.name", Some("   "))
            .push_contains("p.name", Some(" bridge "));
        assert_eq!(w.clause(), "WHERE p.name ILIKE $1");
        assert_eq!(w.args, vec![SqlArg::Text("%bridge%".into())]);
    }
}
