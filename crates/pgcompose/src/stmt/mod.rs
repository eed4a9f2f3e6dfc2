//! Statement builders for SELECT / INSERT / UPDATE / DELETE.
//!
//! Builders accumulate fragments into named clause slots and concatenate the
//! slots in a fixed order. Every method consumes the builder and returns it,
//! so a builder value is never shared while it is being assembled.
//!
//! Two render entry points exist on every statement:
//! - [`Fragment::render`] yields generic `?` marks, so a statement can be
//!   nested inside another fragment (sub-selects, `INSERT ... SELECT`, ...).
//! - `to_sql()` renders and then runs the configured
//!   [`PlaceholderFormat`] once over the whole text.
//!
//! # Example
//!
//! ```ignore
//! use pgcompose::{PlaceholderFormat, Predicate, StatementBuilder};
//!
//! let psql = StatementBuilder::new().placeholder_format(PlaceholderFormat::DOLLAR);
//! let q = psql
//!     .select(["id", "name"])
//!     .from(["users"])
//!     .filter(Predicate::eq([("status", "active")]))
//!     .limit(10)
//!     .to_sql()?;
//! // SELECT id, name FROM users WHERE status = $1 LIMIT 10
//! ```

mod delete;
mod insert;
mod select;
mod update;


pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

use crate::error::SqlResult;
use crate::fragment::{Arg, FragmentRef, Rendered};
use crate::logic::join_rendered;
use crate::placeholder::{MARK, PlaceholderFormat};

/// Shared statement configuration.
///
/// Statements created through a `StatementBuilder` inherit its placeholder
/// format; each statement can still override it.
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    placeholder_format: PlaceholderFormat,
}

impl StatementBuilder {
    /// Create a builder using `?` placeholders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder format for statements created from now on.
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// Start a SELECT with the given result columns.
    pub fn select<I, S>(&self, columns: I) -> Select
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Select::new()
            .placeholder_format(self.placeholder_format.clone())
            .columns(columns)
    }

    /// Start an INSERT into `table`.
    pub fn insert(&self, table: impl Into<String>) -> Insert {
        Insert::new(table).placeholder_format(self.placeholder_format.clone())
    }

    /// Start an UPDATE of `table`.
    pub fn update(&self, table: impl Into<String>) -> Update {
        Update::new(table).placeholder_format(self.placeholder_format.clone())
    }

    /// Start a DELETE naming the target tables.
    pub fn delete<I, S>(&self, what: I) -> Delete
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Delete::new(what).placeholder_format(self.placeholder_format.clone())
    }
}

/// Append `<keyword><part1><sep><part2>...` when the slot renders to anything.
pub(crate) fn append_clause(
    out: &mut Rendered,
    keyword: &str,
    parts: &[FragmentRef],
    sep: &str,
) -> SqlResult<()> {
    if parts.is_empty() {
        return Ok(());
    }
    let joined = join_rendered(parts, sep)?;
    if !joined.is_empty() {
        out.sql.push_str(keyword);
        out.sql.push_str(&joined.sql);
        out.args.extend(joined.args);
    }
    Ok(())
}

/// Append prefixes followed by a single space.
pub(crate) fn append_prefixes(out: &mut Rendered, prefixes: &[FragmentRef]) -> SqlResult<()> {
    let joined = join_rendered(prefixes, " ")?;
    if !joined.is_empty() {
        out.sql.push_str(&joined.sql);
        out.sql.push(' ');
        out.args.extend(joined.args);
    }
    Ok(())
}

/// Bind a value as `?`, or splice a fragment's text and args.
pub(crate) fn push_arg(out: &mut Rendered, arg: &Arg) -> SqlResult<()> {
    match arg {
        Arg::Value(v) => {
            out.sql.push(MARK);
            out.args.push(v.clone());
        }
        Arg::Fragment(f) => {
            let r = f.render()?;
            out.sql.push_str(&r.sql);
            out.args.extend(r.args);
        }
    }
    Ok(())
}

pub(crate) fn append_list(out: &mut Rendered, keyword: &str, items: &[String]) {
    if !items.is_empty() {
        out.sql.push_str(keyword);
        out.sql.push_str(&items.join(", "));
    }
}

pub(crate) fn append_limit_offset(out: &mut Rendered, limit: Option<u64>, offset: Option<u64>) {
    if let Some(limit) = limit {
        out.sql.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = offset {
        out.sql.push_str(&format!(" OFFSET {offset}"));
    }
}

/// Run the final placeholder rewrite and log the outcome.
pub(crate) fn finalize(
    statement: &'static str,
    format: &PlaceholderFormat,
    rendered: SqlResult<Rendered>,
) -> SqlResult<Rendered> {
    match rendered {
        Ok(r) => {
            let sql = format.replace_placeholders(&r.sql);
            tracing::trace!(
                target: "pgcompose.sql",
                statement,
                param_count = r.args.len(),
                sql = %sql,
                "rendered statement"
            );
            Ok(Rendered::new(sql, r.args))
        }
        Err(err) => {
            tracing::debug!(
                target: "pgcompose.sql",
                statement,
                error = %err,
                "statement render failed"
            );
            Err(err)
        }
    }
}

/// WHERE shortcuts shared by the statements that have a WHERE slot.
macro_rules! impl_where_shortcuts {
    ($ty:ty) => {
        impl $ty {
            /// Add WHERE: column = value (NULL → IS NULL, list → IN)
            pub fn eq(
                self,
                column: impl Into<String>,
                value: impl Into<$crate::predicate::Operand>,
            ) -> Self {
                self.filter($crate::predicate::Predicate::eq([(column, value)]))
            }

            /// Add WHERE: column <> value (NULL → IS NOT NULL, list → NOT IN)
            pub fn not_eq(
                self,
                column: impl Into<String>,
                value: impl Into<$crate::predicate::Operand>,
            ) -> Self {
                self.filter($crate::predicate::Predicate::not_eq([(column, value)]))
            }

            /// Add WHERE: column < value
            pub fn lt(
                self,
                column: impl Into<String>,
                value: impl Into<$crate::predicate::Operand>,
            ) -> Self {
                self.filter($crate::predicate::Predicate::lt([(column, value)]))
            }

            /// Add WHERE: column <= value
            pub fn lt_or_eq(
                self,
                column: impl Into<String>,
                value: impl Into<$crate::predicate::Operand>,
            ) -> Self {
                self.filter($crate::predicate::Predicate::lt_or_eq([(column, value)]))
            }

            /// Add WHERE: column > value
            pub fn gt(
                self,
                column: impl Into<String>,
                value: impl Into<$crate::predicate::Operand>,
            ) -> Self {
                self.filter($crate::predicate::Predicate::gt([(column, value)]))
            }

            /// Add WHERE: column >= value
            pub fn gt_or_eq(
                self,
                column: impl Into<String>,
                value: impl Into<$crate::predicate::Operand>,
            ) -> Self {
                self.filter($crate::predicate::Predicate::gt_or_eq([(column, value)]))
            }

            /// Add a WHERE condition with `?` placeholders.
            pub fn filter_sql(
                self,
                sql: impl Into<String>,
                args: impl IntoIterator<Item = $crate::fragment::Arg>,
            ) -> Self {
                self.filter($crate::expr::Expr::new(sql, args))
            }
        }
    };
}

pub(crate) use impl_where_shortcuts;
