//! DELETE statement builder.

use crate::error::{SqlError, SqlResult};
use crate::expr::{Alias, Expr};
use crate::fragment::{Arg, Fragment, FragmentRef, Rendered};
use crate::placeholder::PlaceholderFormat;

use super::{
    append_clause, append_limit_offset, append_list, append_prefixes, finalize,
    impl_where_shortcuts, Select,
};

/// DELETE statement builder.
///
/// `what` names the tables rows are deleted from. When no FROM is given the
/// targets double as the FROM clause; when `what` names exactly the FROM
/// table it is not repeated after `DELETE`.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Delete {
    placeholder_format: PlaceholderFormat,
    prefixes: Vec<FragmentRef>,
    what: Vec<String>,
    from: Option<String>,
    using: Vec<String>,
    joins: Vec<FragmentRef>,
    where_parts: Vec<FragmentRef>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    returning: Vec<FragmentRef>,
    suffixes: Vec<FragmentRef>,
}

impl Delete {
    /// Create a DELETE of the given target tables. Empty names are ignored.
    pub fn new<I, S>(what: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            what: what
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
            ..Self::default()
        }
    }

    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// Render with this statement's placeholder format applied.
    pub fn to_sql(&self) -> SqlResult<Rendered> {
        finalize("delete", &self.placeholder_format, self.render())
    }

    /// Add an expression to the beginning of the statement.
    pub fn prefix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.prefixes.push(Expr::new(sql, args).into());
        self
    }

    /// Set the FROM table.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Add tables to the USING clause.
    pub fn using<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.using.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Add a join clause verbatim.
    pub fn join_clause(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.joins.push(Expr::new(sql, args).into());
        self
    }

    pub fn join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("JOIN {join}"), args)
    }

    pub fn inner_join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("INNER JOIN {join}"), args)
    }

    pub fn left_join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("LEFT JOIN {join}"), args)
    }

    pub fn right_join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("RIGHT JOIN {join}"), args)
    }

    /// Add a WHERE condition. Conditions are ANDed together.
    pub fn filter(mut self, pred: impl Into<FragmentRef>) -> Self {
        self.where_parts.push(pred.into());
        self
    }

    pub fn order_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_bys.extend(exprs.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Add RETURNING columns.
    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning
            .extend(columns.into_iter().map(|c| Expr::raw(c).into()));
        self
    }

    /// Add `(<sub>) AS <alias>` to the RETURNING clause.
    pub fn returning_select(mut self, sub: Select, alias: impl Into<String>) -> Self {
        self.returning.push(Alias::new(sub, alias).into());
        self
    }

    /// Add an expression to the end of the statement.
    pub fn suffix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.suffixes.push(Expr::new(sql, args).into());
        self
    }
}

impl_where_shortcuts!(Delete);

impl Fragment for Delete {
    fn render(&self) -> SqlResult<Rendered> {
        let from = match self.from.as_deref() {
            Some(from) if !from.is_empty() => from.to_string(),
            _ => self.what.join(", "),
        };
        if from.is_empty() {
            return Err(SqlError::validation(
                "delete statements must specify a From table",
            ));
        }

        let mut out = Rendered::default();
        append_prefixes(&mut out, &self.prefixes)?;

        out.sql.push_str("DELETE ");
        let what = self.what.join(", ");
        if !what.is_empty() && what != from {
            out.sql.push_str(&what);
            out.sql.push(' ');
        }
        out.sql.push_str("FROM ");
        out.sql.push_str(&from);

        if !self.using.is_empty() {
            out.sql.push_str(" USING ");
            out.sql.push_str(&self.using.join(", "));
        }

        append_clause(&mut out, " ", &self.joins, " ")?;
        append_clause(&mut out, " WHERE ", &self.where_parts, " AND ")?;
        append_list(&mut out, " ORDER BY ", &self.order_bys);
        append_limit_offset(&mut out, self.limit, self.offset);
        append_clause(&mut out, " RETURNING ", &self.returning, ", ")?;
        append_clause(&mut out, " ", &self.suffixes, " ")?;

        Ok(out)
    }
}
