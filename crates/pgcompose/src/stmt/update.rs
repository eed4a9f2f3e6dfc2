//! UPDATE statement builder.

use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::fragment::{Arg, Fragment, FragmentRef, Rendered};
use crate::placeholder::PlaceholderFormat;

use super::{
    append_clause, append_limit_offset, append_list, append_prefixes, finalize,
    impl_where_shortcuts, push_arg,
};

#[derive(Debug, Clone)]
struct SetClause {
    column: String,
    value: Arg,
}

/// UPDATE statement builder.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Update {
    placeholder_format: PlaceholderFormat,
    prefixes: Vec<FragmentRef>,
    table: String,
    set_clauses: Vec<SetClause>,
    where_parts: Vec<FragmentRef>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    returning: Vec<String>,
    suffixes: Vec<FragmentRef>,
}

impl Update {
    /// Create a new UPDATE of `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// Render with this statement's placeholder format applied.
    pub fn to_sql(&self) -> SqlResult<Rendered> {
        finalize("update", &self.placeholder_format, self.render())
    }

    /// Add an expression to the beginning of the statement.
    pub fn prefix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.prefixes.push(Expr::new(sql, args).into());
        self
    }

    /// Set the target table.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Add `column = value`. A fragment value is spliced (e.g. `Expr::raw("n + 1")`).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.set_clauses.push(SetClause {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Add one SET clause per `(column, value)` pair, in iteration order.
    pub fn set_map<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        pairs.into_iter().fold(self, |b, (k, v)| b.set(k, v))
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
        self.returning.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add an expression to the end of the statement.
    pub fn suffix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.suffixes.push(Expr::new(sql, args).into());
        self
    }
}

impl_where_shortcuts!(Update);

impl Fragment for Update {
    fn render(&self) -> SqlResult<Rendered> {
        if self.table.is_empty() {
            return Err(SqlError::validation(
                "update statements must specify a table",
            ));
        }
        if self.set_clauses.is_empty() {
            return Err(SqlError::validation(
                "update statements must have at least one Set clause",
            ));
        }

        let mut out = Rendered::default();
        append_prefixes(&mut out, &self.prefixes)?;

        out.sql.push_str("UPDATE ");
        out.sql.push_str(&self.table);
        out.sql.push_str(" SET ");
        for (i, clause) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                out.sql.push_str(", ");
            }
            out.sql.push_str(&clause.column);
            out.sql.push_str(" = ");
            push_arg(&mut out, &clause.value)?;
        }

        append_clause(&mut out, " WHERE ", &self.where_parts, " AND ")?;
        append_list(&mut out, " ORDER BY ", &self.order_bys);
        append_limit_offset(&mut out, self.limit, self.offset);
        append_list(&mut out, " RETURNING ", &self.returning);
        append_clause(&mut out, " ", &self.suffixes, " ")?;

        Ok(out)
    }
}
