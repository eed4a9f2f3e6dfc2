//! INSERT statement builder.

use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::fragment::{Arg, Fragment, FragmentRef, Rendered};
use crate::placeholder::PlaceholderFormat;

use super::{append_clause, append_list, append_prefixes, finalize, push_arg};

/// INSERT statement builder.
///
/// Value rows are lists of [`Arg`]s: plain values bind as `?`, fragment args
/// (`Expr::raw("DEFAULT")`, a `Json` literal, ...) are spliced in place.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Insert {
    placeholder_format: PlaceholderFormat,
    prefixes: Vec<FragmentRef>,
    options: Vec<String>,
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Arg>>,
    /// `INSERT ... SELECT` source; takes precedence over value rows
    select: Option<FragmentRef>,
    returning: Vec<String>,
    suffixes: Vec<FragmentRef>,
}

impl Insert {
    /// Create a new INSERT into `table`.
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
        finalize("insert", &self.placeholder_format, self.render())
    }

    /// Add an expression to the beginning of the statement.
    pub fn prefix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.prefixes.push(Expr::new(sql, args).into());
        self
    }

    /// Add keywords between `INSERT` and `INTO`.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Set the target table.
    pub fn into_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Add column names.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add one row of values.
    pub fn values(mut self, row: impl IntoIterator<Item = Arg>) -> Self {
        self.rows.push(row.into_iter().collect());
        self
    }

    /// Set columns and a single value row from `(column, value)` pairs.
    ///
    /// Replaces any columns and rows added before.
    pub fn columns_values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        let (columns, row): (Vec<String>, Vec<Arg>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        self.columns = columns;
        self.rows = vec![row];
        self
    }

    /// Insert the rows produced by a sub-select instead of value rows.
    pub fn select(mut self, sub: impl Into<FragmentRef>) -> Self {
        self.select = Some(sub.into());
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

fn render_row(out: &mut Rendered, row: &[Arg]) -> SqlResult<()> {
    out.sql.push('(');
    for (i, arg) in row.iter().enumerate() {
        if i > 0 {
            out.sql.push(',');
        }
        push_arg(out, arg)?;
    }
    out.sql.push(')');
    Ok(())
}

impl Fragment for Insert {
    fn render(&self) -> SqlResult<Rendered> {
        if self.table.is_empty() {
            return Err(SqlError::validation(
                "insert statements must specify a table",
            ));
        }
        if self.rows.is_empty() && self.select.is_none() {
            return Err(SqlError::validation(
                "insert statements must have at least one set of values or select clause",
            ));
        }

        let mut out = Rendered::default();
        append_prefixes(&mut out, &self.prefixes)?;

        out.sql.push_str("INSERT ");
        if !self.options.is_empty() {
            out.sql.push_str(&self.options.join(" "));
            out.sql.push(' ');
        }
        out.sql.push_str("INTO ");
        out.sql.push_str(&self.table);

        if !self.columns.is_empty() {
            out.sql.push_str(" (");
            out.sql.push_str(&self.columns.join(","));
            out.sql.push(')');
        }

        match &self.select {
            Some(sub) => {
                let r = sub.render()?;
                out.sql.push(' ');
                out.sql.push_str(&r.sql);
                out.args.extend(r.args);
            }
            None => {
                out.sql.push_str(" VALUES ");
                for (i, row) in self.rows.iter().enumerate() {
                    if i > 0 {
                        out.sql.push(',');
                    }
                    render_row(&mut out, row)?;
                }
            }
        }

        append_list(&mut out, " RETURNING ", &self.returning);
        append_clause(&mut out, " ", &self.suffixes, " ")?;

        Ok(out)
    }
}
