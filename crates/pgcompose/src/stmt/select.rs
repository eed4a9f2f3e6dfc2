//! SELECT statement builder.

use crate::error::{SqlError, SqlResult};
use crate::expr::{Alias, Expr, Lateral};
use crate::fragment::{Arg, Fragment, FragmentRef, Rendered};
use crate::logic::join_rendered;
use crate::placeholder::PlaceholderFormat;

use super::{
    append_clause, append_limit_offset, append_list, append_prefixes, finalize,
    impl_where_shortcuts,
};

/// SELECT statement builder.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Select {
    placeholder_format: PlaceholderFormat,
    /// Expressions written before `SELECT` (e.g. `WITH ...`)
    prefixes: Vec<FragmentRef>,
    distinct: bool,
    /// Keywords between `SELECT` and the column list
    options: Vec<String>,
    /// Result columns
    columns: Vec<FragmentRef>,
    /// FROM parts
    from_parts: Vec<FragmentRef>,
    /// JOIN clauses
    joins: Vec<FragmentRef>,
    /// WHERE conditions, ANDed together
    where_parts: Vec<FragmentRef>,
    unions: Vec<FragmentRef>,
    union_alls: Vec<FragmentRef>,
    group_bys: Vec<String>,
    /// HAVING conditions, ANDed together
    having_parts: Vec<FragmentRef>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Expressions written after everything else
    suffixes: Vec<FragmentRef>,
}

impl Select {
    /// Create an empty SELECT; add at least one column before rendering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder format used by [`Select::to_sql`].
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// Render with this statement's placeholder format applied.
    pub fn to_sql(&self) -> SqlResult<Rendered> {
        finalize("select", &self.placeholder_format, self.render())
    }

    /// Add an expression to the beginning of the statement.
    pub fn prefix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.prefixes.push(Expr::new(sql, args).into());
        self
    }

    /// Add a DISTINCT clause.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add select options (e.g. `SQL_NO_CACHE`).
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    // ==================== Columns ====================

    /// Add plain result columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .extend(columns.into_iter().map(|c| Expr::raw(c).into()));
        self
    }

    /// Add a result column built from any fragment.
    pub fn column(mut self, column: impl Into<FragmentRef>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Add a result column with `?` placeholders.
    pub fn column_sql(self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.column(Expr::new(sql, args))
    }

    /// Add a sub-select as `(<sub>) AS <alias>`.
    pub fn column_select(self, sub: Select, alias: impl Into<String>) -> Self {
        self.column(Alias::new(sub, alias))
    }

    // ==================== FROM / JOIN ====================

    /// Add tables to the FROM clause.
    pub fn from<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from_parts
            .extend(tables.into_iter().map(|t| Expr::raw(t).into()));
        self
    }

    /// Add a sub-select to the FROM clause as `(<sub>) AS <alias>`.
    pub fn from_select(mut self, sub: Select, alias: impl Into<String>) -> Self {
        self.from_parts.push(Alias::new(sub, alias).into());
        self
    }

    /// Add `LATERAL (<sub>) AS <alias>` to the FROM clause.
    pub fn lateral_join(mut self, sub: Select, alias: impl Into<String>) -> Self {
        self.from_parts.push(Lateral::new(sub, alias).into());
        self
    }

    /// Add a join clause verbatim.
    pub fn join_clause(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.joins.push(Expr::new(sql, args).into());
        self
    }

    /// Add `JOIN <join>`.
    pub fn join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("JOIN {join}"), args)
    }

    /// Add `INNER JOIN <join>`.
    pub fn inner_join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("INNER JOIN {join}"), args)
    }

    /// Add `LEFT JOIN <join>`.
    pub fn left_join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("LEFT JOIN {join}"), args)
    }

    /// Add `RIGHT JOIN <join>`.
    pub fn right_join(self, join: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        self.join_clause(format!("RIGHT JOIN {join}"), args)
    }

    // ==================== WHERE / HAVING ====================

    /// Add a WHERE condition. Conditions are ANDed together.
    pub fn filter(mut self, pred: impl Into<FragmentRef>) -> Self {
        self.where_parts.push(pred.into());
        self
    }

    /// Add a HAVING condition. Conditions are ANDed together.
    pub fn having(mut self, pred: impl Into<FragmentRef>) -> Self {
        self.having_parts.push(pred.into());
        self
    }

    /// Add a HAVING condition with `?` placeholders.
    pub fn having_sql(self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.having(Expr::new(sql, args))
    }

    // ==================== UNION ====================

    /// Add a `UNION` part (a sub-select or any other fragment).
    pub fn union(mut self, part: impl Into<FragmentRef>) -> Self {
        self.unions.push(part.into());
        self
    }

    /// Add a `UNION ALL` part.
    pub fn union_all(mut self, part: impl Into<FragmentRef>) -> Self {
        self.union_alls.push(part.into());
        self
    }

    // ==================== GROUP / ORDER / LIMIT ====================

    /// Add GROUP BY expressions.
    pub fn group_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_bys.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Add ORDER BY expressions.
    pub fn order_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_bys.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Add an expression to the end of the statement.
    pub fn suffix(mut self, sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        self.suffixes.push(Expr::new(sql, args).into());
        self
    }

    /// Turn this query into `count(1) as <alias>` over the same rows.
    ///
    /// Drops ORDER BY, LIMIT and OFFSET.
    pub fn count(mut self, alias: &str) -> Self {
        self.columns = vec![Expr::raw(format!("count(1) as {alias}")).into()];
        self.order_bys.clear();
        self.limit = None;
        self.offset = None;
        self
    }
}

impl_where_shortcuts!(Select);

impl Fragment for Select {
    fn render(&self) -> SqlResult<Rendered> {
        if self.columns.is_empty() {
            return Err(SqlError::validation(
                "select statements must have at least one result column",
            ));
        }

        let mut out = Rendered::default();
        append_prefixes(&mut out, &self.prefixes)?;

        out.sql.push_str("SELECT ");
        if self.distinct {
            out.sql.push_str("DISTINCT ");
        }
        if !self.options.is_empty() {
            out.sql.push_str(&self.options.join(" "));
            out.sql.push(' ');
        }

        let columns = join_rendered(&self.columns, ", ")?;
        out.sql.push_str(&columns.sql);
        out.args.extend(columns.args);

        append_clause(&mut out, " FROM ", &self.from_parts, ", ")?;
        append_clause(&mut out, " ", &self.joins, " ")?;
        append_clause(&mut out, " WHERE ", &self.where_parts, " AND ")?;
        append_clause(&mut out, " UNION ", &self.unions, " UNION ")?;
        append_clause(&mut out, " UNION ALL ", &self.union_alls, " UNION ALL ")?;
        append_list(&mut out, " GROUP BY ", &self.group_bys);
        append_clause(&mut out, " HAVING ", &self.having_parts, " AND ")?;
        append_list(&mut out, " ORDER BY ", &self.order_bys);
        append_limit_offset(&mut out, self.limit, self.offset);
        append_clause(&mut out, " ", &self.suffixes, " ")?;

        Ok(out)
    }
}
