//! Raw SQL templates and the thin wrappers built on top of them.
//!
//! [`Expr`] is the template expander: a SQL string with `?` marks plus
//! positional args. An arg that is itself a fragment is rendered and spliced
//! in place of its mark, and its own args take that position in the list.

use crate::error::SqlResult;
use crate::fragment::{Arg, Fragment, FragmentRef, Rendered};
use crate::placeholder::MARK;
use crate::value::Value;

/// A raw SQL template with positional args.
///
/// # Example
/// ```ignore
/// use pgcompose::{args, Expr};
///
/// let sub = Expr::raw("SELECT max(id) FROM t");
/// let e = Expr::new("id = (?) AND kind = ?", args![sub, "a"]);
/// // id = (SELECT max(id) FROM t) AND kind = ?   args: ["a"]
/// ```
#[derive(Debug, Clone)]
pub struct Expr {
    sql: String,
    args: Vec<Arg>,
}

impl Expr {
    pub fn new(sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        Self {
            sql: sql.into(),
            args: args.into_iter().collect(),
        }
    }

    /// A template without args.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// All args as plain values, or `None` when at least one is a fragment.
    fn plain_values(&self) -> Option<Vec<Value>> {
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Value(v) => Some(v.clone()),
                Arg::Fragment(_) => None,
            })
            .collect()
    }
}

impl Fragment for Expr {
    fn render(&self) -> SqlResult<Rendered> {
        if let Some(args) = self.plain_values() {
            return Ok(Rendered::new(self.sql.clone(), args));
        }

        let mut sql = String::with_capacity(self.sql.len());
        let mut args = Vec::with_capacity(self.args.len());
        let mut rest = self.sql.as_str();
        let mut position = 0usize;

        while let Some(pos) = rest.find(MARK) {
            sql.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];

            match self.args.get(position) {
                // More marks than args: the mark is left unresolved, which
                // breaks mark/arg parity for the whole template.
                None => sql.push(MARK),
                Some(Arg::Value(v)) => {
                    sql.push(MARK);
                    args.push(v.clone());
                }
                Some(Arg::Fragment(fragment)) => {
                    let nested = fragment.render()?;
                    sql.push_str(&nested.sql);
                    args.extend(nested.args);
                }
            }
            position += 1;
        }
        sql.push_str(rest);

        Ok(Rendered::new(sql, args))
    }
}

/// `(<fragment>) AS <alias>`
#[derive(Debug, Clone)]
pub struct Alias {
    fragment: FragmentRef,
    alias: String,
}

impl Alias {
    pub fn new(fragment: impl Into<FragmentRef>, alias: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            alias: alias.into(),
        }
    }
}

impl Fragment for Alias {
    fn render(&self) -> SqlResult<Rendered> {
        let inner = self.fragment.render()?;
        Ok(Rendered::new(
            format!("({}) AS {}", inner.sql, self.alias),
            inner.args,
        ))
    }
}

/// `LATERAL (<fragment>) AS <alias>`
#[derive(Debug, Clone)]
pub struct Lateral {
    fragment: FragmentRef,
    alias: String,
}

impl Lateral {
    pub fn new(fragment: impl Into<FragmentRef>, alias: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            alias: alias.into(),
        }
    }
}

impl Fragment for Lateral {
    fn render(&self) -> SqlResult<Rendered> {
        let inner = self.fragment.render()?;
        Ok(Rendered::new(
            format!("LATERAL ({}) AS {}", inner.sql, self.alias),
            inner.args,
        ))
    }
}

/// `<column> BETWEEN ? AND ?`
#[derive(Debug, Clone)]
pub struct Between {
    column: String,
    low: Value,
    high: Value,
}

impl Between {
    pub fn new(column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            low: low.into(),
            high: high.into(),
        }
    }
}

impl Fragment for Between {
    fn render(&self) -> SqlResult<Rendered> {
        Ok(Rendered::new(
            format!("{} BETWEEN ? AND ?", self.column),
            vec![self.low.clone(), self.high.clone()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::error::SqlError;
    use crate::literal::Array;

    #[derive(Debug)]
    struct Failing;

    impl Fragment for Failing {
        fn render(&self) -> SqlResult<Rendered> {
            Err(SqlError::Other("boom".into()))
        }
    }

    #[test]
    fn plain_args_pass_through() {
        let r = Expr::new("a = ? AND b = ?", args![1, "x"]).render().unwrap();
        assert_eq!(r.sql, "a = ? AND b = ?");
        assert_eq!(r.args, vec![Value::Int(1), Value::Text("x".into())]);
    }

    #[test]
    fn splices_nested_fragment() {
        let r = Expr::new("(?) AS foo", args![Expr::raw("SELECT 1")])
            .render()
            .unwrap();
        assert_eq!(r.sql, "(SELECT 1) AS foo");
        assert!(r.args.is_empty());
    }

    #[test]
    fn nested_args_take_their_mark_position() {
        let inner = Expr::new("SELECT id FROM t WHERE k = ?", args!["k"]);
        let r = Expr::new("a = ? AND b IN (?) AND c = ?", args![1, inner, 3])
            .render()
            .unwrap();
        assert_eq!(r.sql, "a = ? AND b IN (SELECT id FROM t WHERE k = ?) AND c = ?");
        assert_eq!(
            r.args,
            vec![Value::Int(1), Value::Text("k".into()), Value::Int(3)]
        );
        assert_eq!(r.placeholder_count(), r.args.len());
    }

    #[test]
    fn literal_encoder_as_arg() {
        let r = Expr::new("tags = ?", args![Array::new(vec!["a", "b"])])
            .render()
            .unwrap();
        assert_eq!(r.sql, "tags = ?");
        assert_eq!(r.args, vec![Value::Text(r#"{"a","b"}"#.into())]);
    }

    #[test]
    fn extra_marks_stay_unresolved() {
        let r = Expr::new("? ? ?", args![Expr::raw("x")]).render().unwrap();
        assert_eq!(r.sql, "x ? ?");
        assert!(r.args.is_empty());
    }

    #[test]
    fn adjacent_marks_each_take_an_arg() {
        let r = Expr::new("??", args![Expr::new("?", args![1]), 2])
            .render()
            .unwrap();
        assert_eq!(r.sql, "??");
        assert_eq!(r.args, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(r.placeholder_count(), 2);
    }

    #[test]
    fn nested_error_propagates_unchanged() {
        let err = Expr::new("? AND ?", args![Failing, 1]).render().unwrap_err();
        assert_eq!(err, SqlError::Other("boom".into()));
    }

    #[test]
    fn render_is_repeatable() {
        let e = Expr::new("x = ?", args![Expr::new("lower(?)", args!["A"])]);
        assert_eq!(e.render().unwrap(), e.render().unwrap());
    }

    #[test]
    fn alias_and_lateral() {
        let sub = Expr::new("SELECT a FROM b WHERE c = ?", args![1]);
        let r = Alias::new(sub.clone(), "x").render().unwrap();
        assert_eq!(r.sql, "(SELECT a FROM b WHERE c = ?) AS x");
        assert_eq!(r.args, vec![Value::Int(1)]);

        let r = Lateral::new(sub, "y").render().unwrap();
        assert_eq!(r.sql, "LATERAL (SELECT a FROM b WHERE c = ?) AS y");
    }

    #[test]
    fn between_binds_two_args() {
        let r = Between::new("id", 1, 5).render().unwrap();
        assert_eq!(r.sql, "id BETWEEN ? AND ?");
        assert_eq!(r.args, vec![Value::Int(1), Value::Int(5)]);
    }
}
