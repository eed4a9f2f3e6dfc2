//! Combinators that join child fragments: AND / OR groups, raw concatenation
//! and function calls.

use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, FragmentRef, Rendered};

/// Render `children` in order and join the non-empty ones with `sep`.
///
/// Children rendering to empty text contribute neither text nor args. Stops at
/// the first child error.
pub(crate) fn join_rendered(children: &[FragmentRef], sep: &str) -> SqlResult<Rendered> {
    let mut out = Rendered::default();
    let mut first = true;
    for child in children {
        let part = child.render()?;
        if part.is_empty() {
            continue;
        }
        if !first {
            out.sql.push_str(sep);
        }
        first = false;
        out.sql.push_str(&part.sql);
        out.args.extend(part.args);
    }
    Ok(out)
}

fn group(children: &[FragmentRef], sep: &str) -> SqlResult<Rendered> {
    let mut joined = join_rendered(children, sep)?;
    if !joined.is_empty() {
        joined.sql = format!("({})", joined.sql);
    }
    Ok(joined)
}

/// `(<a> AND <b> ...)`; renders nothing when every child is empty.
#[derive(Debug, Clone, Default)]
pub struct And(Vec<FragmentRef>);

impl And {
    pub fn new<I, F>(children: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FragmentRef>,
    {
        And(children.into_iter().map(Into::into).collect())
    }

    /// Append one more child (consuming).
    pub fn and(mut self, child: impl Into<FragmentRef>) -> Self {
        self.0.push(child.into());
        self
    }
}

impl Fragment for And {
    fn render(&self) -> SqlResult<Rendered> {
        group(&self.0, " AND ")
    }
}

/// `(<a> OR <b> ...)`; renders nothing when every child is empty.
#[derive(Debug, Clone, Default)]
pub struct Or(Vec<FragmentRef>);

impl Or {
    pub fn new<I, F>(children: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FragmentRef>,
    {
        Or(children.into_iter().map(Into::into).collect())
    }

    /// Append one more child (consuming).
    pub fn or(mut self, child: impl Into<FragmentRef>) -> Self {
        self.0.push(child.into());
        self
    }
}

impl Fragment for Or {
    fn render(&self) -> SqlResult<Rendered> {
        group(&self.0, " OR ")
    }
}

/// One piece of a [`Concat`].
#[derive(Debug, Clone)]
pub enum Segment {
    Text(String),
    Fragment(FragmentRef),
}

impl Segment {
    /// Build a text segment from untyped JSON input.
    ///
    /// Anything but a JSON string fails with [`SqlError::InvalidSegment`].
    pub fn from_json(value: serde_json::Value) -> SqlResult<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Segment::Text(s)),
            other => Err(SqlError::InvalidSegment(format!(
                "{other} is not a string or fragment"
            ))),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Text(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Text(s)
    }
}

impl From<FragmentRef> for Segment {
    fn from(f: FragmentRef) -> Self {
        Segment::Fragment(f)
    }
}

impl<F: Fragment + 'static> From<F> for Segment {
    fn from(f: F) -> Self {
        Segment::Fragment(FragmentRef::new(f))
    }
}

/// Raw text and fragments glued together verbatim, in order.
///
/// # Example
/// ```ignore
/// let name = Expr::new("CONCAT(?, ' ', ?)", args![first, last]);
/// let e = Concat::new(["COALESCE(full_name, ".into(), name.into(), ")".into()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Concat(Vec<Segment>);

impl Concat {
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Self {
        Concat(segments.into_iter().collect())
    }

    pub fn push(mut self, segment: impl Into<Segment>) -> Self {
        self.0.push(segment.into());
        self
    }
}

impl Fragment for Concat {
    fn render(&self) -> SqlResult<Rendered> {
        let mut out = Rendered::default();
        for segment in &self.0 {
            match segment {
                Segment::Text(s) => out.sql.push_str(s),
                Segment::Fragment(f) => {
                    let part = f.render()?;
                    out.sql.push_str(&part.sql);
                    out.args.extend(part.args);
                }
            }
        }
        Ok(out)
    }
}

/// `<name>(<arg1>, <arg2>, ...)` where every argument is a fragment.
#[derive(Debug, Clone)]
pub struct Func {
    name: String,
    args: Vec<FragmentRef>,
}

impl Func {
    pub fn new<I, F>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FragmentRef>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Fragment for Func {
    fn render(&self) -> SqlResult<Rendered> {
        let mut out = Rendered::sql_only(format!("{}(", self.name));
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.sql.push_str(", ");
            }
            let part = arg.render()?;
            out.sql.push_str(&part.sql);
            out.args.extend(part.args);
        }
        out.sql.push(')');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::expr::Expr;
    use crate::predicate::Predicate;
    use crate::value::Value;

    #[derive(Debug)]
    struct Failing;

    impl Fragment for Failing {
        fn render(&self) -> SqlResult<Rendered> {
            Err(SqlError::Other("child failed".into()))
        }
    }

    #[test]
    fn and_group() {
        let r = And::new([
            Expr::new("a > ?", args![15]),
            Expr::new("b < ?", args![20]),
            Expr::raw("c IS TRUE"),
        ])
        .render()
        .unwrap();
        assert_eq!(r.sql, "(a > ? AND b < ? AND c IS TRUE)");
        assert_eq!(r.args, vec![Value::Int(15), Value::Int(20)]);
    }

    #[test]
    fn or_group_skips_empty_children() {
        let r = Or::new([
            Expr::raw(""),
            Expr::new("a = ?", args![1]),
            Expr::new("", args![99]),
            Expr::new("b = ?", args![2]),
        ])
        .render()
        .unwrap();
        assert_eq!(r.sql, "(a = ? OR b = ?)");
        assert_eq!(r.args, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn empty_group_renders_nothing() {
        let r = And::default().render().unwrap();
        assert_eq!(r, Rendered::default());

        let r = Or::new([Expr::raw("")]).render().unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn nested_groups() {
        let r = And::new([FragmentRef::new(Predicate::eq([("x", 1)]))])
            .and(Or::new([Expr::raw("y"), Expr::raw("z")]))
            .render()
            .unwrap();
        assert_eq!(r.sql, "(x = ? AND (y OR z))");
        assert_eq!(r.args, vec![Value::Int(1)]);
    }

    #[test]
    fn group_short_circuits_on_child_error() {
        let group = And::new([FragmentRef::new(Expr::raw("a")), FragmentRef::new(Failing)]);
        assert_eq!(
            group.render().unwrap_err(),
            SqlError::Other("child failed".into())
        );
    }

    #[test]
    fn concat_mixes_text_and_fragments() {
        let name = Expr::new("CONCAT(?, ' ', ?)", args!["John", "Doe"]);
        let r = Concat::new(["COALESCE(full_name, ".into(), name.into(), ")".into()])
            .render()
            .unwrap();
        assert_eq!(r.sql, "COALESCE(full_name, CONCAT(?, ' ', ?))");
        assert_eq!(
            r.args,
            vec![Value::Text("John".into()), Value::Text("Doe".into())]
        );
    }

    #[test]
    fn concat_of_bare_marks_keeps_parity() {
        use crate::literal::Array;
        use crate::placeholder::PlaceholderFormat;

        let r = Concat::new([
            Segment::from(Expr::new("?", args![1])),
            Segment::from(Expr::new("?", args![2])),
        ])
        .render()
        .unwrap();
        assert_eq!(r.sql, "??");
        assert_eq!(r.placeholder_count(), 2);
        assert_eq!(r.args, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(PlaceholderFormat::DOLLAR.replace_placeholders(&r.sql), "$1$2");

        let r = Concat::default()
            .push(Array::new(vec![1]))
            .push(Array::new(vec![2]))
            .render()
            .unwrap();
        assert_eq!(r.placeholder_count(), r.args.len());
    }

    #[test]
    fn concat_propagates_errors() {
        let c = Concat::default().push("x").push(Failing);
        assert!(c.render().is_err());
    }

    #[test]
    fn segment_from_untyped_input() {
        assert!(matches!(
            Segment::from_json(serde_json::json!("abc")),
            Ok(Segment::Text(s)) if s == "abc"
        ));
        let err = Segment::from_json(serde_json::json!(42)).unwrap_err();
        assert!(matches!(err, SqlError::InvalidSegment(_)));
    }

    #[test]
    fn func_call() {
        let r = Func::new(
            "COALESCE",
            [
                FragmentRef::new(Expr::raw("nickname")),
                FragmentRef::new(Expr::new("?", args!["anon"])),
            ],
        )
        .render()
        .unwrap();
        assert_eq!(r.sql, "COALESCE(nickname, ?)");
        assert_eq!(r.args, vec![Value::Text("anon".into())]);

        let r = Func::new("now", Vec::<FragmentRef>::new()).render().unwrap();
        assert_eq!(r.sql, "now()");
    }
}
