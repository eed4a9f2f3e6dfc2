//! The fragment contract shared by every composable piece.

use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

use crate::error::{SqlError, SqlResult};
use crate::placeholder::count_placeholders;
use crate::value::Value;

/// A composable piece of SQL.
///
/// `render()` is a pure function of the fragment's constructed state: it
/// performs no I/O and returns identical output on every call. On success the
/// number of unresolved `?` marks in the text equals the number of args.
/// On failure nothing of the partial output may be used.
pub trait Fragment: Send + Sync + fmt::Debug {
    fn render(&self) -> SqlResult<Rendered>;
}

/// SQL text with generic `?` marks plus the args bound to them, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Rendered {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Text without any bound args.
    pub fn sql_only(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Number of unresolved generic marks in the text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// A shared, immutable handle to any fragment.
///
/// Cloning shares the underlying fragment; fragment trees are never mutated
/// after construction, so the same handle can be rendered from many threads.
#[derive(Clone)]
pub struct FragmentRef(Arc<dyn Fragment>);

impl FragmentRef {
    pub fn new<F: Fragment + 'static>(fragment: F) -> Self {
        FragmentRef(Arc::new(fragment))
    }

    pub fn render(&self) -> SqlResult<Rendered> {
        self.0.render()
    }
}

impl fmt::Debug for FragmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<F: Fragment + 'static> From<F> for FragmentRef {
    fn from(fragment: F) -> Self {
        FragmentRef::new(fragment)
    }
}

/// One positional argument supplied to a template: either a value bound
/// as-is, or a fragment spliced into the text at its mark.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Fragment(FragmentRef),
}

impl Arg {
    pub fn is_fragment(&self) -> bool {
        matches!(self, Arg::Fragment(_))
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<FragmentRef> for Arg {
    fn from(f: FragmentRef) -> Self {
        Arg::Fragment(f)
    }
}

impl<F: Fragment + 'static> From<F> for Arg {
    fn from(f: F) -> Self {
        Arg::Fragment(FragmentRef::new(f))
    }
}

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Value(v.into())
    }
}

macro_rules! impl_arg_from_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(Value::from(v))
                }
            }
        )+
    };
}

impl_arg_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    &[u8],
    serde_json::Value,
    uuid::Uuid,
    chrono::DateTime<chrono::Utc>,
);

macro_rules! impl_arg_try_from_unsigned {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<$ty> for Arg {
                type Error = SqlError;

                fn try_from(v: $ty) -> SqlResult<Self> {
                    Value::try_from(v).map(Arg::Value)
                }
            }
        )+
    };
}

impl_arg_try_from_unsigned!(u64, usize);

/// Build a `Vec<Arg>` from values and fragments.
///
/// ```ignore
/// let e = Expr::new("FROM_UNIXTIME(?) + ?", args![ts, Expr::raw("interval '1 day'")]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}
