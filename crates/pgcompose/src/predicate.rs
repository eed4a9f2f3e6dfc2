//! Column → value predicates (`=`, `<>`, `<`, `<=`, `>`, `>=`).
//!
//! A [`Predicate`] snapshots its entries in construction order, so rendering
//! the same predicate twice always yields the same clause order, even when it
//! was built from a `HashMap`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Rendered};
use crate::placeholder::placeholders;
use crate::value::{ToValue, Value};

/// The right-hand side of a predicate entry.
#[derive(Debug, Clone)]
pub enum Operand {
    Null,
    Scalar(Value),
    List(Vec<Value>),
    /// Resolved through [`ToValue`] when the predicate renders.
    Deferred(Arc<dyn ToValue>),
}

impl Operand {
    pub fn deferred(value: impl ToValue + 'static) -> Self {
        Operand::Deferred(Arc::new(value))
    }

    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }

    fn resolve(&self) -> SqlResult<Resolved<'_>> {
        Ok(match self {
            Operand::Null => Resolved::Null,
            Operand::Scalar(v) if v.is_null() => Resolved::Null,
            Operand::Scalar(v) => Resolved::Scalar(Cow::Borrowed(v)),
            Operand::List(values) => Resolved::List(values),
            Operand::Deferred(wrapper) => match wrapper.to_value()? {
                Value::Null => Resolved::Null,
                v => Resolved::Scalar(Cow::Owned(v)),
            },
        })
    }
}

enum Resolved<'a> {
    Null,
    Scalar(Cow<'a, Value>),
    List(&'a [Value]),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        if v.is_null() {
            Operand::Null
        } else {
            Operand::Scalar(v)
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::from(Value::from(v))
    }
}

macro_rules! impl_operand_try_from_unsigned {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<$ty> for Operand {
                type Error = SqlError;

                fn try_from(v: $ty) -> SqlResult<Self> {
                    Value::try_from(v).map(Operand::Scalar)
                }
            }
        )+
    };
}

impl_operand_try_from_unsigned!(u64, usize);

/// Element types that turn a `Vec`, array or slice into an `IN (...)` list.
///
/// `u8` is left out: byte buffers bind as one `bytea` value.
pub trait ListElement: Into<Value> {}

macro_rules! impl_list_element {
    ($($ty:ty),+ $(,)?) => {
        $(impl ListElement for $ty {})+
    };
}

impl_list_element!(
    Value,
    bool,
    i8,
    i16,
    i32,
    i64,
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

impl<T: ListElement> ListElement for Option<T> {}

impl<T: ListElement> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Operand::list(values)
    }
}

impl<T: ListElement, const N: usize> From<[T; N]> for Operand {
    fn from(values: [T; N]) -> Self {
        Operand::list(values)
    }
}

impl<T: ListElement + Clone> From<&[T]> for Operand {
    fn from(values: &[T]) -> Self {
        Operand::list(values.iter().cloned())
    }
}

impl From<Vec<u8>> for Operand {
    fn from(bytes: Vec<u8>) -> Self {
        Operand::Scalar(Value::Bytes(bytes))
    }
}

impl From<&[u8]> for Operand {
    fn from(bytes: &[u8]) -> Self {
        Operand::Scalar(Value::Bytes(bytes.to_vec()))
    }
}

impl<const N: usize> From<[u8; N]> for Operand {
    fn from(bytes: [u8; N]) -> Self {
        Operand::Scalar(Value::Bytes(bytes.to_vec()))
    }
}

macro_rules! impl_operand_from_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Scalar(Value::from(v))
                }
            }
        )+
    };
}

impl_operand_from_scalar!(
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
    serde_json::Value,
    uuid::Uuid,
    chrono::DateTime<chrono::Utc>,
);

/// Comparison operator applied to every entry of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    LtOrEq,
    Gt,
    GtOrEq,
}

impl Comparison {
    fn is_equality(self) -> bool {
        matches!(self, Comparison::Eq | Comparison::NotEq)
    }

    fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::NotEq => "<>",
            Comparison::Lt => "<",
            Comparison::LtOrEq => "<=",
            Comparison::Gt => ">",
            Comparison::GtOrEq => ">=",
        }
    }
}

/// A map of column → operand rendered as clauses joined by `AND`.
///
/// Equality (`Eq` / `NotEq`) branches on the operand:
/// - NULL: `col IS NULL` / `col IS NOT NULL`
/// - empty list: `(1=0)` / `(1=1)`
/// - list: `col IN (?,?)` / `col NOT IN (?,?)`
/// - scalar: `col = ?` / `col <> ?`
///
/// Ordering comparisons accept scalars only; NULL or a list fails with
/// [`SqlError::UnrenderableValue`].
///
/// # Example
/// ```ignore
/// let p = Predicate::eq([("id", Operand::from(vec![1, 2, 3]))])
///     .with("deleted_at", None::<i64>);
/// // id IN (?,?,?) AND deleted_at IS NULL
/// ```
#[derive(Debug, Clone)]
pub struct Predicate {
    comparison: Comparison,
    entries: Vec<(String, Operand)>,
    /// Column → position in `entries`.
    index: HashMap<String, usize>,
}

impl Predicate {
    pub fn new<I, K, V>(comparison: Comparison, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        entries.into_iter().fold(
            Self {
                comparison,
                entries: Vec::new(),
                index: HashMap::new(),
            },
            |p, (k, v)| p.with(k, v),
        )
    }

    pub fn eq<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        Self::new(Comparison::Eq, entries)
    }

    pub fn not_eq<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        Self::new(Comparison::NotEq, entries)
    }

    pub fn lt<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        Self::new(Comparison::Lt, entries)
    }

    pub fn lt_or_eq<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        Self::new(Comparison::LtOrEq, entries)
    }

    pub fn gt<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        Self::new(Comparison::Gt, entries)
    }

    pub fn gt_or_eq<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        Self::new(Comparison::GtOrEq, entries)
    }

    /// Add an entry; a repeated key replaces the earlier value in place.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Operand>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.index.get(&column) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(column.clone(), self.entries.len());
                self.entries.push((column, value));
            }
        }
        self
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn render_equality(&self, column: &str, operand: Resolved<'_>, out: &mut Rendered) {
        let negated = self.comparison == Comparison::NotEq;
        match operand {
            Resolved::Null => {
                let op = if negated { "IS NOT" } else { "IS" };
                out.sql.push_str(&format!("{column} {op} NULL"));
            }
            Resolved::List([]) => {
                out.sql.push_str(if negated { "(1=1)" } else { "(1=0)" });
            }
            Resolved::List(values) => {
                let op = if negated { "NOT IN" } else { "IN" };
                out.sql
                    .push_str(&format!("{column} {op} ({})", placeholders(values.len())));
                out.args.extend(values.iter().cloned());
            }
            Resolved::Scalar(v) => {
                out.sql
                    .push_str(&format!("{column} {} ?", self.comparison.operator()));
                out.args.push(v.into_owned());
            }
        }
    }

    fn render_ordering(
        &self,
        column: &str,
        operand: Resolved<'_>,
        out: &mut Rendered,
    ) -> SqlResult<()> {
        match operand {
            Resolved::Null => Err(SqlError::unrenderable(
                column,
                "cannot use null with less than or greater than operators",
            )),
            Resolved::List(_) => Err(SqlError::unrenderable(
                column,
                "cannot use array or slice with less than or greater than operators",
            )),
            Resolved::Scalar(v) => {
                out.sql
                    .push_str(&format!("{column} {} ?", self.comparison.operator()));
                out.args.push(v.into_owned());
                Ok(())
            }
        }
    }
}

impl Fragment for Predicate {
    fn render(&self) -> SqlResult<Rendered> {
        let mut out = Rendered::default();
        for (i, (column, operand)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.sql.push_str(" AND ");
            }
            let operand = operand.resolve()?;
            if self.comparison.is_equality() {
                self.render_equality(column, operand, &mut out);
            } else {
                self.render_ordering(column, operand, &mut out)?;
            }
        }
        Ok(out)
    }
}
