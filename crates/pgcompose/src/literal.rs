//! Literal encoders: values that travel as a single bound text parameter.
//!
//! - [`Array`] encodes (nested) sequences as a PostgreSQL array literal,
//!   e.g. `{{1,2},{3,4}}` or `{"a","b\"c"}`.
//! - [`Json`] serializes any `Serialize` value and casts the mark to
//!   `json` / `jsonb`.
//! - [`Any`] renders `<column> = ANY(?)` on top of an [`Array`].

use serde::Serialize;
use std::fmt;

use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, FragmentRef, Rendered};
use crate::value::Value;

/// Kind of the scalars at the bottom of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    Text,
    Number,
}

/// Shape reported by an [`ArrayElement`] after encoding itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar(Leaf),
    /// `leaf` stays `None` while no scalar has been seen below this level.
    Sequence { depth: usize, leaf: Option<Leaf> },
}

/// Something that can appear inside an array literal.
///
/// Implemented for strings, integers, floats, slices / `Vec` / arrays of
/// elements, and `serde_json::Value` (checked element by element at render
/// time).
pub trait ArrayElement {
    /// Append the literal text to `out` and report the shape written.
    fn encode(&self, out: &mut String) -> SqlResult<Shape>;
}

fn mixed(a: Shape, b: Shape) -> SqlError {
    SqlError::type_mismatch(format!("array elements are not homogeneous: {a:?} vs {b:?}"))
}

fn merge(a: Shape, b: Shape) -> SqlResult<Shape> {
    match (a, b) {
        (Shape::Scalar(x), Shape::Scalar(y)) if x == y => Ok(a),
        (
            Shape::Sequence { depth: da, leaf: la },
            Shape::Sequence { depth: db, leaf: lb },
        ) => match (la, lb) {
            (Some(x), Some(y)) if x == y && da == db => Ok(a),
            (None, None) => Ok(Shape::Sequence {
                depth: da.max(db),
                leaf: None,
            }),
            // An empty sub-array fits anywhere at or above the leaf depth.
            (None, Some(_)) if da <= db => Ok(b),
            (Some(_), None) if db <= da => Ok(a),
            _ => Err(mixed(a, b)),
        },
        _ => Err(mixed(a, b)),
    }
}

/// Encode `items` as `{a,b,...}`, checking that all items share one shape.
pub fn encode_sequence<'a, T, I>(items: I, out: &mut String) -> SqlResult<Shape>
where
    T: ArrayElement + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    out.push('{');
    let mut merged: Option<Shape> = None;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let shape = item.encode(out)?;
        merged = Some(match merged {
            None => shape,
            Some(prev) => merge(prev, shape)?,
        });
    }
    out.push('}');

    Ok(match merged {
        None => Shape::Sequence {
            depth: 1,
            leaf: None,
        },
        Some(Shape::Scalar(leaf)) => Shape::Sequence {
            depth: 1,
            leaf: Some(leaf),
        },
        Some(Shape::Sequence { depth, leaf }) => Shape::Sequence {
            depth: depth + 1,
            leaf,
        },
    })
}

fn encode_text(s: &str, out: &mut String) -> Shape {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    Shape::Scalar(Leaf::Text)
}

fn encode_float(v: f64, out: &mut String) -> Shape {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        out.push_str(&v.to_string());
    }
    Shape::Scalar(Leaf::Number)
}

impl ArrayElement for str {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        Ok(encode_text(self, out))
    }
}

impl ArrayElement for String {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        Ok(encode_text(self, out))
    }
}

macro_rules! impl_array_element_int {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ArrayElement for $ty {
                fn encode(&self, out: &mut String) -> SqlResult<Shape> {
                    out.push_str(&self.to_string());
                    Ok(Shape::Scalar(Leaf::Number))
                }
            }
        )+
    };
}

impl_array_element_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ArrayElement for f32 {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        if self.is_finite() {
            // Display on f32 keeps the short form (1.5, not 1.5000000).
            out.push_str(&self.to_string());
            Ok(Shape::Scalar(Leaf::Number))
        } else {
            Ok(encode_float(f64::from(*self), out))
        }
    }
}

impl ArrayElement for f64 {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        Ok(encode_float(*self, out))
    }
}

impl<T: ArrayElement + ?Sized> ArrayElement for &T {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        (**self).encode(out)
    }
}

impl<T: ArrayElement> ArrayElement for [T] {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        encode_sequence(self, out)
    }
}

impl<T: ArrayElement, const N: usize> ArrayElement for [T; N] {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        encode_sequence(self.as_slice(), out)
    }
}

impl<T: ArrayElement> ArrayElement for Vec<T> {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        encode_sequence(self.as_slice(), out)
    }
}

impl ArrayElement for serde_json::Value {
    fn encode(&self, out: &mut String) -> SqlResult<Shape> {
        use serde_json::Value as J;
        match self {
            J::String(s) => Ok(encode_text(s, out)),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    out.push_str(&i.to_string());
                } else if let Some(u) = n.as_u64() {
                    out.push_str(&u.to_string());
                } else {
                    let f = n.as_f64().ok_or_else(|| {
                        SqlError::type_mismatch(format!("unsupported JSON number {n}"))
                    })?;
                    return Ok(encode_float(f, out));
                }
                Ok(Shape::Scalar(Leaf::Number))
            }
            J::Array(items) => encode_sequence(items.as_slice(), out),
            J::Null => Err(SqlError::type_mismatch("null is not a valid array element")),
            J::Bool(_) => Err(SqlError::type_mismatch("bool is not a valid array element")),
            J::Object(_) => Err(SqlError::type_mismatch(
                "object is not a valid array element",
            )),
        }
    }
}

/// A (possibly nested) sequence bound as one array-literal parameter.
///
/// Renders the text `?` with a single [`Value::Text`] arg holding the literal.
///
/// # Example
/// ```ignore
/// Array::new(vec![vec![1, 2], vec![3, 4]]) // arg: "{{1,2},{3,4}}"
/// Array::new(vec!["foo", "\"quoted\""])   // arg: r#"{"foo","\"quoted\""}"#
/// ```
#[derive(Debug, Clone)]
pub struct Array<T> {
    value: T,
}

impl<T: ArrayElement> Array<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// The encoded literal. Fails with [`SqlError::TypeMismatch`] when the
    /// value is not a sequence or mixes element kinds or depths.
    pub fn literal(&self) -> SqlResult<String> {
        let mut out = String::new();
        match self.value.encode(&mut out)? {
            Shape::Scalar(_) => Err(SqlError::type_mismatch(
                "array literal requires a sequence, got a scalar",
            )),
            Shape::Sequence { .. } => Ok(out),
        }
    }
}

impl<T: ArrayElement + fmt::Debug + Send + Sync> Fragment for Array<T> {
    fn render(&self) -> SqlResult<Rendered> {
        Ok(Rendered::new("?", vec![Value::Text(self.literal()?)]))
    }
}

/// Target type of a [`Json`] literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Json,
    Jsonb,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Json => "json",
            JsonType::Jsonb => "jsonb",
        }
    }
}

/// A serializable value bound as JSON text: `?::json` or `?::jsonb`.
#[derive(Debug, Clone)]
pub struct Json<T> {
    value: T,
    ty: JsonType,
}

impl<T: Serialize> Json<T> {
    pub fn json(value: T) -> Self {
        Self {
            value,
            ty: JsonType::Json,
        }
    }

    pub fn jsonb(value: T) -> Self {
        Self {
            value,
            ty: JsonType::Jsonb,
        }
    }
}

impl<T: Serialize + fmt::Debug + Send + Sync> Fragment for Json<T> {
    fn render(&self) -> SqlResult<Rendered> {
        let ty = self.ty.as_str();
        let text = serde_json::to_string(&self.value)
            .map_err(|e| SqlError::Encoding(format!("failed to serialize {ty} value: {e}")))?;
        Ok(Rendered::new(format!("?::{ty}"), vec![Value::Text(text)]))
    }
}

/// `<column> = ANY(?)` with the collection bound as an array literal.
#[derive(Debug, Clone)]
pub struct Any {
    column: String,
    array: FragmentRef,
}

impl Any {
    pub fn new<T>(column: impl Into<String>, values: T) -> Self
    where
        T: ArrayElement + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            column: column.into(),
            array: FragmentRef::new(Array::new(values)),
        }
    }
}

impl Fragment for Any {
    fn render(&self) -> SqlResult<Rendered> {
        let array = self.array.render()?;
        Ok(Rendered::new(
            format!("{} = ANY({})", self.column, array.sql),
            array.args,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn literal_of<T: ArrayElement + fmt::Debug + Send + Sync>(value: T) -> String {
        let r = Array::new(value).render().unwrap();
        assert_eq!(r.sql, "?");
        assert_eq!(r.args.len(), 1);
        match &r.args[0] {
            Value::Text(s) => s.clone(),
            other => panic!("unexpected arg {other:?}"),
        }
    }

    #[test]
    fn valid_arrays() {
        assert_eq!(literal_of(Vec::<String>::new()), "{}");
        assert_eq!(literal_of(Vec::<i32>::new()), "{}");
        assert_eq!(literal_of(Vec::<f32>::new()), "{}");
        assert_eq!(literal_of(Vec::<f64>::new()), "{}");
        assert_eq!(literal_of(Vec::<Vec<i32>>::new()), "{}");
        assert_eq!(
            literal_of(vec!["foo", "bar", "\"quoted\""]),
            r#"{"foo","bar","\"quoted\""}"#
        );
        assert_eq!(literal_of(vec![6, 7, 42]), "{6,7,42}");
        assert_eq!(literal_of(vec![6u8, 7, 42]), "{6,7,42}");
        assert_eq!(literal_of(vec![vec![1, 2], vec![3, 4]]), "{{1,2},{3,4}}");
        assert_eq!(literal_of([[1, 2], [3, 4]]), "{{1,2},{3,4}}");
        assert_eq!(literal_of(vec![1.5f32, 2.0, 3.0]), "{1.5,2,3}");
        assert_eq!(literal_of(vec![1.5f64, 2.0, 3.0]), "{1.5,2,3}");
    }

    #[test]
    fn backslashes_are_escaped() {
        assert_eq!(literal_of(vec![r"a\b"]), r#"{"a\\b"}"#);
    }

    #[test]
    fn empty_inner_levels() {
        assert_eq!(literal_of(vec![Vec::<i32>::new(), vec![]]), "{{},{}}");
    }

    #[test]
    fn special_floats() {
        assert_eq!(
            literal_of(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY]),
            "{NaN,Infinity,-Infinity}"
        );
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(Array::new(42).render().unwrap_err().is_type_mismatch());
        assert!(Array::new("foo").render().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn dynamic_arrays() {
        assert_eq!(literal_of(json!([1, 2, 3])), "{1,2,3}");
        assert_eq!(literal_of(json!([["a"], ["b"]])), r#"{{"a"},{"b"}}"#);
        assert_eq!(literal_of(json!([])), "{}");
        assert_eq!(literal_of(json!([1.5, 2])), "{1.5,2}");
    }

    #[test]
    fn numbers_at_the_integer_limits() {
        assert_eq!(
            literal_of(vec![i64::MIN, i64::MAX]),
            "{-9223372036854775808,9223372036854775807}"
        );
        assert_eq!(literal_of(vec![u64::MAX]), "{18446744073709551615}");
        assert_eq!(
            literal_of(json!([u64::MAX, -1, 0.25])),
            "{18446744073709551615,-1,0.25}"
        );
    }

    #[test]
    fn dynamic_arrays_are_checked_per_level() {
        let invalid = [
            json!(42),
            json!("foo"),
            json!([6, 7, "foo"]),
            json!([[1], 2]),
            json!([[1], ["a"]]),
            json!([[1], [[2]]]),
            json!([true]),
            json!([null]),
            json!([{"a": 1}]),
            json!({"a": [1]}),
        ];
        for value in invalid {
            let err = Array::new(value.clone()).render().unwrap_err();
            assert!(err.is_type_mismatch(), "expected mismatch for {value}");
        }
    }

    #[test]
    fn json_literals() {
        let r = Json::json(json!({"a": 1})).render().unwrap();
        assert_eq!(r.sql, "?::json");
        assert_eq!(r.args, vec![Value::Text(r#"{"a":1}"#.into())]);

        let r = Json::jsonb(vec!["x", "y"]).render().unwrap();
        assert_eq!(r.sql, "?::jsonb");
        assert_eq!(r.args, vec![Value::Text(r#"["x","y"]"#.into())]);
    }

    #[test]
    fn json_serialization_failure() {
        let mut bad: BTreeMap<Vec<u8>, i32> = BTreeMap::new();
        bad.insert(vec![1, 2], 3);
        let err = Json::jsonb(bad).render().unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn any_wraps_array() {
        let r = Any::new("id", vec![1, 2, 3]).render().unwrap();
        assert_eq!(r.sql, "id = ANY(?)");
        assert_eq!(r.args, vec![Value::Text("{1,2,3}".into())]);

        assert!(Any::new("id", 5).render().is_err());
    }
}
