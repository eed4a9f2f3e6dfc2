//! Bound parameter values.
//!
//! Rendering produces an ordered list of [`Value`]s. The list is handed to the
//! driver as-is: `Value` implements `tokio_postgres::types::ToSql`, so
//! [`Rendered::params_ref`](crate::Rendered::params_ref) plugs straight into
//! `client.query(&sql, &params)`.

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};

use crate::error::{SqlError, SqlResult};

/// A dynamically typed bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Check if this value is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A value wrapper that knows how to resolve itself to a primitive [`Value`].
///
/// Predicates resolve these before deciding between the NULL / scalar
/// branches; a failed resolution is returned from `render()` unchanged.
pub trait ToValue: Send + Sync + fmt::Debug {
    fn to_value(&self) -> SqlResult<Value>;
}

macro_rules! impl_value_from {
    ($variant:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )+
    };
}

impl_value_from!(Bool => bool);
impl_value_from!(Int => i8, i16, i32, i64, u8, u16, u32);
impl_value_from!(Float => f32, f64);
impl_value_from!(Text => String, &str, &String);
impl_value_from!(Bytes => Vec<u8>, &[u8]);
impl_value_from!(Json => serde_json::Value);
impl_value_from!(Uuid => uuid::Uuid);
impl_value_from!(Timestamp => DateTime<Utc>);

// Unsigned 64-bit sources can exceed BIGINT, so they convert fallibly.
macro_rules! impl_value_try_from_unsigned {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<$ty> for Value {
                type Error = SqlError;

                fn try_from(v: $ty) -> SqlResult<Self> {
                    i64::try_from(v).map(Value::Int).map_err(|_| {
                        SqlError::Other(format!("{v} is out of range for a bigint parameter"))
                    })
                }
            }
        )+
    };
}

impl_value_try_from_unsigned!(u64, usize);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    let narrowed = *v as f32;
                    if v.is_finite() && narrowed.is_infinite() {
                        return Err(format!("{v} is out of range for float4").into());
                    }
                    narrowed.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            // JSON literals travel as text; send them in the json/jsonb wire format.
            Value::Text(v) if *ty == Type::JSON => {
                out.put_slice(v.as_bytes());
                Ok(IsNull::No)
            }
            Value::Text(v) if *ty == Type::JSONB => {
                out.put_u8(1);
                out.put_slice(v.as_bytes());
                Ok(IsNull::No)
            }
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => {
                if *ty == Type::TIMESTAMP {
                    v.naive_utc().to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
        }
    }

    // Each variant delegates to its inner type's own `accepts` check.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }

    #[test]
    fn integers_widen_to_int() {
        assert_eq!(Value::from(6u8), Value::Int(6));
        assert_eq!(Value::from(-3i16), Value::Int(-3));
        assert_eq!(Value::from(42u32), Value::Int(42));
    }

    #[test]
    fn int_narrows_for_int4_columns() {
        let mut buf = BytesMut::new();
        let res = Value::Int(7).to_sql_checked(&Type::INT4, &mut buf);
        assert!(matches!(res, Ok(IsNull::No)));
        assert_eq!(&buf[..], &7i32.to_be_bytes());
    }

    #[test]
    fn int_overflow_is_reported_by_driver_bridge() {
        let mut buf = BytesMut::new();
        let res = Value::Int(i64::from(i32::MAX) + 1).to_sql_checked(&Type::INT4, &mut buf);
        assert!(res.is_err());
    }

    #[test]
    fn unsigned_64_bit_values_are_checked() {
        assert_eq!(Value::try_from(42u64).unwrap(), Value::Int(42));
        assert_eq!(Value::try_from(7usize).unwrap(), Value::Int(7));
        assert_eq!(
            Value::try_from(i64::MAX as u64).unwrap(),
            Value::Int(i64::MAX)
        );

        let err = Value::try_from(u64::MAX).unwrap_err();
        assert!(matches!(err, SqlError::Other(msg) if msg.contains("18446744073709551615")));
    }

    #[test]
    fn float_narrows_for_float4_columns() {
        let mut buf = BytesMut::new();
        let res = Value::Float(1.5).to_sql_checked(&Type::FLOAT4, &mut buf);
        assert!(matches!(res, Ok(IsNull::No)));
        assert_eq!(&buf[..], &1.5f32.to_be_bytes());

        // Precision beyond f32 is rounded away.
        let mut buf = BytesMut::new();
        Value::Float(0.1).to_sql_checked(&Type::FLOAT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &0.1f32.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Float(f64::INFINITY)
            .to_sql_checked(&Type::FLOAT4, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &f32::INFINITY.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Float(1.5).to_sql_checked(&Type::FLOAT8, &mut buf).unwrap();
        assert_eq!(&buf[..], &1.5f64.to_be_bytes());
    }

    #[test]
    fn float4_overflow_is_reported_by_driver_bridge() {
        let mut buf = BytesMut::new();
        let res = Value::Float(1e300).to_sql_checked(&Type::FLOAT4, &mut buf);
        assert!(res.is_err());
    }

    #[test]
    fn json_text_uses_jsonb_wire_format() {
        let mut buf = BytesMut::new();
        let res = Value::Text("{}".into()).to_sql_checked(&Type::JSONB, &mut buf);
        assert!(matches!(res, Ok(IsNull::No)));
        assert_eq!(&buf[..], b"\x01{}");
    }

    #[test]
    fn null_binds_as_sql_null() {
        let mut buf = BytesMut::new();
        let res = Value::Null.to_sql_checked(&Type::TEXT, &mut buf);
        assert!(matches!(res, Ok(IsNull::Yes)));
    }
}
