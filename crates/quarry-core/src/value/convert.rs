use super::{Record, Value};

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

macro_rules! impl_conversions {
    ($ty:ty, $name:ident, $lit:literal) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::$name(value)
            }
        }

        impl TryFrom<Value> for $ty {
            type Error = crate::Error;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$name(value) => Ok(value),
                    _ => Err(crate::err!(
                        "cannot convert {} to {}",
                        value.kind_name(),
                        $lit
                    )),
                }
            }
        }
    };
}

impl_conversions!(bool, Bool, "bool");
impl_conversions!(i64, Int, "i64");
impl_conversions!(f64, Float, "f64");
impl_conversions!(String, String, "String");
impl_conversions!(BigDecimal, Decimal, "BigDecimal");
impl_conversions!(DateTime<FixedOffset>, DateTime, "DateTime");
impl_conversions!(Uuid, Uuid, "Uuid");
impl_conversions!(Vec<u8>, Bytes, "Vec<u8>");
impl_conversions!(Record, Object, "Record");

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value.fixed_offset())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
