mod convert;
mod json;
mod record;

pub use record::Record;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// A schema-typed value.
///
/// Validated arguments and materialized results are both expressed as
/// `Value` trees. Unlike raw JSON, every scalar carries the kind the schema
/// assigned to it.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    Bool(bool),

    /// 32-bit schema integer, stored widened
    Int(i64),

    /// 64-bit schema integer
    BigInt(i64),

    Float(f64),

    /// Arbitrary precision decimal
    Decimal(BigDecimal),

    String(String),

    /// Member of a schema enum
    Enum(String),

    /// Timestamp, keeping the offset it was written with
    DateTime(DateTime<FixedOffset>),

    /// Untyped JSON, kept verbatim
    Json(serde_json::Value),

    Bytes(Vec<u8>),

    Uuid(Uuid),

    List(Vec<Value>),

    /// Object with keys in insertion order
    Object(Record),
}

impl Value {
    pub const fn null() -> Value {
        Value::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the integer held by an `Int` or `BigInt`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) | Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) | Value::BigInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the text of a `String` or `Enum`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_record(&self) -> &Record {
        match self {
            Value::Object(record) => record,
            _ => panic!("expected object; actual={self:#?}"),
        }
    }

    /// Name of the value's kind, as used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::BigInt(_) => "BigInt",
            Value::Float(_) => "Float",
            Value::Decimal(_) => "Decimal",
            Value::String(_) => "String",
            Value::Enum(_) => "Enum",
            Value::DateTime(_) => "DateTime",
            Value::Json(_) => "Json",
            Value::Bytes(_) => "Bytes",
            Value::Uuid(_) => "UUID",
            Value::List(_) => "List",
            Value::Object(_) => "Object",
        }
    }

    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

impl AsRef<Value> for Value {
    fn as_ref(&self) -> &Value {
        self
    }
}
