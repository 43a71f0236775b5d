use quarry_core::schema::ScalarKind;
use quarry_core::Value;

use base64::Engine as _;
use bigdecimal::BigDecimal;
use chrono::DateTime;
use serde_json::{Number, Value as Json};
use std::str::FromStr;
use uuid::Uuid;

/// Coerces a raw JSON value into a scalar of `kind`.
///
/// On mismatch, returns a reason suitable for an error message.
pub(crate) fn from_json(kind: ScalarKind, raw: &Json) -> Result<Value, String> {
    match (kind, raw) {
        (ScalarKind::Int, Json::Number(n)) => integer(n)
            .map(Value::Int)
            .ok_or_else(|| format!("expected Int, found `{n}`")),
        (ScalarKind::BigInt, Json::Number(n)) => integer(n)
            .map(Value::BigInt)
            .ok_or_else(|| format!("expected BigInt, found `{n}`")),
        (ScalarKind::BigInt, Json::String(s)) => s
            .parse()
            .map(Value::BigInt)
            .map_err(|_| format!("`{s}` is not a BigInt")),
        (ScalarKind::Float, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| format!("expected Float, found `{n}`")),
        (ScalarKind::Decimal, Json::Number(n)) => decimal(&n.to_string()),
        (ScalarKind::Decimal, Json::String(s)) => decimal(s),
        (ScalarKind::String, Json::String(s)) => Ok(Value::String(s.clone())),
        (ScalarKind::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (ScalarKind::DateTime, Json::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(Value::DateTime)
            .map_err(|e| format!("`{s}` is not an RFC 3339 timestamp ({e})")),
        (ScalarKind::Json, raw) => Ok(Value::Json(raw.clone())),
        (ScalarKind::Bytes, Json::String(s)) => base64::engine::general_purpose::STANDARD
            .decode(s)
            .map(Value::Bytes)
            .map_err(|e| format!("`{s}` is not base64 ({e})")),
        (ScalarKind::Uuid, Json::String(s)) => Uuid::parse_str(s)
            .map(Value::Uuid)
            .map_err(|e| format!("`{s}` is not a UUID ({e})")),
        (kind, raw) => Err(format!("expected {kind}, found {}", json_kind(raw))),
    }
}

/// Reads a whole number, including floats such as `5.0` that have no
/// fractional part.
fn integer(n: &Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }

    let v = n.as_f64()?;
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.fract() == 0.0 && in_range).then_some(v as i64)
}

fn decimal(src: &str) -> Result<Value, String> {
    BigDecimal::from_str(src)
        .map(Value::Decimal)
        .map_err(|_| format!("`{src}` is not a Decimal"))
}

/// Name of a raw value's kind, as used in error messages.
pub(crate) fn json_kind(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "Null",
        Json::Bool(_) => "Boolean",
        Json::Number(_) => "Number",
        Json::String(_) => "String",
        Json::Array(_) => "List",
        Json::Object(_) => "Object",
    }
}
