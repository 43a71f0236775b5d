use super::{Record, Value};

use base64::Engine as _;
use chrono::SecondsFormat;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

impl Value {
    /// Converts the value back into its raw JSON form.
    ///
    /// Validating the returned JSON against the type that produced this
    /// value yields an equal value: timestamps print as RFC 3339 with their
    /// full precision, decimals as strings, and bytes as base64.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::Int(v) | Value::BigInt(v) => Json::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(v) => Json::String(v.to_string()),
            Value::String(v) | Value::Enum(v) => Json::String(v.clone()),
            Value::DateTime(v) => Json::String(format_datetime(v)),
            Value::Json(v) => v.clone(),
            Value::Bytes(v) => Json::String(encode_bytes(v)),
            Value::Uuid(v) => Json::String(v.hyphenated().to_string()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(record) => Json::Object(record.to_json_map()),
        }
    }
}

impl Record {
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

fn format_datetime(v: &chrono::DateTime<chrono::FixedOffset>) -> String {
    v.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn encode_bytes(v: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(v)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) | Value::BigInt(v) => serializer.serialize_i64(*v),
            Value::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Decimal(v) => serializer.collect_str(v),
            Value::String(v) | Value::Enum(v) => serializer.serialize_str(v),
            Value::DateTime(v) => serializer.serialize_str(&format_datetime(v)),
            Value::Json(v) => v.serialize(serializer),
            Value::Bytes(v) => serializer.serialize_str(&encode_bytes(v)),
            Value::Uuid(v) => serializer.collect_str(&v.hyphenated()),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::DateTime;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn scalars_print_in_raw_form() {
        let ts = DateTime::parse_from_rfc3339("2024-01-02T03:04:05.123456Z").unwrap();
        let value = Value::Object(
            Record::new()
                .with("at", ts)
                .with("price", BigDecimal::from_str("1.50").unwrap())
                .with("blob", vec![1u8, 2, 3])
                .with("kind", Value::Enum("A".into())),
        );

        assert_eq!(
            value.to_json(),
            json!({
                "at": "2024-01-02T03:04:05.123456Z",
                "price": "1.50",
                "blob": "AQID",
                "kind": "A",
            })
        );
    }

    #[test]
    fn serialize_matches_to_json() {
        let value = Value::List(vec![Value::Int(1), Value::Null, Value::Float(2.5)]);
        assert_eq!(serde_json::to_value(&value).unwrap(), value.to_json());
    }
}
