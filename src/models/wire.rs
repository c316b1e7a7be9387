//! Lenient readers for the marketplace's JSON payloads.
//!
//! Every field except a record's `id` may be missing or carry an unexpected
//! type, so these helpers return `None` instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

/// Identifier from a string or a number. Blank strings count as absent.
pub fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn first_id(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(id_value))
}

pub fn text(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub fn first_text(obj: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(obj, key))
}

/// Integer from a JSON number (fractions truncated) or a numeric string.
pub fn integer(obj: &Object, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn flag(obj: &Object, key: &str) -> bool {
    matches!(obj.get(key), Some(Value::Bool(true)))
}

/// Instant from an RFC 3339 string, a zone-less ISO string (read as UTC),
/// a bare date, or epoch milliseconds.
pub fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

pub fn first_timestamp(obj: &Object, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| obj.get(*key).and_then(timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `deserialize_with` adapter for optional ids that may arrive as numbers.
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_value(&value))
}

/// `deserialize_with` adapter that drops anything that is not a string.
pub fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_strings_and_numbers() {
        assert_eq!(id_value(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_value(&json!(42)), Some("42".to_string()));
        assert_eq!(id_value(&json!("  ")), None);
        assert_eq!(id_value(&json!({"id": 1})), None);
        assert_eq!(id_value(&Value::Null), None);
    }

    #[test]
    fn first_id_respects_key_order() {
        let obj = json!({"order_id": "b", "orderId": "a"});
        let obj = obj.as_object().unwrap();
        assert_eq!(first_id(obj, &["orderId", "order_id"]), Some("a".into()));
        assert_eq!(first_id(obj, &["missing"]), None);
    }

    #[test]
    fn timestamps_in_several_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();
        assert_eq!(timestamp(&json!("2025-03-01T20:00:00Z")), Some(expected));
        assert_eq!(timestamp(&json!("2025-03-01T17:00:00-03:00")), Some(expected));
        assert_eq!(timestamp(&json!("2025-03-01T20:00:00.000")), Some(expected));
        assert_eq!(
            timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(
            timestamp(&json!("2025-03-01")),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(timestamp(&json!("not a date")), None);
        assert_eq!(timestamp(&json!(true)), None);
    }

    #[test]
    fn integers_tolerate_strings_and_floats() {
        let obj = json!({"a": 1500, "b": "2500", "c": 12.9, "d": "x"});
        let obj = obj.as_object().unwrap();
        assert_eq!(integer(obj, "a"), Some(1500));
        assert_eq!(integer(obj, "b"), Some(2500));
        assert_eq!(integer(obj, "c"), Some(12));
        assert_eq!(integer(obj, "d"), None);
        assert_eq!(integer(obj, "e"), None);
    }
}
