//! Attribute casts declared per entity type.
//!
//! Attributes are stored exactly as the server sent them. A declared
//! [`Cast`] converts the stored value on read into an [`AttributeValue`].

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// The kinds of cast an entity can declare for an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cast {
    /// Integer, from numbers or numeric strings.
    Int,
    /// Boolean, from booleans, numbers or `"true"`/`"false"`/`"1"`/`"0"`.
    Bool,
    /// Array or object, from JSON values or JSON-encoded strings.
    Array,
    /// Timestamp from milliseconds since the Unix epoch (or an RFC 3339 string).
    DateTimeMillis,
}

/// An attribute value after applying its declared cast.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// An [`Cast::Int`] attribute.
    Int(i64),
    /// A [`Cast::Bool`] attribute.
    Bool(bool),
    /// A [`Cast::Array`] attribute.
    Array(Value),
    /// A [`Cast::DateTimeMillis`] attribute.
    DateTime(DateTime<Utc>),
    /// An attribute with no declared cast.
    Raw(Value),
}

impl Cast {
    /// Applies the cast to a stored value.
    ///
    /// Returns `None` for `null` and for values that cannot be converted.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ncentral_api::rest::{AttributeValue, Cast};
    /// use serde_json::json;
    ///
    /// assert_eq!(Cast::Int.apply(&json!("42")), Some(AttributeValue::Int(42)));
    /// assert_eq!(Cast::Bool.apply(&json!("false")), Some(AttributeValue::Bool(false)));
    /// assert_eq!(Cast::Int.apply(&json!(null)), None);
    /// ```
    #[must_use]
    pub fn apply(self, value: &Value) -> Option<AttributeValue> {
        if value.is_null() {
            return None;
        }
        match self {
            Self::Int => to_int(value).map(AttributeValue::Int),
            Self::Bool => to_bool(value).map(AttributeValue::Bool),
            Self::Array => to_array(value).map(AttributeValue::Array),
            Self::DateTimeMillis => to_datetime(value).map(AttributeValue::DateTime),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_array(value: &Value) -> Option<Value> {
    match value {
        Value::Array(_) | Value::Object(_) => Some(value.clone()),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(|v| v.is_array() || v.is_object()),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(millis) => Some(millis),
            Err(_) => {
                return DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        },
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }?;
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_cast() {
        assert_eq!(Cast::Int.apply(&json!(7)), Some(AttributeValue::Int(7)));
        assert_eq!(Cast::Int.apply(&json!(" 12 ")), Some(AttributeValue::Int(12)));
        assert_eq!(Cast::Int.apply(&json!(3.9)), Some(AttributeValue::Int(3)));
        assert_eq!(Cast::Int.apply(&json!("abc")), None);
    }

    #[test]
    fn test_bool_cast() {
        assert_eq!(Cast::Bool.apply(&json!(true)), Some(AttributeValue::Bool(true)));
        assert_eq!(Cast::Bool.apply(&json!(0)), Some(AttributeValue::Bool(false)));
        assert_eq!(Cast::Bool.apply(&json!("1")), Some(AttributeValue::Bool(true)));
        assert_eq!(Cast::Bool.apply(&json!("False")), Some(AttributeValue::Bool(false)));
        assert_eq!(Cast::Bool.apply(&json!("")), Some(AttributeValue::Bool(false)));
    }

    #[test]
    fn test_array_cast() {
        assert_eq!(
            Cast::Array.apply(&json!([1, 2])),
            Some(AttributeValue::Array(json!([1, 2])))
        );
        assert_eq!(
            Cast::Array.apply(&json!(r#"{"type":"LocalSystem"}"#)),
            Some(AttributeValue::Array(json!({"type": "LocalSystem"})))
        );
        assert_eq!(Cast::Array.apply(&json!("plain")), None);
    }

    #[test]
    fn test_datetime_cast_from_millis() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let millis = expected.timestamp_millis();

        assert_eq!(
            Cast::DateTimeMillis.apply(&json!(millis)),
            Some(AttributeValue::DateTime(expected))
        );
        assert_eq!(
            Cast::DateTimeMillis.apply(&json!(millis.to_string())),
            Some(AttributeValue::DateTime(expected))
        );
    }

    #[test]
    fn test_datetime_cast_from_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            Cast::DateTimeMillis.apply(&json!("2024-01-15T10:30:00Z")),
            Some(AttributeValue::DateTime(expected))
        );
    }

    #[test]
    fn test_null_never_casts() {
        for cast in [Cast::Int, Cast::Bool, Cast::Array, Cast::DateTimeMillis] {
            assert_eq!(cast.apply(&Value::Null), None);
        }
    }
}
