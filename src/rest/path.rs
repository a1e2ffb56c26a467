//! Path and query-string building for REST resources.
//!
//! N-central paths are composed from a base resource path, an optional
//! identifier segment, an optional suffix and a query string. Relations
//! that live under another entity use templates such as
//! `/org-units/{orgUnitId}/children`, interpolated from the owner's
//! attributes with [`build_path`].
//!
//! # Query Strings
//!
//! [`build_query`] serializes filters the way the API expects them:
//!
//! - booleans are `true`/`false`, never `1`/`0`
//! - `null` values are skipped
//! - arrays and objects use bracket notation (`ids[0]=1&ids[1]=2`)
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::rest::{build_path, build_query};
//! use serde_json::{json, Map};
//! use std::collections::HashMap;
//!
//! let mut ids = HashMap::new();
//! ids.insert("orgUnitId", "50");
//! assert_eq!(build_path("/org-units/{orgUnitId}/children", &ids), "/org-units/50/children");
//!
//! let mut filters = Map::new();
//! filters.insert("pageSize".to_string(), json!(25));
//! filters.insert("paginate".to_string(), json!(true));
//! assert_eq!(build_query(&filters), "pageSize=25&paginate=true");
//! ```

use std::collections::HashMap;
use std::fmt::Display;

use serde_json::{Map, Value};

/// Builds a path from a template by interpolating IDs.
///
/// Replaces `{id_name}` placeholders in the template with values from
/// the provided map. Placeholders without a value are left untouched.
#[must_use]
pub fn build_path<V: Display>(template: &str, ids: &HashMap<&str, V>) -> String {
    let mut result = template.to_string();
    for (key, value) in ids {
        result = result.replace(&format!("{{{key}}}"), &value.to_string());
    }
    result
}

/// Renders a JSON scalar as a single path segment or query value.
///
/// Returns `None` for `null`, arrays and objects.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Serializes filters into a URL-encoded query string, without the leading `?`.
#[must_use]
pub fn build_query(filters: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in filters {
        push_pairs(&mut pairs, key, value);
    }
    pairs.join("&")
}

fn push_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(pairs, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                push_pairs(pairs, &format!("{key}[{sub}]"), item);
            }
        }
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                pairs.push(format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&text)
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_build_path_interpolates_placeholders() {
        let mut ids = HashMap::new();
        ids.insert("orgUnitId", 42);
        assert_eq!(
            build_path("/org-units/{orgUnitId}/devices", &ids),
            "/org-units/42/devices"
        );
    }

    #[test]
    fn test_build_path_leaves_unknown_placeholders() {
        let ids: HashMap<&str, &str> = HashMap::new();
        assert_eq!(build_path("/x/{missing}", &ids), "/x/{missing}");
    }

    #[test]
    fn test_booleans_serialize_as_literals() {
        let query = build_query(&filters(json!({"isProbe": true, "paginate": false})));
        assert_eq!(query, "isProbe=true&paginate=false");
        assert!(!query.contains('1'));
        assert!(!query.contains('0'));
    }

    #[test]
    fn test_nulls_are_skipped() {
        let query = build_query(&filters(json!({"a": null, "b": "x"})));
        assert_eq!(query, "b=x");
    }

    #[test]
    fn test_values_are_encoded() {
        let query = build_query(&filters(json!({"name": "Acme & Co"})));
        assert_eq!(query, "name=Acme%20%26%20Co");
    }

    #[test]
    fn test_arrays_and_objects_use_brackets() {
        let query = build_query(&filters(json!({"ids": [1, 2], "range": {"from": 3}})));
        assert_eq!(
            query,
            "ids%5B0%5D=1&ids%5B1%5D=2&range%5Bfrom%5D=3"
        );
    }

    #[test]
    fn test_empty_filters_produce_empty_query() {
        assert_eq!(build_query(&Map::new()), "");
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_to_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(scalar_to_string(&json!(false)), Some("false".to_string()));
        assert_eq!(scalar_to_string(&json!(null)), None);
        assert_eq!(scalar_to_string(&json!([1])), None);
    }
}
