//! Dirty tracking for entity attributes.
//!
//! [`TrackedAttributes`] keeps the current attribute map of an entity next
//! to the snapshot taken when it was last hydrated from a response (or
//! saved). Comparing the two tells whether an entity needs saving and which
//! fields changed.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::rest::TrackedAttributes;
//! use serde_json::json;
//!
//! let mut tracked = TrackedAttributes::from_existing(
//!     json!({"customerId": 1, "customerName": "Acme"}).as_object().cloned().unwrap(),
//! );
//! assert!(!tracked.is_dirty());
//!
//! tracked.set("customerName", json!("Acme Corp"));
//! assert!(tracked.is_dirty());
//!
//! let changes = tracked.changed_fields();
//! assert_eq!(changes.get("customerName"), Some(&json!("Acme Corp")));
//! assert!(changes.get("customerId").is_none());
//!
//! tracked.mark_clean();
//! assert!(!tracked.is_dirty());
//! ```

use serde_json::{Map, Value};

/// Current attribute values plus the snapshot they are compared against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackedAttributes {
    attributes: Map<String, Value>,
    original: Map<String, Value>,
}

impl TrackedAttributes {
    /// Tracks attributes that came from the server.
    #[must_use]
    pub fn from_existing(attributes: Map<String, Value>) -> Self {
        Self {
            original: attributes.clone(),
            attributes,
        }
    }

    /// Returns the current attribute values.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns the snapshot taken at the last hydration or save.
    #[must_use]
    pub const fn original(&self) -> &Map<String, Value> {
        &self.original
    }

    /// Returns a current value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Sets a current value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Replaces every current value, optionally taking a new snapshot.
    pub fn replace(&mut self, attributes: Map<String, Value>, sync: bool) {
        self.attributes = attributes;
        if sync {
            self.mark_clean();
        }
    }

    /// Returns `true` if any current value differs from the snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.attributes != self.original
    }

    /// Returns `true` if the given field differs from the snapshot.
    #[must_use]
    pub fn is_dirty_key(&self, key: &str) -> bool {
        self.attributes.get(key) != self.original.get(key)
    }

    /// Returns the fields that differ from the snapshot.
    ///
    /// Nested objects are diffed recursively. Fields removed since the
    /// snapshot are not reported.
    #[must_use]
    pub fn changed_fields(&self) -> Map<String, Value> {
        match diff_json_objects(
            &Value::Object(self.original.clone()),
            &Value::Object(self.attributes.clone()),
        ) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Takes a new snapshot of the current values.
    pub fn mark_clean(&mut self) {
        self.original = self.attributes.clone();
    }
}

/// Computes the difference between two JSON objects.
///
/// Returns a JSON object containing only the fields from `current` that
/// differ from `original`. Handles nested objects recursively.
fn diff_json_objects(original: &Value, current: &Value) -> Value {
    match (original, current) {
        (Value::Object(orig_map), Value::Object(curr_map)) => {
            let mut diff = Map::new();

            for (key, curr_value) in curr_map {
                match orig_map.get(key) {
                    Some(orig_value) if orig_value == curr_value => {}
                    Some(orig_value) if orig_value.is_object() && curr_value.is_object() => {
                        let nested = diff_json_objects(orig_value, curr_value);
                        if nested.as_object().is_some_and(|m| !m.is_empty()) {
                            diff.insert(key.clone(), nested);
                        }
                    }
                    _ => {
                        diff.insert(key.clone(), curr_value.clone());
                    }
                }
            }

            Value::Object(diff)
        }
        _ => {
            if original == current {
                Value::Null
            } else {
                current.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_existing_attributes_start_clean() {
        let tracked = TrackedAttributes::from_existing(map(json!({"a": 1, "b": [1, 2]})));
        assert!(!tracked.is_dirty());
        assert!(tracked.changed_fields().is_empty());
    }

    #[test]
    fn test_setting_same_value_is_not_dirty() {
        let mut tracked = TrackedAttributes::from_existing(map(json!({"a": 1})));
        tracked.set("a", json!(1));
        assert!(!tracked.is_dirty());
        assert!(!tracked.is_dirty_key("a"));
    }

    #[test]
    fn test_new_field_is_reported() {
        let mut tracked = TrackedAttributes::from_existing(map(json!({"a": 1})));
        tracked.set("b", json!("x"));

        assert!(tracked.is_dirty_key("b"));
        assert_eq!(tracked.changed_fields(), map(json!({"b": "x"})));
    }

    #[test]
    fn test_nested_objects_are_diffed() {
        let mut tracked = TrackedAttributes::from_existing(map(json!({
            "credential": {"type": "LocalSystem", "username": null}
        })));
        tracked.set(
            "credential",
            json!({"type": "CustomCredentials", "username": null}),
        );

        assert_eq!(
            tracked.changed_fields(),
            map(json!({"credential": {"type": "CustomCredentials"}}))
        );
    }

    #[test]
    fn test_replace_with_sync_takes_snapshot() {
        let mut tracked = TrackedAttributes::from_existing(Map::new());
        tracked.set("a", json!(1));
        tracked.replace(map(json!({"taskId": 9})), true);

        assert!(!tracked.is_dirty());
        assert_eq!(tracked.original(), &map(json!({"taskId": 9})));
        assert!(tracked.get("a").is_none());
    }

    #[test]
    fn test_replace_without_sync_stays_dirty() {
        let mut tracked = TrackedAttributes::from_existing(map(json!({"a": 1})));
        tracked.replace(map(json!({"a": 2})), false);
        assert!(tracked.is_dirty());
    }
}
