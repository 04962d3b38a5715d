//! The host record: a JSON object with string-field access.

use serde_json::{Map, Value};

use crate::error::{DecoderError, DecoderResult};

/// One in-flight pipeline record.
///
/// Wraps a JSON object. The decoder reads the configured source field and
/// attaches `ua_*` string fields; everything else passes through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_object(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Read a field as a string. `None` when absent or not string-typed.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Set a field to an arbitrary JSON value, replacing any existing one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Attach a new string field.
    ///
    /// Refused when a field of that name already exists; the existing
    /// value is left untouched.
    pub fn attach_str(&mut self, name: &str, value: impl Into<String>) -> DecoderResult<()> {
        if self.fields.contains_key(name) {
            return Err(DecoderError::FieldConflict(name.to_string()));
        }
        self.fields
            .insert(name.to_string(), Value::String(value.into()));
        Ok(())
    }

    /// True when a field of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields on the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Unwrap back into a JSON value for forwarding downstream.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_str_only_returns_strings() {
        let mut record = Record::new();
        record.insert("ua", json!("curl/7.68.0"));
        record.insert("status", json!(200));

        assert_eq!(record.get_str("ua"), Some("curl/7.68.0"));
        assert_eq!(record.get_str("status"), None);
        assert_eq!(record.get_str("missing"), None);
    }

    #[test]
    fn test_attach_refuses_duplicates() {
        let mut record = Record::new();
        record.attach_str("ua_name", "Firefox").unwrap();

        let err = record.attach_str("ua_name", "Chrome").unwrap_err();
        assert!(matches!(err, DecoderError::FieldConflict(_)));
        assert_eq!(record.get_str("ua_name"), Some("Firefox"));
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(Record::from_value(json!({"a": 1})).is_some());
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert!(Record::from_value(json!("text")).is_none());
    }

    #[test]
    fn test_round_trip() {
        let value = json!({"ua": "curl", "n": 3});
        let record = Record::from_value(value.clone()).unwrap();
        assert_eq!(record.into_value(), value);
    }
}
