//! Data models for the airfleet ingestion pipeline.
//!
//! A push request travels through these types in order:
//! `RawReading` (decoded envelope) → `ValidatedReading` (typed, pruned) →
//! [`crate::InsertPlan`] (shaped for a single parameterized insert).

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{EnvelopeLayer, PushError};

// ---

/// How a validated value is bound into the insert statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Decimal,
    Integer,
    Text,
}

/// Validation and storage contract for one reading field.
#[derive(Debug)]
pub struct FieldSpec {
    // ---
    pub name: &'static str,
    pub pattern: Regex,
    pub storage: StorageType,

    /// PostgreSQL column type, also used as the placeholder cast.
    pub sql_type: &'static str,

    /// Only consulted under [`crate::FieldPolicy::Strict`].
    pub required: bool,
}

/// A raw value coerced into its field's storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Decimal(f64),
    Integer(i32),
    Text(String),
}

impl FieldValue {
    pub fn storage_type(&self) -> StorageType {
        match self {
            FieldValue::Decimal(_) => StorageType::Decimal,
            FieldValue::Integer(_) => StorageType::Integer,
            FieldValue::Text(_) => StorageType::Text,
        }
    }
}

/// Outer push body: `{"data": "<JSON-encoded reading>"}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
}

/// Empty or zero-like documents that carry no envelope at all.
fn is_blank(value: &Value) -> bool {
    // ---
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// One sensor sample as received, keyed by field name.
#[derive(Debug, Default, Clone)]
pub struct RawReading {
    values: HashMap<String, String>,
}

impl RawReading {
    // ---
    /// Unwrap the double-encoded push body.
    ///
    /// The outer document must decode to something non-blank (`{}`, `[]`,
    /// `null`, `0` and `""` count as unparseable), and its `data` member must be
    /// a string that itself decodes to a JSON object. Numbers are kept in their
    /// JSON text form (the firmware sends `"pm1":1.5`), `null` counts as
    /// absent, and anything else keeps its JSON text so it fails validation.
    pub fn from_envelope(body: &[u8]) -> Result<Self, PushError> {
        // ---
        let outer: Value = serde_json::from_slice(body)
            .map_err(|_| PushError::Envelope(EnvelopeLayer::Outer))?;
        if is_blank(&outer) {
            return Err(PushError::Envelope(EnvelopeLayer::Outer));
        }

        let envelope: Envelope = serde_json::from_value(outer)
            .map_err(|_| PushError::Envelope(EnvelopeLayer::Inner))?;

        let inner = match envelope.data {
            Some(Value::String(s)) => s,
            _ => return Err(PushError::Envelope(EnvelopeLayer::Inner)),
        };

        let object = match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(object)) => object,
            _ => return Err(PushError::Envelope(EnvelopeLayer::Inner)),
        };

        let values = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();

        Ok(Self { values })
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K, V> FromIterator<(K, V)> for RawReading
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Fields that passed validation, in registry order.
#[derive(Debug)]
pub struct ValidatedReading {
    pub fields: Vec<(&'static FieldSpec, FieldValue)>,
}

impl ValidatedReading {
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(spec, _)| spec.name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn envelope(inner: &str) -> Vec<u8> {
        serde_json::json!({ "data": inner }).to_string().into_bytes()
    }

    #[test]
    fn test_unwraps_double_encoded_body() {
        // ---
        let body = envelope(r#"{"pm1":"1.5","co2":"410","time":"2024-12-16 10:00:00"}"#);
        let raw = RawReading::from_envelope(&body).unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get("pm1"), Some("1.5"));
        assert_eq!(raw.get("co2"), Some("410"));
        assert_eq!(raw.get("time"), Some("2024-12-16 10:00:00"));
    }

    #[test]
    fn test_firmware_numbers_become_text() {
        // ---
        // Shape produced by the sensor firmware: numbers, not strings
        let body = envelope(r#"{"pm1":1.5,"voc":12,"lat":55.676098,"co2":null}"#);
        let raw = RawReading::from_envelope(&body).unwrap();

        assert_eq!(raw.get("pm1"), Some("1.5"));
        assert_eq!(raw.get("voc"), Some("12"));
        assert_eq!(raw.get("lat"), Some("55.676098"));
        assert_eq!(raw.get("co2"), None);
    }

    #[test]
    fn test_non_scalar_values_keep_json_text() {
        // ---
        let body = envelope(r#"{"pm1":true,"pm4":[1]}"#);
        let raw = RawReading::from_envelope(&body).unwrap();

        assert_eq!(raw.get("pm1"), Some("true"));
        assert_eq!(raw.get("pm4"), Some("[1]"));
    }

    #[test]
    fn test_malformed_outer_json() {
        // ---
        let err = RawReading::from_envelope(b"{not json").unwrap_err();
        assert!(matches!(err, PushError::Envelope(EnvelopeLayer::Outer)));
        assert_eq!(err.to_string(), "Unable to parse JSON");
    }

    #[test]
    fn test_blank_outer_document_is_unparseable() {
        // ---
        for body in ["{}", "[]", "null", "0", "false", r#""""#] {
            let err = RawReading::from_envelope(body.as_bytes()).unwrap_err();
            assert!(
                matches!(err, PushError::Envelope(EnvelopeLayer::Outer)),
                "{} should fail as outer JSON",
                body
            );
        }

        // Non-blank, but without a usable data member
        let err = RawReading::from_envelope(b"[1]").unwrap_err();
        assert!(matches!(err, PushError::Envelope(EnvelopeLayer::Inner)));
    }

    #[test]
    fn test_malformed_inner_json() {
        // ---
        let err = RawReading::from_envelope(br#"{"data": "not json"}"#).unwrap_err();
        assert!(matches!(err, PushError::Envelope(EnvelopeLayer::Inner)));
        assert_eq!(err.to_string(), "Unable to parse data");
    }

    #[test]
    fn test_inner_must_be_encoded_object() {
        // ---
        // Missing data member
        let err = RawReading::from_envelope(br#"{"reading": "{}"}"#).unwrap_err();
        assert!(matches!(err, PushError::Envelope(EnvelopeLayer::Inner)));

        // Not double-encoded
        let err = RawReading::from_envelope(br#"{"data": {"pm1": "1.0"}}"#).unwrap_err();
        assert!(matches!(err, PushError::Envelope(EnvelopeLayer::Inner)));

        // Encoded, but not an object
        let err = RawReading::from_envelope(&envelope("[1,2,3]")).unwrap_err();
        assert!(matches!(err, PushError::Envelope(EnvelopeLayer::Inner)));
    }

    #[test]
    fn test_value_storage_type() {
        // ---
        assert_eq!(FieldValue::Decimal(1.0).storage_type(), StorageType::Decimal);
        assert_eq!(FieldValue::Integer(1).storage_type(), StorageType::Integer);
        assert_eq!(
            FieldValue::Text("x".to_string()).storage_type(),
            StorageType::Text
        );
    }
}
