//! Typed document fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::Result;
use crate::error::Error;

/// A single typed field value.
///
/// Serialized in the typed-value JSON shape, for example
/// `{"stringValue": "Walk"}` or `{"timestampValue": "2026-10-16T09:30:00Z"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "timestampValue")]
    Timestamp(Timestamp),
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
            FieldValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// The fields of one document, keyed by field name.
///
/// Typed getters fail with [`InvalidInputError::Field`] when a field is
/// missing or holds a different type, so model conversions can use `?`.
///
/// [`InvalidInputError::Field`]: crate::error::InvalidInputError::Field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    /// Create an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Overwrite the fields present in `other`, keeping the rest.
    pub fn merge(&mut self, other: &Fields) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a required string field.
    pub fn get_str(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            FieldValue::String(s) => Ok(s),
            other => Err(Self::mistyped(name, "string", other)),
        }
    }

    /// Get an optional string field; empty strings read as absent.
    pub fn get_optional_str(&self, name: &str) -> Result<Option<&str>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(FieldValue::String(s)) if s.is_empty() => Ok(None),
            Some(FieldValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(Self::mistyped(name, "string", other)),
        }
    }

    /// Get a required timestamp field.
    pub fn get_timestamp(&self, name: &str) -> Result<Timestamp> {
        match self.require(name)? {
            FieldValue::Timestamp(ts) => Ok(*ts),
            other => Err(Self::mistyped(name, "timestamp", other)),
        }
    }

    fn require(&self, name: &str) -> Result<&FieldValue> {
        self.0
            .get(name)
            .ok_or_else(|| Error::field(name, "missing"))
    }

    fn mistyped(name: &str, expected: &str, found: &FieldValue) -> Error {
        Error::field(
            name,
            format!("expected {}, found {}", expected, found.type_name()),
        )
    }
}

impl FromIterator<(String, FieldValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidInputError;
    use serde_json::json;

    #[test]
    fn serializes_typed_values() {
        let ts = Timestamp::parse("2026-10-16T09:30:00Z").unwrap();
        let fields = Fields::new()
            .with("label", "Walk")
            .with("done", false)
            .with("reminderTime", ts);

        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "done": { "booleanValue": false },
                "label": { "stringValue": "Walk" },
                "reminderTime": { "timestampValue": "2026-10-16T09:30:00Z" }
            })
        );
    }

    #[test]
    fn typed_getters_report_missing_and_mistyped() {
        let fields = Fields::new().with("label", "Walk");

        assert_eq!(fields.get_str("label").unwrap(), "Walk");

        let err = fields.get_timestamp("label").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(InvalidInputError::Field { .. })));
        assert!(err.to_string().contains("expected timestamp, found string"));

        assert!(fields.get_str("ownerId").is_err());
    }

    #[test]
    fn optional_string_treats_empty_as_absent() {
        let fields = Fields::new().with("avatarUrl", "");
        assert_eq!(fields.get_optional_str("avatarUrl").unwrap(), None);
        assert_eq!(fields.get_optional_str("other").unwrap(), None);
    }

    #[test]
    fn merge_overwrites_only_given_fields() {
        let mut fields = Fields::new().with("label", "Walk").with("ownerId", "u1");
        fields.merge(&Fields::new().with("label", "Feed"));

        assert_eq!(fields.get_str("label").unwrap(), "Feed");
        assert_eq!(fields.get_str("ownerId").unwrap(), "u1");
    }

    #[test]
    fn deserialize_rejects_unknown_value_type() {
        let result: std::result::Result<Fields, _> =
            serde_json::from_value(json!({ "count": { "integerValue": "3" } }));
        assert!(result.is_err());
    }
}
