use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored value of a profile or child-record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Flag(bool),
    Number(i64),
    Text(String),
}

impl FieldValue {
    /// Falsy values (empty text, zero, `false`) become `Null` so typed storage columns never
    /// receive an empty string.
    pub fn normalized(self) -> Self {
        match self {
            FieldValue::Text(text) if text.is_empty() => FieldValue::Null,
            FieldValue::Number(0) | FieldValue::Flag(false) => FieldValue::Null,
            other => other,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn has_value(&self) -> bool {
        !self.clone().normalized().is_missing()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Converts a scalar JSON value. Nested values are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(flag) => FieldValue::Flag(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => FieldValue::Number(integer),
                None => FieldValue::Text(number.to_string()),
            },
            Value::String(text) => FieldValue::Text(text.clone()),
            nested => FieldValue::Text(nested.to_string()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Number)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Text)
    }
}

/// Normalized set of profile field writes produced by one section submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldUpdates(BTreeMap<&'static str, FieldValue>);

impl FieldUpdates {
    pub fn set(&mut self, field: &'static str, value: impl Into<FieldValue>) {
        self.0.insert(field, value.into().normalized());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// A field is missing when it was never written or holds no value.
    pub fn is_missing(&self, field: &str) -> bool {
        self.0.get(field).map_or(true, FieldValue::is_missing)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One normalized entry of a repeatable group (emergency contact, guardian, previous school).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildRow(BTreeMap<String, FieldValue>);

impl ChildRow {
    /// Builds a row with every falsy value replaced by `Null`.
    pub fn from_entry(entry: &Map<String, Value>) -> Self {
        Self(
            entry
                .iter()
                .map(|(key, value)| (key.clone(), FieldValue::from_json(value).normalized()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(FieldValue::as_text)
    }

    pub fn has_value(&self) -> bool {
        self.0.values().any(FieldValue::has_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl<const N: usize> From<[(&str, FieldValue); N]> for ChildRow {
    fn from(entries: [(&str, FieldValue); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }
}

/// Normalizes submitted rows and silently drops those left without any value.
pub fn normalize_rows(entries: &[Map<String, Value>]) -> Vec<ChildRow> {
    entries
        .iter()
        .map(ChildRow::from_entry)
        .filter(ChildRow::has_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object entry")
    }

    #[test]
    fn falsy_values_normalize_to_null() {
        assert_eq!(FieldValue::from("").normalized(), FieldValue::Null);
        assert_eq!(FieldValue::Number(0).normalized(), FieldValue::Null);
        assert_eq!(FieldValue::Flag(false).normalized(), FieldValue::Null);
        assert_eq!(
            FieldValue::from("O+").normalized(),
            FieldValue::Text("O+".to_string())
        );
    }

    #[test]
    fn updates_store_normalized_values() {
        let mut updates = FieldUpdates::default();
        updates.set("city", "");
        updates.set("tnc_check", false);
        updates.set("country_id", Some(104));

        assert!(updates.contains("city"));
        assert!(updates.is_missing("city"));
        assert!(updates.is_missing("tnc_check"));
        assert!(!updates.is_missing("country_id"));
        assert!(updates.is_missing("never_written"));
    }

    #[test]
    fn empty_rows_are_dropped() {
        let rows = normalize_rows(&[
            entry(json!({ "name": "", "phone": "" })),
            entry(json!({ "name": "Meera", "phone": "", "date_from": "" })),
            entry(json!({})),
        ]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name"), Some("Meera"));
        assert_eq!(rows[0].get("phone"), Some(&FieldValue::Null));
        assert_eq!(rows[0].get("date_from"), Some(&FieldValue::Null));
    }
}
