use serde_json::{Map, Value};

/// Key that carries the submitted section index.
pub const SECTION_NUMBER_KEY: &str = "section_number";
/// Key distinguishing a deliberate section save from an autosave.
pub const SECTION_SAVE_KEY: &str = "is_section_save";

/// Flat view over a section request body keyed by the form's external (camelCase) names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    values: Map<String, Value>,
}

/// Raised when a request body is not a JSON object.
#[derive(Debug, thiserror::Error)]
#[error("payload must be a JSON object, found {found}")]
pub struct PayloadShapeError {
    pub found: &'static str,
}

impl Payload {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn from_value(value: Value) -> Result<Self, PayloadShapeError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(PayloadShapeError {
                found: json_kind(&other),
            }),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value of a key; absent or falsy values read as the empty string.
    pub fn text(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(value) if is_truthy(value) => match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            _ => String::new(),
        }
    }

    /// Integer value of a key; anything that is not a whole number reads as `None`.
    pub fn number(&self, key: &str) -> Option<i64> {
        let value = self.values.get(key).filter(|value| is_truthy(value))?;
        match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            Value::Bool(true) => Some(1),
            _ => None,
        }
    }

    /// Boolean value of a key: JSON booleans pass through, `"yes"`/`"no"` tokens map to
    /// `true`/`false`, everything else is `false`.
    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(token)) => token == "yes",
            _ => false,
        }
    }

    /// Repeatable group rows. Entries that are not objects are ignored.
    pub fn rows(&self, key: &str) -> Vec<Map<String, Value>> {
        match self.values.get(key) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.as_object().cloned())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn section_number(&self) -> Option<i64> {
        self.number(SECTION_NUMBER_KEY)
    }

    pub fn is_section_save(&self) -> bool {
        match self.values.get(SECTION_SAVE_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(token)) => matches!(token.as_str(), "true" | "yes" | "1"),
            Some(Value::Number(number)) => number.as_i64().map_or(false, |value| value != 0),
            _ => false,
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

/// Truthiness the way form posts are read: null, false, zero and empty values are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |float| float != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
