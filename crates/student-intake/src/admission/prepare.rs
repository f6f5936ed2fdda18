use serde::Serialize;
use serde_json::{Map, Value};

use crate::intake::payload::is_truthy;

pub const REQUIRED_FIELDS: [&str; 4] = [
    "full_name",
    "application_year",
    "applied_for",
    "date_of_birth",
];

/// Upload fields carried inline as encoded strings.
pub const BINARY_FIELDS: [&str; 7] = [
    "recent_photograph",
    "birth_certificate",
    "id_proof_document",
    "vaccine_certificates",
    "medical_prescription",
    "court_order_document",
    "legal_rights_document",
];

/// Table-style inputs the admission record has no columns for.
pub const DROPPED_FIELDS: [&str; 5] = [
    "optional_language_table",
    "previous_schools",
    "guardian_information",
    "payment_program_links",
    "board_affiliation",
];

pub const DATE_FIELDS: [&str; 4] = ["date_of_birth", "date_of_issue", "date_of_expiry", "date"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required fields: {}", .0.join(", "))]
pub struct MissingRequiredFields(pub Vec<&'static str>);

/// Admission values ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AdmissionRecord {
    values: Map<String, Value>,
}

impl AdmissionRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Checks the required fields and cleans the form values for storage.
pub fn prepare_admission(
    mut values: Map<String, Value>,
) -> Result<AdmissionRecord, MissingRequiredFields> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !values.get(*field).is_some_and(is_truthy))
        .collect();
    if !missing.is_empty() {
        return Err(MissingRequiredFields(missing));
    }

    for field in BINARY_FIELDS {
        let has_content = match values.get_mut(field) {
            Some(value) if value.as_str() == Some("") => {
                *value = Value::Null;
                false
            }
            Some(value) => is_truthy(value),
            None => false,
        };

        let filename_field = format!("{field}_filename");
        if has_content && !values.contains_key(&filename_field) {
            tracing::warn!(field, "upload filename missing, using default");
            values.insert(filename_field, Value::String(format!("uploaded_{field}.bin")));
        }
    }

    for field in DROPPED_FIELDS {
        values.remove(field);
    }

    for field in DATE_FIELDS {
        if let Some(value) = values.get_mut(field) {
            if value.as_str() == Some("") {
                *value = Value::Null;
            }
        }
    }

    Ok(AdmissionRecord { values })
}
