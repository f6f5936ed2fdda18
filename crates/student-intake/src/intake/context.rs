use std::collections::BTreeMap;

use serde::Serialize;

use super::documents::DocumentSlot;
use super::fields::{ChildRow, FieldValue};
use super::options::SelectionOptions;
use super::registration::{ApplicationStage, ProfileId, Registration, RegistrationId};
use super::repository::{Attachment, ProfileRecord, SectionFlags};

/// What the profile form needs to render: dropdowns plus the actor's current answers.
#[derive(Debug, Clone, Serialize)]
pub struct FormContext {
    pub options: SelectionOptions,
    pub registration: RegistrationSummary,
    pub profile: ProfileSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationSummary {
    pub id: RegistrationId,
    pub name: String,
    pub stage: ApplicationStage,
}

impl From<&Registration> for RegistrationSummary {
    fn from(registration: &Registration) -> Self {
        Self {
            id: registration.id.clone(),
            name: registration.name.clone(),
            stage: registration.stage,
        }
    }
}

/// Read view of a profile with the primary and secondary emergency contacts split out.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSnapshot {
    pub id: ProfileId,
    pub section_submitted: Option<u8>,
    pub sections: SectionFlags,
    pub fields: BTreeMap<String, FieldValue>,
    pub previous_schools: Vec<ChildRow>,
    pub emergency_contacts: Vec<ChildRow>,
    pub guardians: Vec<ChildRow>,
    pub primary_emergency_contact: Option<ChildRow>,
    pub secondary_emergency_contact: Option<ChildRow>,
    pub attachments: BTreeMap<DocumentSlot, Attachment>,
}

fn contact_of_type(contacts: &[ChildRow], emergency_type: &str) -> Option<ChildRow> {
    // The last matching row wins when the form sent duplicates.
    contacts
        .iter()
        .rev()
        .find(|row| row.text("emergency_type") == Some(emergency_type))
        .cloned()
}

impl From<&ProfileRecord> for ProfileSnapshot {
    fn from(record: &ProfileRecord) -> Self {
        Self {
            id: record.id.clone(),
            section_submitted: record.section_submitted,
            sections: record.sections,
            fields: record.fields.clone(),
            previous_schools: record.previous_schools.clone(),
            emergency_contacts: record.emergency_contacts.clone(),
            guardians: record.guardians.clone(),
            primary_emergency_contact: contact_of_type(&record.emergency_contacts, "primary"),
            secondary_emergency_contact: contact_of_type(&record.emergency_contacts, "secondary"),
            attachments: record.attachments.clone(),
        }
    }
}

impl FormContext {
    pub fn new(registration: &Registration, record: &ProfileRecord) -> Self {
        Self {
            options: SelectionOptions::standard(),
            registration: RegistrationSummary::from(registration),
            profile: ProfileSnapshot::from(record),
        }
    }
}
