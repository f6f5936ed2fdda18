use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::collections::{apply_change, ChildCollection};
use super::documents::{DocumentSlot, UploadedFile};
use super::fields::{ChildRow, FieldValue};
use super::processor::SectionOutcome;
use super::registration::{ActorId, ProfileId, Registration, RegistrationId};
use super::sections::Section;

/// Stored file bound to one profile slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl From<UploadedFile> for Attachment {
    fn from(file: UploadedFile) -> Self {
        Self {
            size: file.size(),
            file_name: file.file_name,
            mime_type: file.mime_type,
            content: file.content,
        }
    }
}

/// Per-section "submitted" markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFlags {
    pub personal: bool,
    pub academic: bool,
    pub health: bool,
    pub family: bool,
}

impl SectionFlags {
    pub fn mark(&mut self, section: Section) {
        match section {
            Section::Personal => self.personal = true,
            Section::Academic => self.academic = true,
            Section::Health => self.health = true,
            Section::Family => self.family = true,
        }
    }

    pub fn is_submitted(&self, section: Section) -> bool {
        match section {
            Section::Personal => self.personal,
            Section::Academic => self.academic,
            Section::Health => self.health,
            Section::Family => self.family,
        }
    }

    pub fn all_submitted(&self) -> bool {
        Section::ALL.iter().all(|section| self.is_submitted(*section))
    }
}

/// Applicant profile accumulated across section submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: ProfileId,
    pub registration_id: RegistrationId,
    pub fields: BTreeMap<String, FieldValue>,
    /// Index of the last section stored through a section save.
    pub section_submitted: Option<u8>,
    pub sections: SectionFlags,
    pub previous_schools: Vec<ChildRow>,
    pub emergency_contacts: Vec<ChildRow>,
    pub guardians: Vec<ChildRow>,
    pub attachments: BTreeMap<DocumentSlot, Attachment>,
}

impl ProfileRecord {
    pub fn new(id: ProfileId, registration_id: RegistrationId) -> Self {
        Self {
            id,
            registration_id,
            fields: BTreeMap::new(),
            section_submitted: None,
            sections: SectionFlags::default(),
            previous_schools: Vec::new(),
            emergency_contacts: Vec::new(),
            guardians: Vec::new(),
            attachments: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn collection(&self, collection: ChildCollection) -> &[ChildRow] {
        match collection {
            ChildCollection::PreviousSchools => &self.previous_schools,
            ChildCollection::EmergencyContacts => &self.emergency_contacts,
            ChildCollection::Guardians => &self.guardians,
        }
    }

    fn collection_mut(&mut self, collection: ChildCollection) -> &mut Vec<ChildRow> {
        match collection {
            ChildCollection::PreviousSchools => &mut self.previous_schools,
            ChildCollection::EmergencyContacts => &mut self.emergency_contacts,
            ChildCollection::Guardians => &mut self.guardians,
        }
    }

    /// Writes a validated outcome. Section flags move only on section saves.
    pub fn apply(&mut self, outcome: &SectionOutcome) {
        for (field, value) in outcome.updates.iter() {
            self.fields.insert(field.to_string(), value.clone());
        }
        for plan in &outcome.collections {
            apply_change(self.collection_mut(plan.collection), &plan.change);
        }
        for write in &outcome.documents {
            self.attachments
                .insert(write.slot, Attachment::from(write.file.clone()));
        }
        if outcome.is_section_save {
            self.sections.mark(outcome.section);
            self.section_submitted = Some(outcome.section.index());
        }
    }
}

/// Profile storage. `apply` must be atomic: readers never see half of an outcome.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, record: ProfileRecord) -> Result<ProfileRecord, RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, RepositoryError>;
    fn apply(
        &self,
        id: &ProfileId,
        outcome: &SectionOutcome,
    ) -> Result<ProfileRecord, RepositoryError>;
    fn remove(&self, id: &ProfileId) -> Result<(), RepositoryError>;
}

pub trait RegistrationRepository: Send + Sync {
    fn insert(&self, registration: Registration) -> Result<Registration, RepositoryError>;
    fn update(&self, registration: Registration) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError>;
    /// Most recently created active registration owned by `actor`.
    fn latest_active_for(&self, actor: &ActorId) -> Result<Option<Registration>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound e-mail hook for registration lifecycle events.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub registration_id: RegistrationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
