use serde::Serialize;

use super::collections::{reconcile, ChildCollection, CollectionPlan, EmptyCollection};
use super::documents::{DocumentSlot, DocumentWrite, Upload};
use super::fields::FieldUpdates;
use super::payload::Payload;
use super::rules::missing_fields;
use super::sections::{
    AcademicSection, FamilySection, HealthSection, PersonalSection, Section, SectionForm,
};

/// Default ceiling for a single decoded upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// One section submission as received from the portal.
#[derive(Debug, Clone)]
pub struct SectionRequest {
    pub section_number: Option<i64>,
    pub is_section_save: bool,
    pub payload: Payload,
}

impl SectionRequest {
    /// Reads the section index and save flag from the body itself.
    pub fn from_payload(payload: Payload) -> Self {
        Self {
            section_number: payload.section_number(),
            is_section_save: payload.is_section_save(),
            payload,
        }
    }
}

/// Everything a valid submission writes to a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutcome {
    pub section: Section,
    pub is_section_save: bool,
    pub updates: FieldUpdates,
    pub collections: Vec<CollectionPlan>,
    #[serde(skip)]
    pub documents: Vec<DocumentWrite>,
}

impl SectionOutcome {
    pub fn document_slots(&self) -> Vec<DocumentSlot> {
        self.documents.iter().map(|write| write.slot).collect()
    }
}

/// A single user-correctable problem with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingFields(Vec<&'static str>),
    MissingDocument(DocumentSlot),
    EmptyDocument(DocumentSlot),
    UnreadableDocument { slot: DocumentSlot, reason: String },
    DocumentTooLarge { slot: DocumentSlot, size: usize, limit: usize },
    EmptyCollection(ChildCollection),
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::MissingFields(fields) => write!(
                f,
                "Please enter values for following mandatory fields: {}",
                fields.join(", ")
            ),
            ValidationIssue::MissingDocument(slot) => {
                write!(f, "Missing {} file", slot.field_name())
            }
            ValidationIssue::EmptyDocument(slot) => write!(f, "Empty {} file", slot.field_name()),
            ValidationIssue::UnreadableDocument { slot, reason } => {
                write!(f, "Unreadable {} file: {reason}", slot.field_name())
            }
            ValidationIssue::DocumentTooLarge { slot, size, limit } => write!(
                f,
                "File {} is too large ({size} bytes, limit {limit})",
                slot.field_name()
            ),
            ValidationIssue::EmptyCollection(collection) => {
                write!(f, "Missing values for {} section", collection.label())
            }
        }
    }
}

/// Every issue found in one submission; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub section: Section,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    pub fn message(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn missing_fields(&self) -> &[&'static str] {
        self.issues
            .iter()
            .find_map(|issue| match issue {
                ValidationIssue::MissingFields(fields) => Some(fields.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationFailure {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid section number")]
    InvalidSection(Option<i64>),
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

/// Turns a section request into a validated [`SectionOutcome`] without touching storage.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionProcessor {
    max_upload_bytes: usize,
}

impl Default for SubmissionProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl SubmissionProcessor {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn process(&self, request: &SectionRequest) -> Result<SectionOutcome, SubmissionError> {
        let section = request
            .section_number
            .and_then(Section::from_index)
            .ok_or(SubmissionError::InvalidSection(request.section_number))?;

        match section {
            Section::Personal => self.run::<PersonalSection>(request),
            Section::Academic => self.run::<AcademicSection>(request),
            Section::Health => self.run::<HealthSection>(request),
            Section::Family => self.run::<FamilySection>(request),
        }
    }

    fn run<S: SectionForm>(
        &self,
        request: &SectionRequest,
    ) -> Result<SectionOutcome, SubmissionError> {
        let is_section_save = request.is_section_save;
        let form = S::from_payload(&request.payload);

        let mut updates = FieldUpdates::default();
        form.write_updates(&mut updates);

        let mut issues = Vec::new();
        if is_section_save {
            let missing = missing_fields(&form, &S::requirements(), &updates);
            if !missing.is_empty() {
                issues.push(ValidationIssue::MissingFields(missing));
            }
        }

        let mut documents = Vec::new();
        for document in form.documents(is_section_save) {
            match document.upload {
                Upload::File(file) if file.size() > self.max_upload_bytes => {
                    issues.push(ValidationIssue::DocumentTooLarge {
                        slot: document.slot,
                        size: file.size(),
                        limit: self.max_upload_bytes,
                    });
                }
                Upload::File(file) => documents.push(DocumentWrite {
                    slot: document.slot,
                    file,
                }),
                Upload::Unreadable(reason) => issues.push(ValidationIssue::UnreadableDocument {
                    slot: document.slot,
                    reason,
                }),
                Upload::Absent if document.required => {
                    issues.push(ValidationIssue::MissingDocument(document.slot));
                }
                Upload::Empty if document.required => {
                    issues.push(ValidationIssue::EmptyDocument(document.slot));
                }
                Upload::Absent | Upload::Empty => {}
            }
        }

        let mut collections = Vec::new();
        for input in form.collections(is_section_save) {
            match reconcile(input) {
                Ok(plan) => collections.push(plan),
                Err(EmptyCollection(collection)) => {
                    issues.push(ValidationIssue::EmptyCollection(collection));
                }
            }
        }

        if !issues.is_empty() {
            tracing::debug!(
                section = S::SECTION.index(),
                issues = issues.len(),
                "section submission rejected"
            );
            return Err(ValidationFailure {
                section: S::SECTION,
                issues,
            }
            .into());
        }

        Ok(SectionOutcome {
            section: S::SECTION,
            is_section_save,
            updates,
            collections,
            documents,
        })
    }
}
