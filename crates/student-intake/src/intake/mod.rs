//! Student profile intake: the four-section profile form, its validation rules, and the
//! registration lifecycle that owns each profile.
//!
//! A section submission flows through [`processor::SubmissionProcessor`], which maps the
//! payload into typed section structs, evaluates the mandatory-field table on section saves,
//! and plans child-collection replacements and document writes. Nothing is persisted until the
//! whole submission validates; [`repository::ProfileRepository::apply`] then stores the outcome
//! in one call.

pub mod collections;
pub mod context;
pub mod documents;
pub mod fields;
pub mod options;
pub mod payload;
pub mod processor;
pub mod registration;
pub mod repository;
pub mod router;
pub mod rules;
pub mod sections;
pub mod service;

#[cfg(test)]
mod tests;

pub use collections::{ChildCollection, CollectionChange, CollectionPlan};
pub use context::{FormContext, ProfileSnapshot, RegistrationSummary};
pub use documents::{
    request_body_limit, DocumentSlot, DocumentWrite, Upload, UploadedFile, MAX_SECTION_UPLOADS,
};
pub use fields::{ChildRow, FieldUpdates, FieldValue};
pub use options::{SelectOption, SelectionOptions};
pub use payload::{Payload, PayloadShapeError};
pub use processor::{
    SectionOutcome, SectionRequest, SubmissionError, SubmissionProcessor, ValidationFailure,
    ValidationIssue, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use registration::{
    ActorId, ApplicationStage, LifecycleAction, LifecycleError, ProfileId, Registration,
    RegistrationDraft, RegistrationId,
};
pub use repository::{
    Attachment, Notification, NotificationError, Notifier, ProfileRecord, ProfileRepository,
    RegistrationRepository, RepositoryError, SectionFlags,
};
pub use router::{intake_router, ACTOR_HEADER};
pub use sections::Section;
pub use service::{IntakeServiceError, StudentIntakeService};
