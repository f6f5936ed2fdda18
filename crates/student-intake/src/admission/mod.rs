//! Public admission intake: the unauthenticated enquiry form posted by the marketing site.

pub mod prepare;
pub mod repository;
pub mod router;
pub mod service;

pub use prepare::{prepare_admission, AdmissionRecord, MissingRequiredFields};
pub use repository::{AdmissionId, AdmissionRepository};
pub use router::admission_router;
pub use service::{AdmissionError, AdmissionService};
