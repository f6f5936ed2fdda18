use std::sync::Arc;

use serde_json::Value;

use super::prepare::{prepare_admission, MissingRequiredFields};
use super::repository::{AdmissionId, AdmissionRepository};
use crate::intake::processor::DEFAULT_MAX_UPLOAD_BYTES;
use crate::intake::repository::RepositoryError;

pub struct AdmissionService<R> {
    repository: Arc<R>,
    max_upload_bytes: usize,
}

impl<R> AdmissionService<R>
where
    R: AdmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Size of the largest file an enquiry may attach to each binary field.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Parses a raw request body and stores the resulting admission.
    pub fn create(&self, body: &[u8]) -> Result<AdmissionId, AdmissionError> {
        let values = match serde_json::from_slice::<Value>(body)? {
            Value::Object(values) => values,
            _ => return Err(AdmissionError::NotAnObject),
        };
        tracing::info!(fields = values.len(), "admission received");

        let record = prepare_admission(values)?;
        let id = self.repository.create(record)?;
        tracing::info!(admission = id.0, "admission stored");
        Ok(id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("JSON body must be an object")]
    NotAnObject,
    #[error(transparent)]
    MissingFields(#[from] MissingRequiredFields),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
