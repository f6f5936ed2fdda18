use serde::{Deserialize, Serialize};

use super::prepare::AdmissionRecord;
use crate::intake::repository::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdmissionId(pub u64);

/// Storage for admission enquiries.
pub trait AdmissionRepository: Send + Sync {
    fn create(&self, record: AdmissionRecord) -> Result<AdmissionId, RepositoryError>;
}
