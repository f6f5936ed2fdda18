use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::Payload;

/// Named attachment slots on a profile. Each slot holds at most one current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSlot {
    RecentPhotograph,
    BirthCertificate,
    IdProofDocument,
    VaccineCertificates,
    MedicalPrescription,
    CourtOrderDocument,
    LegalRightsDocument,
}

impl DocumentSlot {
    /// Storage field name of the slot.
    pub const fn field_name(self) -> &'static str {
        match self {
            DocumentSlot::RecentPhotograph => "recent_photograph",
            DocumentSlot::BirthCertificate => "birth_certificate",
            DocumentSlot::IdProofDocument => "id_proof_document",
            DocumentSlot::VaccineCertificates => "vaccine_certificates",
            DocumentSlot::MedicalPrescription => "medical_prescription",
            DocumentSlot::CourtOrderDocument => "court_order_document",
            DocumentSlot::LegalRightsDocument => "legal_rights_document",
        }
    }

    /// Key the form uses for the upload.
    pub const fn payload_key(self) -> &'static str {
        match self {
            DocumentSlot::RecentPhotograph => "recentPhotograph",
            DocumentSlot::BirthCertificate => "birthCertificate",
            DocumentSlot::IdProofDocument => "idProofDocument",
            DocumentSlot::VaccineCertificates => "vaccineCertificates",
            DocumentSlot::MedicalPrescription => "medicalPrescription",
            DocumentSlot::CourtOrderDocument => "courtOrderDocument",
            DocumentSlot::LegalRightsDocument => "legalRightsDocument",
        }
    }
}

/// Decoded upload ready to be stored in a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM)
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime_type,
            content,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// What arrived in the payload for one upload key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    Absent,
    Empty,
    Unreadable(String),
    File(UploadedFile),
}

impl Upload {
    pub fn read(payload: &Payload, slot: DocumentSlot) -> Self {
        Self::from_value(payload.raw(slot.payload_key()))
    }

    /// Reads an upload object of the form `{ "filename": "...", "content": "<base64>" }`.
    pub fn from_value(value: Option<&Value>) -> Self {
        let object = match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => return Upload::Absent,
            Some(Value::String(text)) if text.is_empty() => return Upload::Absent,
            Some(Value::Object(object)) => object,
            Some(_) => return Upload::Unreadable("expected an upload object".to_string()),
        };

        let file_name = object
            .get("filename")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("upload.bin");
        let encoded = match object.get("content") {
            None | Some(Value::Null) => return Upload::Empty,
            Some(Value::String(encoded)) => encoded.trim(),
            Some(_) => return Upload::Unreadable("content must be a base64 string".to_string()),
        };

        match general_purpose::STANDARD.decode(encoded) {
            Ok(content) if content.is_empty() => Upload::Empty,
            Ok(content) => Upload::File(UploadedFile::new(file_name, content)),
            Err(err) => Upload::Unreadable(err.to_string()),
        }
    }
}

/// An upload a section asks for, with whether this submission must carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub slot: DocumentSlot,
    pub upload: Upload,
    pub required: bool,
}

/// Attachment write produced by a successful submission. Overwrites the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWrite {
    pub slot: DocumentSlot,
    pub file: UploadedFile,
}

/// Most uploads a single section carries (section 1: photograph, birth certificate, id proof).
pub const MAX_SECTION_UPLOADS: usize = 3;

/// Room left in a request body for the non-file answers.
const FORM_FIELDS_ALLOWANCE: usize = 1024 * 1024;

/// Body size that fits `uploads` base64-encoded files of `max_upload_bytes` each.
pub fn request_body_limit(max_upload_bytes: usize, uploads: usize) -> usize {
    max_upload_bytes
        .saturating_mul(uploads)
        .saturating_mul(4)
        .div_ceil(3)
        .saturating_add(FORM_FIELDS_ALLOWANCE)
}
