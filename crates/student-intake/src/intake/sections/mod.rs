//! Typed mapping of each form section from its external payload to profile field writes.
//!
//! Every section is a struct whose conditional groups are `Option`s populated only when the
//! answers that activate them are present, paired with a declarative mandatory-field table.

mod academic;
mod family;
mod health;
mod personal;

pub use academic::{AcademicSection, CurrentSchool};
pub use family::{BillingDetails, CustodyArrangement, FamilySection, ParentDetails};
pub use health::{EyePower, GatedDetail, HealthSection, VACCINE_FIELDS};
pub use personal::{IdProofDetails, MobileContact, PersonalSection, SiblingDetails};

use serde::{Deserialize, Serialize};

use super::collections::CollectionInput;
use super::documents::DocumentRequest;
use super::fields::FieldUpdates;
use super::payload::Payload;
use super::rules::Requirement;

/// The four independently submittable groupings of the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Personal,
    Academic,
    Health,
    Family,
}

impl Section {
    pub const COUNT: usize = 4;
    pub const ALL: [Section; Section::COUNT] = [
        Section::Personal,
        Section::Academic,
        Section::Health,
        Section::Family,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(Section::Personal),
            2 => Some(Section::Academic),
            3 => Some(Section::Health),
            4 => Some(Section::Family),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            Section::Personal => 1,
            Section::Academic => 2,
            Section::Health => 3,
            Section::Family => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Section::Personal => "personal information",
            Section::Academic => "academic information",
            Section::Health => "health information",
            Section::Family => "parents, guardians and billing",
        }
    }
}

/// Contract shared by the section mappings.
pub trait SectionForm: Sized {
    const SECTION: Section;

    /// Reads the section's answers; conditional groups are only populated when activated.
    fn from_payload(payload: &Payload) -> Self;

    /// Field writes for every mapped field, including activated conditional ones.
    fn write_updates(&self, updates: &mut FieldUpdates);

    /// Mandatory-field table enforced on section saves.
    fn requirements() -> Vec<Requirement<Self>>;

    fn documents(&self, _is_section_save: bool) -> Vec<DocumentRequest> {
        Vec::new()
    }

    fn collections(&self, _is_section_save: bool) -> Vec<CollectionInput> {
        Vec::new()
    }
}
