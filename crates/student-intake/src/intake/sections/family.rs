use super::{Section, SectionForm};
use crate::intake::collections::{ChildCollection, CollectionInput};
use crate::intake::documents::{DocumentRequest, DocumentSlot, Upload};
use crate::intake::fields::{normalize_rows, ChildRow, FieldUpdates};
use crate::intake::payload::Payload;
use crate::intake::rules::{is_yes, Requirement};

const APPLICANT_RESPONSES: [&str; 7] = [
    "q1_applicant_response",
    "q2_applicant_response",
    "q3_applicant_response",
    "q4_applicant_response",
    "q5_applicant_response",
    "q6_applicant_response",
    "q7_applicant_response",
];

const PARENT_RESPONSES: [&str; 6] = [
    "q1_parent_response",
    "q2_parent_response",
    "q3_parent_response",
    "q4_parent_response",
    "q5_parent_response",
    "q6_parent_response",
];

const MOTHER_FIELDS: [&str; 5] = [
    "mother_full_name",
    "mother_email",
    "mother_phone",
    "mother_occupation",
    "mother_education",
];

const FATHER_FIELDS: [&str; 5] = [
    "father_full_name",
    "father_email",
    "father_phone",
    "father_occupation",
    "father_education",
];

const GROUP_FIELDS: [(&str, &str); 4] = [
    ("group_a", "groupA"),
    ("group_b", "groupB"),
    ("group_c", "groupC"),
    ("group_d", "groupD"),
];

/// Section 4: parents, billing contact, declaration, emergency contacts and guardians.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilySection {
    pub mother: ParentDetails,
    pub father: ParentDetails,
    pub parent_marital_status: String,
    pub parents_are_guardians: String,
    pub billing: BillingDetails,
    /// Senior-grade subject group preferences, aligned with `group_a`..`group_d`.
    pub groups: [String; 4],
    pub applicant_responses: [String; 7],
    pub parent_responses: [String; 6],
    pub tnc_check: bool,
    pub declaration_date: String,
    pub declaration_place: String,
    /// Set when parents are separated or divorced.
    pub custody: Option<CustodyArrangement>,
    pub emergency_contacts: Vec<ChildRow>,
    pub guardians: Vec<ChildRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub occupation: String,
    pub education: String,
}

impl ParentDetails {
    fn read(payload: &Payload, prefix: &str) -> Self {
        let key = |suffix: &str| format!("{prefix}{suffix}");
        Self {
            full_name: payload.text(&key("FullName")),
            email: payload.text(&key("Email")),
            phone: payload.text(&key("Phone")),
            occupation: payload.text(&key("Occupation")),
            education: payload.text(&key("Education")),
        }
    }

    /// Writes name, email, phone, occupation and education under the given storage names.
    fn write(&self, fields: [&'static str; 5], updates: &mut FieldUpdates) {
        let [full_name, email, phone, occupation, education] = fields;
        updates.set(full_name, self.full_name.as_str());
        updates.set(email, self.email.as_str());
        updates.set(phone, self.phone.as_str());
        updates.set(occupation, self.occupation.as_str());
        updates.set(education, self.education.as_str());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub country_id: Option<i64>,
    pub area_code: String,
    pub city: String,
    pub state_id: Option<i64>,
    pub address_l1: String,
    pub address_l2: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodyArrangement {
    pub tuition_payer: String,
    pub communication_recipient: String,
    pub report_card_recipient: String,
    pub visit_rights: String,
    pub court_order_document: Upload,
    pub legal_rights_document: Upload,
}

fn has_custody_arrangement(form: &FamilySection) -> bool {
    form.custody.is_some()
}

impl SectionForm for FamilySection {
    const SECTION: Section = Section::Family;

    fn from_payload(payload: &Payload) -> Self {
        let parent_marital_status = payload.text("parentMaritalStatus");
        let custody = matches!(parent_marital_status.as_str(), "separated" | "divorced").then(|| {
            CustodyArrangement {
                tuition_payer: payload.text("whoPaysTuitionFee"),
                communication_recipient: payload.text("whoReceivesSchoolCommunication"),
                report_card_recipient: payload.text("whoReceivesReportCards"),
                visit_rights: payload.text("visitRights"),
                court_order_document: Upload::read(payload, DocumentSlot::CourtOrderDocument),
                legal_rights_document: Upload::read(payload, DocumentSlot::LegalRightsDocument),
            }
        });

        Self {
            mother: ParentDetails::read(payload, "mother"),
            father: ParentDetails::read(payload, "father"),
            parent_marital_status,
            parents_are_guardians: payload.text("parentsAreGuardians"),
            billing: BillingDetails {
                name: payload.text("billingName"),
                phone: payload.text("billingPhone"),
                email: payload.text("billingEmail"),
                country_id: payload.number("billingCountryId"),
                area_code: payload.text("billingAreaCode"),
                city: payload.text("billingCity"),
                state_id: payload.number("billingStateId"),
                address_l1: payload.text("billingAddressL1"),
                address_l2: payload.text("billingAddressL2"),
            },
            groups: GROUP_FIELDS.map(|(_, key)| payload.text(key)),
            applicant_responses: std::array::from_fn(|index| {
                payload.text(&format!("q{}ApplicantResponse", index + 1))
            }),
            parent_responses: std::array::from_fn(|index| {
                payload.text(&format!("q{}ParentResponse", index + 1))
            }),
            tnc_check: payload.flag("tncCheck"),
            declaration_date: payload.text("declarationDate"),
            declaration_place: payload.text("declarationPlace"),
            custody,
            emergency_contacts: normalize_rows(
                &payload.rows(ChildCollection::EmergencyContacts.payload_key()),
            ),
            guardians: normalize_rows(&payload.rows(ChildCollection::Guardians.payload_key())),
        }
    }

    fn write_updates(&self, updates: &mut FieldUpdates) {
        self.mother.write(MOTHER_FIELDS, updates);
        self.father.write(FATHER_FIELDS, updates);

        updates.set("parent_marital_status", self.parent_marital_status.as_str());
        updates.set("parents_are_guardians", self.parents_are_guardians.as_str());

        updates.set("billing_name", self.billing.name.as_str());
        updates.set("billing_phone", self.billing.phone.as_str());
        updates.set("billing_email", self.billing.email.as_str());
        updates.set("billing_country_id", self.billing.country_id);
        updates.set("billing_area_code", self.billing.area_code.as_str());
        updates.set("billing_city", self.billing.city.as_str());
        updates.set("billing_state_id", self.billing.state_id);
        updates.set("billing_address_l1", self.billing.address_l1.as_str());
        updates.set("billing_address_l2", self.billing.address_l2.as_str());
        updates.set("application_fee_status", "pending");

        for (&(field, _), choice) in GROUP_FIELDS.iter().zip(self.groups.iter()) {
            updates.set(field, choice.as_str());
        }
        for (&field, response) in APPLICANT_RESPONSES.iter().zip(self.applicant_responses.iter()) {
            updates.set(field, response.as_str());
        }
        for (&field, response) in PARENT_RESPONSES.iter().zip(self.parent_responses.iter()) {
            updates.set(field, response.as_str());
        }

        updates.set("tnc_check", self.tnc_check);
        updates.set("declaration_date", self.declaration_date.as_str());
        updates.set("declaration_place", self.declaration_place.as_str());

        if let Some(custody) = &self.custody {
            updates.set(
                "who_is_resposible_for_paying_applicants_tuition_fee",
                custody.tuition_payer.as_str(),
            );
            updates.set(
                "who_is_allowed_to_receive_school_communication",
                custody.communication_recipient.as_str(),
            );
            updates.set(
                "who_is_allowed_to_receive_report_cards",
                custody.report_card_recipient.as_str(),
            );
            updates.set("visit_rights", custody.visit_rights.as_str());
        }
    }

    fn requirements() -> Vec<Requirement<Self>> {
        vec![
            Requirement::always("mother_full_name"),
            Requirement::always("mother_phone"),
            Requirement::always("father_full_name"),
            Requirement::always("father_phone"),
            Requirement::always("parent_marital_status"),
            Requirement::always("parents_are_guardians"),
            Requirement::always("billing_name"),
            Requirement::always("billing_phone"),
            Requirement::always("billing_email"),
            Requirement::always("billing_country_id"),
            Requirement::always("billing_area_code"),
            Requirement::always("billing_city"),
            Requirement::always("billing_address_l1"),
            Requirement::always("tnc_check"),
            Requirement::always("declaration_date"),
            Requirement::always("declaration_place"),
            Requirement::when(
                "who_is_resposible_for_paying_applicants_tuition_fee",
                has_custody_arrangement,
            ),
            Requirement::when(
                "who_is_allowed_to_receive_school_communication",
                has_custody_arrangement,
            ),
            Requirement::when(
                "who_is_allowed_to_receive_report_cards",
                has_custody_arrangement,
            ),
            Requirement::when("visit_rights", has_custody_arrangement),
        ]
    }

    fn documents(&self, is_section_save: bool) -> Vec<DocumentRequest> {
        let Some(custody) = &self.custody else {
            return Vec::new();
        };

        vec![
            DocumentRequest {
                slot: DocumentSlot::CourtOrderDocument,
                upload: custody.court_order_document.clone(),
                required: is_section_save,
            },
            DocumentRequest {
                slot: DocumentSlot::LegalRightsDocument,
                upload: custody.legal_rights_document.clone(),
                required: is_section_save,
            },
        ]
    }

    fn collections(&self, is_section_save: bool) -> Vec<CollectionInput> {
        vec![
            CollectionInput {
                collection: ChildCollection::EmergencyContacts,
                rows: self.emergency_contacts.clone(),
                cleared: false,
                required: is_section_save,
            },
            CollectionInput {
                collection: ChildCollection::Guardians,
                rows: self.guardians.clone(),
                cleared: is_yes(&self.parents_are_guardians),
                required: is_section_save && self.parents_are_guardians == "no",
            },
        ]
    }
}
