use super::{Section, SectionForm};
use crate::intake::documents::{DocumentRequest, DocumentSlot, Upload};
use crate::intake::fields::FieldUpdates;
use crate::intake::payload::Payload;
use crate::intake::rules::{is_yes, Requirement};

/// Section 1: identity, address, languages, siblings and identity proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalSection {
    pub full_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub nationality_id: Option<i64>,
    pub country_of_residence_id: Option<i64>,
    pub country_of_birth_id: Option<i64>,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state_id: Option<i64>,
    pub area_code: String,
    pub country_id: Option<i64>,
    pub identification_mark_1: String,
    pub identification_mark_2: String,
    pub religion: String,
    pub community: String,
    pub phone: String,
    pub phone_country_code: String,
    pub has_name_changed: String,
    pub previous_name: String,
    pub is_mobile_same_as_phone: String,
    pub has_sibling_in_ihs: String,
    pub mother_tongue: String,
    pub second_language: String,
    pub third_language: String,
    pub id_proof_type: String,
    /// Set when `gender` is `other`.
    pub other_gender: Option<String>,
    /// Set when `religion` is `other`.
    pub other_religion: Option<String>,
    /// Set when `community` is `other`.
    pub other_community: Option<String>,
    /// Set when the mobile-same-as-phone answer is `yes` (mirrored) or `no` (read separately).
    pub mobile: Option<MobileContact>,
    /// Set when `has_sibling_in_ihs` is `yes`.
    pub sibling: Option<SiblingDetails>,
    /// Set for the `aadhaar` and `passport` proof types.
    pub id_proof: Option<IdProofDetails>,
    pub recent_photograph: Upload,
    pub birth_certificate: Upload,
    pub id_proof_document: Upload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileContact {
    pub mobile: String,
    pub mobile_country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingDetails {
    pub full_name: String,
    pub grade_status: String,
    pub school_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdProofDetails {
    Aadhaar {
        aadhaar_number: String,
    },
    Passport {
        passport_number: String,
        place_of_issue: String,
        date_of_issue: String,
        date_of_expiry: String,
    },
}

fn when_other(selector: &str, payload: &Payload, key: &str) -> Option<String> {
    (selector == "other").then(|| payload.text(key))
}

impl SectionForm for PersonalSection {
    const SECTION: Section = Section::Personal;

    fn from_payload(payload: &Payload) -> Self {
        let gender = payload.text("gender");
        let religion = payload.text("religion");
        let community = payload.text("community");
        let phone = payload.text("phoneNumber");
        let phone_country_code = payload.text("phoneCountryCode");
        let is_mobile_same_as_phone = payload.text("sameWhatsappNumber");
        let has_sibling_in_ihs = payload.text("hasSiblingInIhs");
        let id_proof_type = payload.text("idProofType");

        let mobile = match is_mobile_same_as_phone.as_str() {
            "yes" => Some(MobileContact {
                mobile: phone.clone(),
                mobile_country_code: phone_country_code.clone(),
            }),
            "no" => Some(MobileContact {
                mobile: payload.text("mobileNumber"),
                mobile_country_code: payload.text("mobileCountryCode"),
            }),
            _ => None,
        };

        let sibling = is_yes(&has_sibling_in_ihs).then(|| SiblingDetails {
            full_name: payload.text("sibling1FullName"),
            grade_status: payload.text("sibling1GradeStatus"),
            school_name: payload.text("sibling1SchoolName"),
        });

        let id_proof = match id_proof_type.as_str() {
            "aadhaar" => Some(IdProofDetails::Aadhaar {
                aadhaar_number: payload.text("aadhaarNumber"),
            }),
            "passport" => Some(IdProofDetails::Passport {
                passport_number: payload.text("passportNumber"),
                place_of_issue: payload.text("placeOfIssue"),
                date_of_issue: payload.text("dateOfIssue"),
                date_of_expiry: payload.text("dateOfExpiry"),
            }),
            _ => None,
        };

        Self {
            full_name: payload.text("fullName"),
            other_gender: when_other(&gender, payload, "otherGender"),
            other_religion: when_other(&religion, payload, "otherReligion"),
            other_community: when_other(&community, payload, "otherCommunity"),
            gender,
            date_of_birth: payload.text("dateOfBirth"),
            nationality_id: payload.number("nationalityId"),
            country_of_residence_id: payload.number("countryOfResidenceId"),
            country_of_birth_id: payload.number("countryOfBirthId"),
            address_line_1: payload.text("addressLine1"),
            address_line_2: payload.text("addressLine2"),
            city: payload.text("city"),
            state_id: payload.number("stateId"),
            area_code: payload.text("areaCode"),
            country_id: payload.number("countryId"),
            identification_mark_1: payload.text("identificationMark1"),
            identification_mark_2: payload.text("identificationMark2"),
            religion,
            community,
            phone,
            phone_country_code,
            has_name_changed: payload.text("nameChanged"),
            previous_name: payload.text("previousName"),
            is_mobile_same_as_phone,
            has_sibling_in_ihs,
            mother_tongue: payload.text("motherTongue"),
            second_language: payload.text("secondLanguage"),
            third_language: payload.text("thirdLanguage"),
            id_proof_type,
            mobile,
            sibling,
            id_proof,
            recent_photograph: Upload::read(payload, DocumentSlot::RecentPhotograph),
            birth_certificate: Upload::read(payload, DocumentSlot::BirthCertificate),
            id_proof_document: Upload::read(payload, DocumentSlot::IdProofDocument),
        }
    }

    fn write_updates(&self, updates: &mut FieldUpdates) {
        updates.set("full_name", self.full_name.as_str());
        updates.set("gender", self.gender.as_str());
        updates.set("date_of_birth", self.date_of_birth.as_str());
        updates.set("nationality_id", self.nationality_id);
        updates.set("country_of_residence_id", self.country_of_residence_id);
        updates.set("country_of_birth_id", self.country_of_birth_id);
        updates.set("address_line_1", self.address_line_1.as_str());
        updates.set("address_line_2", self.address_line_2.as_str());
        updates.set("city", self.city.as_str());
        updates.set("state_id", self.state_id);
        updates.set("area_code", self.area_code.as_str());
        updates.set("country_id", self.country_id);
        updates.set("identification_mark_1", self.identification_mark_1.as_str());
        updates.set("identification_mark_2", self.identification_mark_2.as_str());
        updates.set("religion", self.religion.as_str());
        updates.set("community", self.community.as_str());
        updates.set("phone", self.phone.as_str());
        updates.set("phone_country_code", self.phone_country_code.as_str());
        updates.set("has_name_changed", self.has_name_changed.as_str());
        updates.set("previous_name", self.previous_name.as_str());
        updates.set("is_mobile_same_as_phone", self.is_mobile_same_as_phone.as_str());
        updates.set("has_sibling_in_ihs", self.has_sibling_in_ihs.as_str());
        updates.set("mother_tongue", self.mother_tongue.as_str());
        updates.set("second_language", self.second_language.as_str());
        updates.set("third_language", self.third_language.as_str());
        updates.set("id_proof_type", self.id_proof_type.as_str());

        if let Some(other_gender) = &self.other_gender {
            updates.set("other_gender", other_gender.as_str());
        }
        if let Some(other_religion) = &self.other_religion {
            updates.set("other_religion", other_religion.as_str());
        }
        if let Some(other_community) = &self.other_community {
            updates.set("other_community", other_community.as_str());
        }

        if let Some(mobile) = &self.mobile {
            updates.set("mobile", mobile.mobile.as_str());
            updates.set("mobile_country_code", mobile.mobile_country_code.as_str());
        }

        if let Some(sibling) = &self.sibling {
            updates.set("sibling_1_full_name", sibling.full_name.as_str());
            updates.set("sibling_1_grade_status", sibling.grade_status.as_str());
            updates.set("sibling_1_school_name", sibling.school_name.as_str());
        }

        match &self.id_proof {
            Some(IdProofDetails::Aadhaar { aadhaar_number }) => {
                updates.set("aadhaar_number", aadhaar_number.as_str());
            }
            Some(IdProofDetails::Passport {
                passport_number,
                place_of_issue,
                date_of_issue,
                date_of_expiry,
            }) => {
                updates.set("passport_number", passport_number.as_str());
                updates.set("place_of_issue", place_of_issue.as_str());
                updates.set("date_of_issue", date_of_issue.as_str());
                updates.set("date_of_expiry", date_of_expiry.as_str());
            }
            None => {}
        }
    }

    fn requirements() -> Vec<Requirement<Self>> {
        vec![
            Requirement::always("full_name"),
            Requirement::always("gender"),
            Requirement::always("date_of_birth"),
            Requirement::always("nationality_id"),
            Requirement::always("country_of_residence_id"),
            Requirement::always("country_of_birth_id"),
            Requirement::always("address_line_1"),
            Requirement::always("city"),
            Requirement::always("area_code"),
            Requirement::always("country_id"),
            Requirement::always("identification_mark_1"),
            Requirement::always("religion"),
            Requirement::always("community"),
            Requirement::always("phone"),
            Requirement::always("phone_country_code"),
            Requirement::always("mother_tongue"),
            Requirement::when("other_gender", |form: &Self| form.gender == "other"),
            Requirement::when("other_religion", |form: &Self| form.religion == "other"),
            Requirement::when("other_community", |form: &Self| form.community == "other"),
            Requirement::when("previous_name", |form: &Self| {
                is_yes(&form.has_name_changed)
            }),
            Requirement::when("mobile", |form: &Self| form.is_mobile_same_as_phone == "no"),
            Requirement::when("mobile_country_code", |form: &Self| {
                form.is_mobile_same_as_phone == "no"
            }),
            Requirement::when("sibling_1_full_name", |form: &Self| {
                is_yes(&form.has_sibling_in_ihs)
            }),
            Requirement::when("sibling_1_grade_status", |form: &Self| {
                is_yes(&form.has_sibling_in_ihs)
            }),
        ]
    }

    fn documents(&self, is_section_save: bool) -> Vec<DocumentRequest> {
        vec![
            DocumentRequest {
                slot: DocumentSlot::RecentPhotograph,
                upload: self.recent_photograph.clone(),
                required: is_section_save,
            },
            DocumentRequest {
                slot: DocumentSlot::BirthCertificate,
                upload: self.birth_certificate.clone(),
                required: is_section_save,
            },
            DocumentRequest {
                slot: DocumentSlot::IdProofDocument,
                upload: self.id_proof_document.clone(),
                required: is_section_save,
            },
        ]
    }
}
