use super::{Section, SectionForm};
use crate::intake::collections::{ChildCollection, CollectionInput};
use crate::intake::fields::{normalize_rows, ChildRow, FieldUpdates};
use crate::intake::payload::Payload;
use crate::intake::rules::{is_yes, Requirement};

/// Section 2: schooling history and learning profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicSection {
    pub is_home_schooled: String,
    pub was_ever_home_schooled: String,
    pub been_to_school_previously: String,
    pub academic_strengths_and_weaknesses: String,
    pub hobbies_interests_and_extra_curricular_activities: String,
    pub other_details_of_importance: String,
    pub temperament_and_personality: String,
    pub special_learning_needs_or_learning_disability: String,
    pub emis_id: String,
    /// Set when the applicant is not home-schooled.
    pub current_school: Option<CurrentSchool>,
    pub previous_schools: Vec<ChildRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSchool {
    pub name: String,
    pub board_affiliation: String,
    pub phone: String,
    pub email: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state_id: Option<i64>,
    pub area_code: String,
    pub country_id: Option<i64>,
}

fn attends_school(form: &AcademicSection) -> bool {
    form.is_home_schooled == "no"
}

impl SectionForm for AcademicSection {
    const SECTION: Section = Section::Academic;

    fn from_payload(payload: &Payload) -> Self {
        let is_home_schooled = payload.text("isHomeSchooled");
        let current_school = (is_home_schooled == "no").then(|| CurrentSchool {
            name: payload.text("currentSchoolName"),
            board_affiliation: payload.text("boardAffiliation"),
            phone: payload.text("schoolPhone"),
            email: payload.text("schoolEmail"),
            address_line_1: payload.text("schoolAddressLine1"),
            address_line_2: payload.text("schoolAddressLine2"),
            city: payload.text("schoolCity"),
            state_id: payload.number("schoolStateId"),
            area_code: payload.text("schoolAreaCode"),
            country_id: payload.number("schoolCountryId"),
        });

        Self {
            is_home_schooled,
            was_ever_home_schooled: payload.text("wasEverHomeSchooled"),
            been_to_school_previously: payload.text("beenToSchoolPreviously"),
            academic_strengths_and_weaknesses: payload.text("academicStrengthsWeaknesses"),
            hobbies_interests_and_extra_curricular_activities: payload.text("hobbiesInterests"),
            other_details_of_importance: payload.text("otherDetailsImportance"),
            temperament_and_personality: payload.text("temperamentPersonality"),
            special_learning_needs_or_learning_disability: payload.text("specialLearningNeeds"),
            emis_id: payload.text("emisId"),
            current_school,
            previous_schools: normalize_rows(
                &payload.rows(ChildCollection::PreviousSchools.payload_key()),
            ),
        }
    }

    fn write_updates(&self, updates: &mut FieldUpdates) {
        updates.set("is_home_schooled", self.is_home_schooled.as_str());
        updates.set("was_ever_home_schooled", self.was_ever_home_schooled.as_str());
        updates.set(
            "been_to_school_previously",
            self.been_to_school_previously.as_str(),
        );
        updates.set(
            "academic_strengths_and_weaknesses",
            self.academic_strengths_and_weaknesses.as_str(),
        );
        updates.set(
            "hobbies_interests_and_extra_curricular_activities",
            self.hobbies_interests_and_extra_curricular_activities.as_str(),
        );
        updates.set(
            "other_details_of_importance",
            self.other_details_of_importance.as_str(),
        );
        updates.set(
            "temperament_and_personality",
            self.temperament_and_personality.as_str(),
        );
        updates.set(
            "special_learning_needs_or_learning_disability",
            self.special_learning_needs_or_learning_disability.as_str(),
        );
        updates.set("emis_id", self.emis_id.as_str());

        if let Some(school) = &self.current_school {
            updates.set("current_school_name", school.name.as_str());
            updates.set("board_affiliation", school.board_affiliation.as_str());
            updates.set("school_phone", school.phone.as_str());
            updates.set("school_email", school.email.as_str());
            updates.set("school_address_line_1", school.address_line_1.as_str());
            updates.set("school_address_line_2", school.address_line_2.as_str());
            updates.set("school_city", school.city.as_str());
            updates.set("school_state_id", school.state_id);
            updates.set("school_area_code", school.area_code.as_str());
            updates.set("school_country_id", school.country_id);
        }
    }

    fn requirements() -> Vec<Requirement<Self>> {
        vec![
            Requirement::always("is_home_schooled"),
            Requirement::always("was_ever_home_schooled"),
            Requirement::always("been_to_school_previously"),
            Requirement::always("academic_strengths_and_weaknesses"),
            Requirement::always("hobbies_interests_and_extra_curricular_activities"),
            Requirement::always("temperament_and_personality"),
            Requirement::always("special_learning_needs_or_learning_disability"),
            Requirement::when("current_school_name", attends_school),
            Requirement::when("board_affiliation", attends_school),
            Requirement::when("school_address_line_1", attends_school),
            Requirement::when("school_city", attends_school),
            Requirement::when("school_area_code", attends_school),
            Requirement::when("school_country_id", attends_school),
        ]
    }

    fn collections(&self, is_section_save: bool) -> Vec<CollectionInput> {
        vec![CollectionInput {
            collection: ChildCollection::PreviousSchools,
            rows: self.previous_schools.clone(),
            cleared: !is_yes(&self.been_to_school_previously),
            required: is_section_save,
        }]
    }
}
