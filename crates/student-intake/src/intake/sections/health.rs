use super::{Section, SectionForm};
use crate::intake::documents::{DocumentRequest, DocumentSlot, Upload};
use crate::intake::fields::FieldUpdates;
use crate::intake::payload::Payload;
use crate::intake::rules::{is_yes, Requirement};

/// Storage field and payload key of each tracked vaccine, in form order.
pub const VACCINE_FIELDS: [(&str, &str); 10] = [
    ("done_smallpox_vaccine", "doneSmallpoxVaccine"),
    ("done_hepatitis_a_vaccine", "doneHepatitisAVaccine"),
    ("done_hepatitis_b_vaccine", "doneHepatitisBVaccine"),
    ("done_tdap_vaccine", "doneTdapVaccine"),
    ("done_typhoid_vaccine", "doneTyphoidVaccine"),
    ("done_measles_vaccine", "doneMeaslesVaccine"),
    ("done_polio_vaccine", "donePolioVaccine"),
    ("done_mumps_vaccine", "doneMumpsVaccine"),
    ("done_rubella_vaccine", "doneRubellaVaccine"),
    ("done_varicella_vaccine", "doneVaricellaVaccine"),
];

/// Section 3: vaccinations, general health and medical history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthSection {
    /// Yes/no answers aligned with [`VACCINE_FIELDS`].
    pub vaccines: [String; 10],
    pub other_vaccines: String,
    pub blood_group: String,
    pub wears_glasses_or_lens: String,
    pub is_toilet_trained: String,
    pub wets_bed: String,
    pub hearing: GatedDetail,
    pub behavioural: GatedDetail,
    pub physical: GatedDetail,
    pub speech: GatedDetail,
    pub injury: GatedDetail,
    pub medication: GatedDetail,
    pub health_issue: GatedDetail,
    pub hospitalization: GatedDetail,
    pub special_attention: GatedDetail,
    pub allergies: GatedDetail,
    /// Set when `wears_glasses_or_lens` is `yes`.
    pub eye_power: Option<EyePower>,
    pub vaccine_certificates: Upload,
    pub medical_prescription: Upload,
}

/// A yes/no question whose free-text details become mandatory on `yes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedDetail {
    pub answer: String,
    pub details: String,
}

impl GatedDetail {
    fn read(payload: &Payload, answer_key: &str, details_key: &str) -> Self {
        Self {
            answer: payload.text(answer_key),
            details: payload.text(details_key),
        }
    }

    pub fn is_yes(&self) -> bool {
        is_yes(&self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyePower {
    pub right: String,
    pub left: String,
}

impl HealthSection {
    pub fn any_vaccine_done(&self) -> bool {
        self.vaccines.iter().any(|answer| is_yes(answer))
    }

    fn gated_fields(&self) -> [(&'static str, &'static str, &GatedDetail); 10] {
        [
            ("has_hearing_challenges", "hearing_challenges", &self.hearing),
            (
                "has_behavioural_challenges",
                "behavioural_callenges",
                &self.behavioural,
            ),
            (
                "has_physical_challenges",
                "physical_challenges",
                &self.physical,
            ),
            ("has_speech_challenges", "speech_challenges", &self.speech),
            ("has_injury", "injury_details", &self.injury),
            ("on_medication", "medicaton_details", &self.medication),
            ("has_health_issue", "health_issue_details", &self.health_issue),
            (
                "was_hospitalized",
                "hospitalization_details",
                &self.hospitalization,
            ),
            (
                "needs_special_attention",
                "attention_details",
                &self.special_attention,
            ),
            ("has_alergies", "allergy_details", &self.allergies),
        ]
    }
}

impl SectionForm for HealthSection {
    const SECTION: Section = Section::Health;

    fn from_payload(payload: &Payload) -> Self {
        let wears_glasses_or_lens = payload.text("wearsGlassesOrLens");
        let eye_power = is_yes(&wears_glasses_or_lens).then(|| EyePower {
            right: payload.text("rightEyePower"),
            left: payload.text("leftEyePower"),
        });

        Self {
            vaccines: VACCINE_FIELDS.map(|(_, key)| payload.text(key)),
            other_vaccines: payload.text("otherVaccines"),
            blood_group: payload.text("bloodGroup"),
            wears_glasses_or_lens,
            is_toilet_trained: payload.text("isToiletTrained"),
            wets_bed: payload.text("wetsBed"),
            hearing: GatedDetail::read(payload, "hasHearingChallenges", "hearingChallenges"),
            behavioural: GatedDetail::read(
                payload,
                "hasBehaviouralChallenges",
                "behaviouralChallenges",
            ),
            physical: GatedDetail::read(payload, "hasPhysicalChallenges", "physicalChallenges"),
            speech: GatedDetail::read(payload, "hasSpeechChallenges", "speechChallenges"),
            injury: GatedDetail::read(payload, "hasInjury", "injuryDetails"),
            medication: GatedDetail::read(payload, "onMedication", "medicationDetails"),
            health_issue: GatedDetail::read(payload, "hasHealthIssue", "healthIssueDetails"),
            hospitalization: GatedDetail::read(
                payload,
                "wasHospitalized",
                "hospitalizationDetails",
            ),
            special_attention: GatedDetail::read(
                payload,
                "needsSpecialAttention",
                "attentionDetails",
            ),
            allergies: GatedDetail::read(payload, "hasAllergies", "allergyDetails"),
            eye_power,
            vaccine_certificates: Upload::read(payload, DocumentSlot::VaccineCertificates),
            medical_prescription: Upload::read(payload, DocumentSlot::MedicalPrescription),
        }
    }

    fn write_updates(&self, updates: &mut FieldUpdates) {
        for (&(field, _), answer) in VACCINE_FIELDS.iter().zip(self.vaccines.iter()) {
            updates.set(field, answer.as_str());
        }
        updates.set("other_vaccines", self.other_vaccines.as_str());
        updates.set("blood_group", self.blood_group.as_str());
        updates.set("wears_glasses_or_lens", self.wears_glasses_or_lens.as_str());
        updates.set("is_toilet_trained", self.is_toilet_trained.as_str());
        updates.set("wets_bed", self.wets_bed.as_str());

        for (answer_field, details_field, detail) in self.gated_fields() {
            updates.set(answer_field, detail.answer.as_str());
            updates.set(details_field, detail.details.as_str());
        }

        if let Some(eye_power) = &self.eye_power {
            updates.set("right_eye_power", eye_power.right.as_str());
            updates.set("left_eye_power", eye_power.left.as_str());
        }
    }

    fn requirements() -> Vec<Requirement<Self>> {
        let mut requirements: Vec<Requirement<Self>> = VACCINE_FIELDS
            .iter()
            .map(|&(field, _)| Requirement::always(field))
            .collect();

        requirements.extend([
            Requirement::always("blood_group"),
            Requirement::always("wears_glasses_or_lens"),
            Requirement::always("has_hearing_challenges"),
            Requirement::always("has_behavioural_challenges"),
            Requirement::always("has_physical_challenges"),
            Requirement::always("has_speech_challenges"),
            Requirement::always("has_injury"),
            Requirement::always("on_medication"),
            Requirement::always("has_health_issue"),
            Requirement::always("was_hospitalized"),
            Requirement::always("has_alergies"),
            Requirement::when("right_eye_power", |form: &Self| form.eye_power.is_some()),
            Requirement::when("left_eye_power", |form: &Self| form.eye_power.is_some()),
            Requirement::when("hearing_challenges", |form: &Self| form.hearing.is_yes()),
            Requirement::when("behavioural_callenges", |form: &Self| {
                form.behavioural.is_yes()
            }),
            Requirement::when("physical_challenges", |form: &Self| form.physical.is_yes()),
            Requirement::when("speech_challenges", |form: &Self| form.speech.is_yes()),
            Requirement::when("injury_details", |form: &Self| form.injury.is_yes()),
            Requirement::when("medicaton_details", |form: &Self| form.medication.is_yes()),
            Requirement::when("health_issue_details", |form: &Self| {
                form.health_issue.is_yes()
            }),
            Requirement::when("hospitalization_details", |form: &Self| {
                form.hospitalization.is_yes()
            }),
            Requirement::when("allergy_details", |form: &Self| form.allergies.is_yes()),
        ]);

        requirements
    }

    fn documents(&self, is_section_save: bool) -> Vec<DocumentRequest> {
        let mut documents = vec![DocumentRequest {
            slot: DocumentSlot::VaccineCertificates,
            upload: self.vaccine_certificates.clone(),
            required: is_section_save && self.any_vaccine_done(),
        }];

        if self.medication.is_yes() {
            documents.push(DocumentRequest {
                slot: DocumentSlot::MedicalPrescription,
                upload: self.medical_prescription.clone(),
                required: is_section_save,
            });
        }

        documents
    }
}
