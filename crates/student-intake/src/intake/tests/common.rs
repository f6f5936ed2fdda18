use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Map, Value};

use crate::intake::processor::{SectionOutcome, SectionRequest, SubmissionProcessor};
use crate::intake::registration::{ActorId, ProfileId, Registration, RegistrationId};
use crate::intake::repository::{
    Notification, NotificationError, Notifier, ProfileRecord, ProfileRepository,
    RegistrationRepository, RepositoryError,
};
use crate::intake::sections::VACCINE_FIELDS;
use crate::intake::{intake_router, Payload, RegistrationDraft, StudentIntakeService};

pub(super) type TestService =
    StudentIntakeService<MemoryProfiles, MemoryRegistrations, MemoryNotifier>;

#[derive(Default)]
pub(super) struct MemoryProfiles {
    records: Mutex<HashMap<ProfileId, ProfileRecord>>,
}

impl ProfileRepository for MemoryProfiles {
    fn insert(&self, record: ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn apply(
        &self,
        id: &ProfileId,
        outcome: &SectionOutcome,
    ) -> Result<ProfileRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.apply(outcome);
        Ok(record.clone())
    }

    fn remove(&self, id: &ProfileId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

impl MemoryProfiles {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

#[derive(Default)]
pub(super) struct MemoryRegistrations {
    records: Mutex<Vec<Registration>>,
}

impl RegistrationRepository for MemoryRegistrations {
    fn insert(&self, registration: Registration) -> Result<Registration, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == registration.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(registration.clone());
        Ok(registration)
    }

    fn update(&self, registration: Registration) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == registration.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = registration;
        Ok(())
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|existing| &existing.id == id).cloned())
    }

    fn latest_active_for(&self, actor: &ActorId) -> Result<Option<Registration>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| existing.active && &existing.actor == actor)
            .max_by_key(|existing| existing.created_at)
            .cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

impl MemoryNotifier {
    pub(super) fn templates(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .iter()
            .map(|notification| notification.template.clone())
            .collect()
    }
}

pub(super) struct UnavailableNotifier;

impl Notifier for UnavailableNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileRepository for UnavailableProfiles {
    fn insert(&self, _record: ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProfileId) -> Result<Option<ProfileRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn apply(
        &self,
        _id: &ProfileId,
        _outcome: &SectionOutcome,
    ) -> Result<ProfileRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &ProfileId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Accepts new registrations but fails every later update.
#[derive(Default)]
pub(super) struct FrozenRegistrations {
    inner: MemoryRegistrations,
}

impl RegistrationRepository for FrozenRegistrations {
    fn insert(&self, registration: Registration) -> Result<Registration, RepositoryError> {
        self.inner.insert(registration)
    }

    fn update(&self, _registration: Registration) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("write timeout".to_string()))
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn latest_active_for(&self, actor: &ActorId) -> Result<Option<Registration>, RepositoryError> {
        self.inner.latest_active_for(actor)
    }
}

pub(super) const ACTOR: &str = "portal-user-17";

pub(super) fn actor() -> ActorId {
    ActorId(ACTOR.to_string())
}

pub(super) const REVIEWER: &str = "admissions-office";

pub(super) fn reviewer() -> ActorId {
    ActorId(REVIEWER.to_string())
}

pub(super) fn draft() -> RegistrationDraft {
    RegistrationDraft {
        full_name: "Asha Raman".to_string(),
        gender: Some("female".to_string()),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(2014, 8, 21),
        nationality_id: Some(104),
        application_year: Some("2025-2026".to_string()),
        applied_for: Some("Grade 5".to_string()),
    }
}

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryProfiles>,
    Arc<MemoryRegistrations>,
    Arc<MemoryNotifier>,
) {
    build_service_with(SubmissionProcessor::default())
}

pub(super) fn build_service_with(
    processor: SubmissionProcessor,
) -> (
    TestService,
    Arc<MemoryProfiles>,
    Arc<MemoryRegistrations>,
    Arc<MemoryNotifier>,
) {
    let profiles = Arc::new(MemoryProfiles::default());
    let registrations = Arc::new(MemoryRegistrations::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = StudentIntakeService::new(
        processor,
        profiles.clone(),
        registrations.clone(),
        notifier.clone(),
    )
    .with_reviewers([reviewer()]);
    (service, profiles, registrations, notifier)
}

/// Service whose actor already has a submitted registration with a profile.
pub(super) fn submitted_service() -> TestService {
    submit_for(build_service().0)
}

pub(super) fn submit_for(service: TestService) -> TestService {
    let registration = service
        .create_registration(&actor(), draft())
        .expect("registration opens");
    service
        .advance(&actor(), &registration.id, crate::intake::LifecycleAction::Submit)
        .expect("registration submits");
    service
}

pub(super) fn intake_router_with_service(service: TestService) -> axum::Router {
    intake_router(Arc::new(service))
}

pub(super) fn request(value: Value) -> SectionRequest {
    SectionRequest::from_payload(Payload::from_value(value).expect("object payload"))
}

pub(super) fn upload(name: &str) -> Value {
    json!({ "filename": name, "content": "JVBERi0xLjQK" })
}

/// Section 1 answers that pass every rule on a section save.
pub(super) fn personal_payload() -> Map<String, Value> {
    let value = json!({
        "section_number": 1,
        "is_section_save": true,
        "fullName": "Asha Raman",
        "gender": "female",
        "dateOfBirth": "2014-08-21",
        "nationalityId": 104,
        "countryOfResidenceId": "104",
        "countryOfBirthId": 104,
        "addressLine1": "12 Lake View Road",
        "city": "Chennai",
        "areaCode": "600041",
        "countryId": 104,
        "identificationMark1": "Mole on left cheek",
        "religion": "hindu",
        "community": "oc",
        "phoneNumber": "9840012345",
        "phoneCountryCode": "+91",
        "nameChanged": "no",
        "sameWhatsappNumber": "yes",
        "hasSiblingInIhs": "no",
        "motherTongue": "Tamil",
        "idProofType": "aadhaar",
        "aadhaarNumber": "1234 5678 9012",
        "recentPhotograph": upload("photo.jpg"),
        "birthCertificate": upload("birth.pdf"),
        "idProofDocument": upload("aadhaar.pdf"),
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("literal object"),
    }
}

/// Section 3 answers with every flag answered `no`.
pub(super) fn health_payload() -> Map<String, Value> {
    let mut map: Map<String, Value> = VACCINE_FIELDS
        .iter()
        .map(|(_, key)| (key.to_string(), json!("no")))
        .collect();
    for key in [
        "wearsGlassesOrLens",
        "hasHearingChallenges",
        "hasBehaviouralChallenges",
        "hasPhysicalChallenges",
        "hasSpeechChallenges",
        "hasInjury",
        "onMedication",
        "hasHealthIssue",
        "wasHospitalized",
        "hasAllergies",
    ] {
        map.insert(key.to_string(), json!("no"));
    }
    map.insert("section_number".to_string(), json!(3));
    map.insert("is_section_save".to_string(), json!(true));
    map.insert("bloodGroup".to_string(), json!("b_pos"));
    map
}

/// Section 4 answers for married parents who are also the guardians.
pub(super) fn family_payload() -> Map<String, Value> {
    let value = json!({
        "section_number": 4,
        "is_section_save": true,
        "motherFullName": "Meena Raman",
        "motherPhone": "9840011111",
        "fatherFullName": "Raman K",
        "fatherPhone": "9840022222",
        "parentMaritalStatus": "married",
        "parentsAreGuardians": "yes",
        "billingName": "Raman K",
        "billingPhone": "9840022222",
        "billingEmail": "raman@example.com",
        "billingCountryId": 104,
        "billingAreaCode": "600041",
        "billingCity": "Chennai",
        "billingAddressL1": "12 Lake View Road",
        "tncCheck": true,
        "declarationDate": "2025-06-01",
        "declarationPlace": "Chennai",
        "emergencyContacts": [
            { "emergency_type": "primary", "name": "Latha", "relationship": "Aunt", "phone": "9840033333" },
            { "name": "", "relationship": "", "phone": "" }
        ]
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("literal object"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
