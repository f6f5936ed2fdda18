use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::context::FormContext;
use super::fields::FieldUpdates;
use super::processor::{SectionOutcome, SectionRequest, SubmissionError, SubmissionProcessor};
use super::registration::{
    ActorId, ApplicationStage, LifecycleAction, LifecycleError, ProfileId, Registration,
    RegistrationDraft, RegistrationId,
};
use super::repository::{
    Notification, Notifier, ProfileRecord, ProfileRepository,
    RegistrationRepository, RepositoryError,
};

/// Orchestrates registration lookup, section processing and persistence for the portal.
pub struct StudentIntakeService<P, R, N> {
    processor: SubmissionProcessor,
    profiles: Arc<P>,
    registrations: Arc<R>,
    notifier: Arc<N>,
    reviewers: BTreeSet<ActorId>,
}

static REGISTRATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PROFILE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_registration_identity() -> (RegistrationId, String) {
    let id = REGISTRATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    (RegistrationId(format!("reg-{id:06}")), format!("REG/{id:06}"))
}

fn next_profile_id() -> ProfileId {
    let id = PROFILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProfileId(format!("profile-{id:06}"))
}

impl<P, R, N> StudentIntakeService<P, R, N>
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        processor: SubmissionProcessor,
        profiles: Arc<P>,
        registrations: Arc<R>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            processor,
            profiles,
            registrations,
            notifier,
            reviewers: BTreeSet::new(),
        }
    }

    /// Staff allowed to review, approve and reject applications.
    pub fn with_reviewers(mut self, reviewers: impl IntoIterator<Item = ActorId>) -> Self {
        self.reviewers.extend(reviewers);
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.processor.max_upload_bytes()
    }

    /// Validates and stores one section for the actor's latest active registration.
    pub fn save_section(
        &self,
        actor: &ActorId,
        request: &SectionRequest,
    ) -> Result<ProfileRecord, IntakeServiceError> {
        let (registration, profile_id) = self.registration_with_profile(actor)?;
        let outcome: SectionOutcome = self.processor.process(request)?;

        let record = self.profiles.apply(&profile_id, &outcome)?;
        tracing::info!(
            registration = %registration.name,
            section = outcome.section.index(),
            section_save = outcome.is_section_save,
            fields = outcome.updates.len(),
            documents = outcome.documents.len(),
            "profile section stored"
        );
        Ok(record)
    }

    /// Dropdown options and the actor's current profile.
    pub fn form_context(&self, actor: &ActorId) -> Result<FormContext, IntakeServiceError> {
        let (registration, profile_id) = self.registration_with_profile(actor)?;
        let record = self
            .profiles
            .fetch(&profile_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(FormContext::new(&registration, &record))
    }

    /// Opens a draft registration for the actor.
    pub fn create_registration(
        &self,
        actor: &ActorId,
        draft: RegistrationDraft,
    ) -> Result<Registration, IntakeServiceError> {
        let (id, name) = next_registration_identity();
        let registration = Registration::open(id, name, actor.clone(), draft, Utc::now())?;
        let stored = self.registrations.insert(registration)?;
        tracing::info!(registration = %stored.name, "registration opened");
        Ok(stored)
    }

    pub fn registration(&self, id: &RegistrationId) -> Result<Registration, IntakeServiceError> {
        let registration = self
            .registrations
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(registration)
    }

    /// Applies a lifecycle action on behalf of `actor`. Submitting creates the profile when it
    /// does not exist yet; the profile is removed again if the registration cannot be stored.
    pub fn advance(
        &self,
        actor: &ActorId,
        id: &RegistrationId,
        action: LifecycleAction,
    ) -> Result<Registration, IntakeServiceError> {
        let mut registration = self.registration(id)?;
        self.authorize(actor, &registration, action)?;
        registration.advance(action, Utc::now())?;

        let mut created = None;
        if action == LifecycleAction::Submit && registration.profile_id.is_none() {
            let profile = self.profiles.insert(seed_profile(&registration))?;
            registration.profile_id = Some(profile.id.clone());
            created = Some(profile.id);
        }

        if let Err(error) = self.registrations.update(registration.clone()) {
            if let Some(profile_id) = created {
                if let Err(cleanup) = self.profiles.remove(&profile_id) {
                    tracing::error!(
                        profile = %profile_id.0,
                        %cleanup,
                        "orphaned profile left behind"
                    );
                }
            }
            return Err(error.into());
        }
        tracing::info!(
            registration = %registration.name,
            stage = registration.stage.label(),
            "registration advanced"
        );

        if let Some(template) = action.template() {
            self.send(template, &registration);
        }
        Ok(registration)
    }

    /// Applicants submit their own registrations; every other move is staff-only.
    fn authorize(
        &self,
        actor: &ActorId,
        registration: &Registration,
        action: LifecycleAction,
    ) -> Result<(), IntakeServiceError> {
        let allowed = match action {
            LifecycleAction::Submit => &registration.actor == actor,
            LifecycleAction::Review | LifecycleAction::Approve | LifecycleAction::Reject => {
                self.reviewers.contains(actor)
            }
        };
        if allowed {
            Ok(())
        } else {
            tracing::warn!(
                actor = %actor.0,
                registration = %registration.name,
                action = action.label(),
                "lifecycle action refused"
            );
            Err(IntakeServiceError::NotPermitted(action))
        }
    }

    fn send(&self, template: &str, registration: &Registration) {
        let mut details = BTreeMap::new();
        details.insert("name".to_string(), registration.name.clone());
        details.insert(
            "applicant".to_string(),
            registration.applicant.full_name.clone(),
        );
        details.insert(
            "stage".to_string(),
            registration.stage.label().to_string(),
        );

        let notification = Notification {
            template: template.to_string(),
            registration_id: registration.id.clone(),
            details,
        };
        if let Err(error) = self.notifier.notify(notification) {
            tracing::warn!(
                registration = %registration.name,
                template,
                %error,
                "notification not delivered"
            );
        }
    }

    fn registration_with_profile(
        &self,
        actor: &ActorId,
    ) -> Result<(Registration, ProfileId), IntakeServiceError> {
        let registration = self
            .registrations
            .latest_active_for(actor)?
            .ok_or(IntakeServiceError::NoRegistration)?;

        match registration.profile_id.clone() {
            Some(profile_id) => Ok((registration, profile_id)),
            None => Err(IntakeServiceError::ProfilePending(registration.stage)),
        }
    }
}

/// Profile created on submit, pre-filled from the registration's applicant details.
fn seed_profile(registration: &Registration) -> ProfileRecord {
    let applicant = &registration.applicant;
    let mut seed = FieldUpdates::default();
    seed.set("full_name", applicant.full_name.as_str());
    seed.set("gender", applicant.gender.clone());
    seed.set(
        "date_of_birth",
        applicant
            .date_of_birth
            .map(|date| date.format("%Y-%m-%d").to_string()),
    );
    seed.set("nationality_id", applicant.nationality_id);

    let mut record = ProfileRecord::new(next_profile_id(), registration.id.clone());
    for (field, value) in seed.iter() {
        record.fields.insert(field.to_string(), value.clone());
    }
    record
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error("No student record found for the logged-in user.")]
    NoRegistration,
    #[error("registration in stage {0} has no profile yet")]
    ProfilePending(ApplicationStage),
    #[error("You are not allowed to {0} this application.")]
    NotPermitted(LifecycleAction),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntakeServiceError {
    /// Message shown to the applicant when the profile cannot be loaded yet.
    pub fn pending_message(stage: ApplicationStage) -> &'static str {
        match stage {
            ApplicationStage::Draft => {
                "Application review pending. Please wait for confirmation link"
            }
            _ => "Failed to get profile information. Please contact us over email/phone.",
        }
    }
}
