use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a registration record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

/// Identifier of the authenticated portal user driving a registration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStage {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStage {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStage::Draft => "draft",
            ApplicationStage::Submitted => "submitted",
            ApplicationStage::UnderReview => "under_review",
            ApplicationStage::Approved => "approved",
            ApplicationStage::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Applicant details captured when a registration is started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub full_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub nationality_id: Option<i64>,
    #[serde(default)]
    pub application_year: Option<String>,
    #[serde(default)]
    pub applied_for: Option<String>,
}

/// Top-level admission record owning at most one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    /// Human-facing sequence number, e.g. `REG/000042`.
    pub name: String,
    pub actor: ActorId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub stage: ApplicationStage,
    pub profile_id: Option<ProfileId>,
    pub applicant: RegistrationDraft,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Submit,
    Review,
    Approve,
    Reject,
}

impl LifecycleAction {
    pub fn target(self) -> ApplicationStage {
        match self {
            LifecycleAction::Submit => ApplicationStage::Submitted,
            LifecycleAction::Review => ApplicationStage::UnderReview,
            LifecycleAction::Approve => ApplicationStage::Approved,
            LifecycleAction::Reject => ApplicationStage::Rejected,
        }
    }

    /// Notification template sent once the transition is stored.
    pub fn template(self) -> Option<&'static str> {
        match self {
            LifecycleAction::Submit => Some("application_submitted"),
            LifecycleAction::Approve => Some("application_approved"),
            LifecycleAction::Reject => Some("application_rejected"),
            LifecycleAction::Review => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::Review => "review",
            LifecycleAction::Approve => "approve",
            LifecycleAction::Reject => "reject",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} an application in stage {from}")]
    IllegalTransition {
        from: ApplicationStage,
        action: LifecycleAction,
    },
    #[error("Date of birth cannot be in the future.")]
    DateOfBirthInFuture,
    #[error("Applicant name is required.")]
    MissingApplicantName,
}

impl Registration {
    pub fn open(
        id: RegistrationId,
        name: String,
        actor: ActorId,
        draft: RegistrationDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, LifecycleError> {
        if draft.full_name.trim().is_empty() {
            return Err(LifecycleError::MissingApplicantName);
        }
        if draft
            .date_of_birth
            .is_some_and(|date_of_birth| date_of_birth > now.date_naive())
        {
            return Err(LifecycleError::DateOfBirthInFuture);
        }

        Ok(Self {
            id,
            name,
            actor,
            active: true,
            created_at: now,
            stage: ApplicationStage::Draft,
            profile_id: None,
            applicant: draft,
            submitted_at: None,
            reviewed_at: None,
            decided_at: None,
        })
    }

    /// Moves the registration to the action's target stage, stamping the matching timestamp.
    pub fn advance(
        &mut self,
        action: LifecycleAction,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let allowed = match action {
            LifecycleAction::Submit => self.stage == ApplicationStage::Draft,
            LifecycleAction::Review => self.stage == ApplicationStage::Submitted,
            LifecycleAction::Approve | LifecycleAction::Reject => matches!(
                self.stage,
                ApplicationStage::Submitted | ApplicationStage::UnderReview
            ),
        };
        if !allowed {
            return Err(LifecycleError::IllegalTransition {
                from: self.stage,
                action,
            });
        }

        self.stage = action.target();
        match action {
            LifecycleAction::Submit => self.submitted_at = Some(now),
            LifecycleAction::Review => self.reviewed_at = Some(now),
            LifecycleAction::Approve | LifecycleAction::Reject => self.decided_at = Some(now),
        }
        Ok(())
    }
}
