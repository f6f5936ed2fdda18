use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use student_intake::admission::{AdmissionId, AdmissionRecord, AdmissionRepository};
use student_intake::intake::{
    ActorId, Notification, NotificationError, Notifier, ProfileId, ProfileRecord,
    ProfileRepository, Registration, RegistrationId, RegistrationRepository, RepositoryError,
    SectionOutcome,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    records: Arc<Mutex<HashMap<ProfileId, ProfileRecord>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
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
        // One lock for the whole outcome keeps collection replacement atomic.
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.apply(outcome);
        Ok(record.clone())
    }

    fn remove(&self, id: &ProfileId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRegistrationRepository {
    records: Arc<Mutex<HashMap<RegistrationId, Registration>>>,
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn insert(&self, registration: Registration) -> Result<Registration, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&registration.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(registration.id.clone(), registration.clone());
        Ok(registration)
    }

    fn update(&self, registration: Registration) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&registration.id) {
            guard.insert(registration.id.clone(), registration);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn latest_active_for(&self, actor: &ActorId) -> Result<Option<Registration>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|registration| registration.active && &registration.actor == actor)
            .max_by(|left, right| {
                left.created_at
                    .cmp(&right.created_at)
                    .then_with(|| left.id.cmp(&right.id))
            })
            .cloned())
    }
}

/// Records notifications instead of sending e-mail.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            template = %notification.template,
            registration = %notification.registration_id.0,
            "notification queued"
        );
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotifier {
    #[cfg(test)]
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAdmissionRepository {
    next_id: Arc<AtomicU64>,
    records: Arc<Mutex<HashMap<AdmissionId, AdmissionRecord>>>,
}

impl AdmissionRepository for InMemoryAdmissionRepository {
    fn create(&self, record: AdmissionRecord) -> Result<AdmissionId, RepositoryError> {
        let id = AdmissionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(id, record);
        Ok(id)
    }
}

impl InMemoryAdmissionRepository {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}
