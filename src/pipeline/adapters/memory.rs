//! In-memory application repository for tests and database-less runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::pipeline::{
    domain::{ApplicationId, Application, AuditEntry, NotificationFlag, ScreeningStatus},
    ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult},
};

/// Thread-safe in-memory application repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApplicationRepository {
    state: Arc<RwLock<InMemoryApplicationState>>,
}

#[derive(Debug, Default)]
struct InMemoryApplicationState {
    applications: HashMap<ApplicationId, Application>,
    audit_log: Vec<AuditEntry>,
}

impl InMemoryApplicationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> ApplicationRepositoryError {
    ApplicationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.applications.contains_key(&application.id()) {
            return Err(ApplicationRepositoryError::DuplicateApplication(
                application.id(),
            ));
        }
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn record_transition(
        &self,
        application: &Application,
        entry: &AuditEntry,
    ) -> ApplicationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored = state
            .applications
            .get(&application.id())
            .ok_or(ApplicationRepositoryError::NotFound(application.id()))?;
        if stored.revision() != application.revision() {
            return Err(ApplicationRepositoryError::Conflict {
                id: application.id(),
                expected: application.revision(),
            });
        }

        // Flags are owned by `claim_notification`; keep whatever is stored.
        let stored_flags = stored.flags();
        let mut updated = application.clone();
        updated.replace_flags(stored_flags);
        updated.commit_revision();
        state.applications.insert(application.id(), updated);
        state.audit_log.push(entry.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn list(
        &self,
        status: Option<ScreeningStatus>,
    ) -> ApplicationRepositoryResult<Vec<Application>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|application| {
                status.is_none_or(|wanted| application.screening_status() == wanted)
            })
            .cloned()
            .collect();
        applications.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(applications)
    }

    async fn audit_trail(&self, id: ApplicationId) -> ApplicationRepositoryResult<Vec<AuditEntry>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .audit_log
            .iter()
            .filter(|entry| entry.application_id == id)
            .cloned()
            .collect())
    }

    async fn claim_notification(
        &self,
        id: ApplicationId,
        flag: NotificationFlag,
    ) -> ApplicationRepositoryResult<bool> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let application = state
            .applications
            .get_mut(&id)
            .ok_or(ApplicationRepositoryError::NotFound(id))?;
        let mut flags = application.flags();
        let claimed = flags.raise(flag);
        application.replace_flags(flags);
        Ok(claimed)
    }
}
