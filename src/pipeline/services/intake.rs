//! Service layer for application intake and retrieval.

use super::{ApplicationServiceError, ApplicationServiceResult};
use crate::pipeline::{
    domain::{
        ApplicantProfile, Application, ApplicationId, ApplicationSource, AuditEntry,
        CandidateEmail, CandidateName, PhoneNumber, PipelineDomainError, ScreeningStatus,
    },
    ports::ApplicationRepository,
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request payload for submitting a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitApplicationRequest {
    candidate_name: String,
    email: String,
    position_applied: String,
    phone: Option<String>,
    job_role_id: Option<Uuid>,
    file_url: Option<String>,
    parsed_resume: Option<Value>,
    source: ApplicationSource,
}

impl SubmitApplicationRequest {
    /// Creates a request with the required candidate fields.
    #[must_use]
    pub fn new(
        candidate_name: impl Into<String>,
        email: impl Into<String>,
        position_applied: impl Into<String>,
    ) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            email: email.into(),
            position_applied: position_applied.into(),
            phone: None,
            job_role_id: None,
            file_url: None,
            parsed_resume: None,
            source: ApplicationSource::Portal,
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the job role reference.
    #[must_use]
    pub const fn with_job_role_id(mut self, job_role_id: Uuid) -> Self {
        self.job_role_id = Some(job_role_id);
        self
    }

    /// Sets the stored resume location.
    #[must_use]
    pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
        self.file_url = Some(file_url.into());
        self
    }

    /// Sets the structured resume extraction.
    #[must_use]
    pub fn with_parsed_resume(mut self, parsed_resume: Value) -> Self {
        self.parsed_resume = Some(parsed_resume);
        self
    }

    /// Sets the intake channel.
    #[must_use]
    pub const fn with_source(mut self, source: ApplicationSource) -> Self {
        self.source = source;
        self
    }
}

/// Application intake and lookup service.
pub struct ApplicationService<C>
where
    C: Clock + Send + Sync,
{
    applications: Arc<dyn ApplicationRepository>,
    clock: Arc<C>,
}

impl<C> ApplicationService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new application service.
    #[must_use]
    pub const fn new(applications: Arc<dyn ApplicationRepository>, clock: Arc<C>) -> Self {
        Self {
            applications,
            clock,
        }
    }

    /// Validates and stores a new application at stage `applied`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError::Domain`] when a field fails
    /// validation, or [`ApplicationServiceError::Repository`] when the store
    /// rejects the write.
    pub async fn submit(
        &self,
        request: SubmitApplicationRequest,
    ) -> ApplicationServiceResult<Application> {
        let position_applied = request.position_applied.trim().to_owned();
        if position_applied.is_empty() {
            return Err(PipelineDomainError::EmptyPosition.into());
        }
        let phone = request
            .phone
            .filter(|raw| !raw.trim().is_empty())
            .map(PhoneNumber::new)
            .transpose()?;

        let profile = ApplicantProfile {
            candidate_name: CandidateName::new(request.candidate_name)?,
            email: CandidateEmail::new(request.email)?,
            phone,
            position_applied,
            job_role_id: request.job_role_id,
            file_url: request.file_url,
            parsed_resume: request.parsed_resume,
            source: request.source,
        };

        let application = Application::submit(profile, &*self.clock);
        self.applications.store(&application).await?;
        info!(
            application_id = %application.id(),
            position = application.position_applied(),
            "application submitted"
        );
        Ok(application)
    }

    /// Retrieves an application.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError::NotFound`] when no application has
    /// this identifier.
    pub async fn find(&self, id: ApplicationId) -> ApplicationServiceResult<Application> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or(ApplicationServiceError::NotFound(id))
    }

    /// Lists applications, newest first, optionally by screening status.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError::Repository`] when the query fails.
    pub async fn list(
        &self,
        status: Option<ScreeningStatus>,
    ) -> ApplicationServiceResult<Vec<Application>> {
        Ok(self.applications.list(status).await?)
    }

    /// Returns the audit trail of an application, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationServiceError::NotFound`] when the application
    /// does not exist.
    pub async fn audit_trail(&self, id: ApplicationId) -> ApplicationServiceResult<Vec<AuditEntry>> {
        self.find(id).await?;
        Ok(self.applications.audit_trail(id).await?)
    }
}
