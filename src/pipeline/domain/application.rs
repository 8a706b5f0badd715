//! Application record aggregate root.

use super::{
    ApplicationId, ApplicationSource, AtsScore, CandidateEmail, CandidateName,
    NotificationFlags, PhoneNumber, PipelineDomainError, PipelineStage, ResumeAnalysis,
    ScreeningDecision, ScreeningStatus,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Validated contact and resume details for a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantProfile {
    /// Candidate name.
    pub candidate_name: CandidateName,
    /// Candidate email.
    pub email: CandidateEmail,
    /// Optional phone number.
    pub phone: Option<PhoneNumber>,
    /// Position title the candidate applied for.
    pub position_applied: String,
    /// Optional job role reference.
    pub job_role_id: Option<Uuid>,
    /// Optional stored resume location.
    pub file_url: Option<String>,
    /// Optional structured resume extraction.
    pub parsed_resume: Option<Value>,
    /// Intake channel.
    pub source: ApplicationSource,
}

/// Application aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    candidate_name: CandidateName,
    email: CandidateEmail,
    phone: Option<PhoneNumber>,
    position_applied: String,
    job_role_id: Option<Uuid>,
    file_url: Option<String>,
    parsed_resume: Option<Value>,
    source: ApplicationSource,
    stage: PipelineStage,
    manual_override: bool,
    ai_score: Option<u32>,
    ai_analysis: Option<Value>,
    flags: NotificationFlags,
    interview_scheduled_at: Option<DateTime<Utc>>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted identifier.
    pub id: ApplicationId,
    /// Persisted contact and resume details.
    pub profile: ApplicantProfile,
    /// Persisted pipeline stage.
    pub stage: PipelineStage,
    /// Persisted manual override marker.
    pub manual_override: bool,
    /// Persisted model score.
    pub ai_score: Option<u32>,
    /// Persisted model analysis.
    pub ai_analysis: Option<Value>,
    /// Persisted sent flags.
    pub flags: NotificationFlags,
    /// Persisted interview scheduling timestamp.
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    /// Persisted optimistic concurrency revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Creates a new application awaiting screening.
    #[must_use]
    pub fn submit(profile: ApplicantProfile, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ApplicationId::new(),
            candidate_name: profile.candidate_name,
            email: profile.email,
            phone: profile.phone,
            position_applied: profile.position_applied,
            job_role_id: profile.job_role_id,
            file_url: profile.file_url,
            parsed_resume: profile.parsed_resume,
            source: profile.source,
            stage: PipelineStage::Applied,
            manual_override: false,
            ai_score: None,
            ai_analysis: None,
            flags: NotificationFlags::default(),
            interview_scheduled_at: None,
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        let PersistedApplicationData {
            id,
            profile,
            stage,
            manual_override,
            ai_score,
            ai_analysis,
            flags,
            interview_scheduled_at,
            revision,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            candidate_name: profile.candidate_name,
            email: profile.email,
            phone: profile.phone,
            position_applied: profile.position_applied,
            job_role_id: profile.job_role_id,
            file_url: profile.file_url,
            parsed_resume: profile.parsed_resume,
            source: profile.source,
            stage,
            manual_override,
            ai_score,
            ai_analysis,
            flags,
            interview_scheduled_at,
            revision,
            created_at,
            updated_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the candidate name.
    #[must_use]
    pub const fn candidate_name(&self) -> &CandidateName {
        &self.candidate_name
    }

    /// Returns the candidate email.
    #[must_use]
    pub const fn email(&self) -> &CandidateEmail {
        &self.email
    }

    /// Returns the phone number, if any.
    #[must_use]
    pub const fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Returns the applied position title.
    #[must_use]
    pub fn position_applied(&self) -> &str {
        &self.position_applied
    }

    /// Returns the job role reference, if any.
    #[must_use]
    pub const fn job_role_id(&self) -> Option<Uuid> {
        self.job_role_id
    }

    /// Returns the stored resume location, if any.
    #[must_use]
    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    /// Returns the structured resume extraction, if any.
    #[must_use]
    pub const fn parsed_resume(&self) -> Option<&Value> {
        self.parsed_resume.as_ref()
    }

    /// Returns the intake channel.
    #[must_use]
    pub const fn source(&self) -> ApplicationSource {
        self.source
    }

    /// Returns the pipeline stage.
    #[must_use]
    pub const fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Returns the screening status derived from the stage.
    #[must_use]
    pub const fn screening_status(&self) -> ScreeningStatus {
        self.stage.screening_status()
    }

    /// Returns whether the latest decision was made by a person.
    #[must_use]
    pub const fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// Returns the model score, if screened by AI.
    #[must_use]
    pub const fn ai_score(&self) -> Option<u32> {
        self.ai_score
    }

    /// Returns the stored model analysis, if screened by AI.
    #[must_use]
    pub const fn ai_analysis(&self) -> Option<&Value> {
        self.ai_analysis.as_ref()
    }

    /// Returns the sent flags as last loaded.
    #[must_use]
    pub const fn flags(&self) -> NotificationFlags {
        self.flags
    }

    /// Returns when the interview invitation was scheduled.
    #[must_use]
    pub const fn interview_scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.interview_scheduled_at
    }

    /// Returns the optimistic concurrency revision this value was loaded at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the job title used in candidate-facing messages.
    #[must_use]
    pub fn job_title(&self) -> &str {
        &self.position_applied
    }

    /// Returns whether this record is seeded demonstration data.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        matches!(self.source, ApplicationSource::Demo)
    }

    /// Rejects demonstration records.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::DemoApplication`] for demo data.
    pub const fn ensure_processable(&self) -> Result<(), PipelineDomainError> {
        if self.is_demo() {
            return Err(PipelineDomainError::DemoApplication(self.id));
        }
        Ok(())
    }

    /// Checks that the application still awaits screening.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::DemoApplication`] for demo data or
    /// [`PipelineDomainError::AlreadyScreened`] past the `applied` stage.
    pub const fn ensure_awaiting_screening(&self) -> Result<(), PipelineDomainError> {
        if self.is_demo() {
            return Err(PipelineDomainError::DemoApplication(self.id));
        }
        if !matches!(self.stage, PipelineStage::Applied) {
            return Err(PipelineDomainError::AlreadyScreened {
                application_id: self.id,
                stage: self.stage,
            });
        }
        Ok(())
    }

    /// Moves the application to `target`.
    ///
    /// Returns the stage the application left.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidStageTransition`] when `target`
    /// is not a forward step from the current stage. The application is left
    /// unchanged.
    pub fn transition_to(
        &mut self,
        target: PipelineStage,
        clock: &impl Clock,
    ) -> Result<PipelineStage, PipelineDomainError> {
        let from = self.stage;
        if !from.can_transition_to(target) {
            return Err(PipelineDomainError::InvalidStageTransition {
                application_id: self.id,
                from,
                to: target,
            });
        }
        self.stage = target;
        self.touch(clock);
        Ok(from)
    }

    /// Applies a screening decision.
    ///
    /// `manual` records whether HR made the call rather than the model.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::DemoApplication`] for demo data or
    /// [`PipelineDomainError::InvalidStageTransition`] when the decision does
    /// not fit the current stage.
    pub fn apply_decision(
        &mut self,
        decision: ScreeningDecision,
        manual: bool,
        clock: &impl Clock,
    ) -> Result<PipelineStage, PipelineDomainError> {
        self.ensure_processable()?;
        let from = self.transition_to(decision.target_stage(), clock)?;
        self.manual_override = manual;
        Ok(from)
    }

    /// Stores a model analysis and its composite score.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::ScoreOutOfRange`] when the analysis
    /// carries an invalid score and [`PipelineDomainError::AnalysisEncoding`]
    /// when it cannot be encoded.
    pub fn record_analysis(
        &mut self,
        analysis: &ResumeAnalysis,
        ats_score: AtsScore,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        analysis.validate()?;
        let mut stored = serde_json::to_value(analysis)
            .map_err(|err| PipelineDomainError::AnalysisEncoding(err.to_string()))?;
        let Value::Object(ref mut fields) = stored else {
            return Err(PipelineDomainError::AnalysisEncoding(
                "analysis did not encode as an object".to_owned(),
            ));
        };
        fields.insert("ats_score".to_owned(), Value::from(ats_score.value()));
        self.ai_score = Some(analysis.rounded_ai_score());
        self.ai_analysis = Some(stored);
        self.touch(clock);
        Ok(())
    }

    /// Moves a selected application to `interview_scheduled`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidStageTransition`] unless the
    /// application is currently `selected`.
    pub fn schedule_interview(
        &mut self,
        clock: &impl Clock,
    ) -> Result<PipelineStage, PipelineDomainError> {
        let from = self.transition_to(PipelineStage::InterviewScheduled, clock)?;
        self.interview_scheduled_at = Some(self.updated_at);
        Ok(from)
    }

    /// Advances the in-memory revision after storage accepted an update.
    pub(crate) const fn commit_revision(&mut self) {
        self.revision += 1;
    }

    /// Replaces the flag snapshot with the stored one.
    pub(crate) const fn replace_flags(&mut self, flags: NotificationFlags) {
        self.flags = flags;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
