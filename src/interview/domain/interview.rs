//! Interview record and its status machine.

use super::{InterviewDomainError, ParseInterviewStatusError, ParseInterviewTypeError};
use crate::pipeline::domain::ApplicationId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewId(Uuid);

impl InterviewId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for InterviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InterviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    /// Invitation issued.
    Scheduled,
    /// The candidate has started.
    InProgress,
    /// The candidate finished.
    Completed,
    /// Withdrawn before completion.
    Cancelled,
}

impl InterviewStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether moving to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Scheduled, Self::InProgress | Self::Completed | Self::Cancelled)
                | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for InterviewStatus {
    type Error = ParseInterviewStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseInterviewStatusError(value.to_owned())),
        }
    }
}

/// Kind of interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    /// Automated AI-led screening interview.
    AiScreening,
}

impl InterviewType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiScreening => "ai_screening",
        }
    }
}

impl TryFrom<&str> for InterviewType {
    type Error = ParseInterviewTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ai_screening" => Ok(Self::AiScreening),
            _ => Err(ParseInterviewTypeError(value.to_owned())),
        }
    }
}

/// Interview aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    id: InterviewId,
    application_id: ApplicationId,
    candidate_name: String,
    status: InterviewStatus,
    scheduled_for: DateTime<Utc>,
    interview_link: String,
    interview_type: InterviewType,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedInterviewData {
    /// Persisted identifier.
    pub id: InterviewId,
    /// Owning application.
    pub application_id: ApplicationId,
    /// Candidate display name.
    pub candidate_name: String,
    /// Lifecycle status.
    pub status: InterviewStatus,
    /// Start time.
    pub scheduled_for: DateTime<Utc>,
    /// Portal link.
    pub interview_link: String,
    /// Interview kind.
    pub interview_type: InterviewType,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    /// Longest allowed wait between scheduling and the interview start.
    pub const MAX_DELAY_HOURS: u32 = 168;

    /// Checks an invitation delay.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewDomainError::DelayTooLong`] above
    /// [`Self::MAX_DELAY_HOURS`].
    pub const fn check_delay(delay_hours: u32) -> Result<u32, InterviewDomainError> {
        if delay_hours > Self::MAX_DELAY_HOURS {
            return Err(InterviewDomainError::DelayTooLong(delay_hours));
        }
        Ok(delay_hours)
    }

    /// Schedules an AI screening interview.
    #[must_use]
    pub fn schedule(
        id: InterviewId,
        application_id: ApplicationId,
        candidate_name: impl Into<String>,
        scheduled_for: DateTime<Utc>,
        interview_link: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            application_id,
            candidate_name: candidate_name.into(),
            status: InterviewStatus::Scheduled,
            scheduled_for,
            interview_link: interview_link.into(),
            interview_type: InterviewType::AiScreening,
            completed_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an interview from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedInterviewData) -> Self {
        Self {
            id: data.id,
            application_id: data.application_id,
            candidate_name: data.candidate_name,
            status: data.status,
            scheduled_for: data.scheduled_for,
            interview_link: data.interview_link,
            interview_type: data.interview_type,
            completed_at: data.completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the interview identifier.
    #[must_use]
    pub const fn id(&self) -> InterviewId {
        self.id
    }

    /// Returns the owning application.
    #[must_use]
    pub const fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the candidate display name.
    #[must_use]
    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> InterviewStatus {
        self.status
    }

    /// Returns the start time.
    #[must_use]
    pub const fn scheduled_for(&self) -> DateTime<Utc> {
        self.scheduled_for
    }

    /// Returns the portal link.
    #[must_use]
    pub fn interview_link(&self) -> &str {
        &self.interview_link
    }

    /// Returns the interview kind.
    #[must_use]
    pub const fn interview_type(&self) -> InterviewType {
        self.interview_type
    }

    /// Returns the completion time.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
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

    /// Marks the interview completed.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewDomainError::InvalidStatusTransition`] when the
    /// interview is already completed or cancelled.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), InterviewDomainError> {
        self.move_to(InterviewStatus::Completed, clock)?;
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Cancels an interview that has not finished.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewDomainError::InvalidStatusTransition`] when the
    /// interview is already completed or cancelled.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), InterviewDomainError> {
        self.move_to(InterviewStatus::Cancelled, clock)
    }

    fn move_to(
        &mut self,
        target: InterviewStatus,
        clock: &impl Clock,
    ) -> Result<(), InterviewDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(InterviewDomainError::InvalidStatusTransition {
                interview_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = clock.utc();
        Ok(())
    }
}
