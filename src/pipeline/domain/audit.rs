//! Pipeline audit trail entries.

use super::{ApplicationId, AuditEntryId, ParseAuditActionError, PipelineStage};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Action recorded for a pipeline transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// HR selected the candidate.
    ManualSelected,
    /// HR rejected the candidate.
    ManualRejected,
    /// The analysis model selected the candidate.
    AiScreeningSelected,
    /// The analysis model rejected the candidate.
    AiScreeningRejected,
    /// An automated interview was scheduled.
    InterviewScheduled,
    /// The candidate completed the interview.
    InterviewCompleted,
    /// HR extended an offer.
    OfferExtended,
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualSelected => "manual_selected",
            Self::ManualRejected => "manual_rejected",
            Self::AiScreeningSelected => "ai_screening_selected",
            Self::AiScreeningRejected => "ai_screening_rejected",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
            Self::OfferExtended => "offer_extended",
        }
    }

    /// Returns whether the action was taken without a human in the loop.
    #[must_use]
    pub const fn is_automated(self) -> bool {
        matches!(
            self,
            Self::AiScreeningSelected
                | Self::AiScreeningRejected
                | Self::InterviewScheduled
                | Self::InterviewCompleted
        )
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = ParseAuditActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual_selected" => Ok(Self::ManualSelected),
            "manual_rejected" => Ok(Self::ManualRejected),
            "ai_screening_selected" => Ok(Self::AiScreeningSelected),
            "ai_screening_rejected" => Ok(Self::AiScreeningRejected),
            "interview_scheduled" => Ok(Self::InterviewScheduled),
            "interview_completed" => Ok(Self::InterviewCompleted),
            "offer_extended" => Ok(Self::OfferExtended),
            _ => Err(ParseAuditActionError(value.to_owned())),
        }
    }
}

/// One row of the pipeline audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier.
    pub id: AuditEntryId,
    /// Application the transition applies to.
    pub application_id: ApplicationId,
    /// Recorded action.
    pub action: AuditAction,
    /// Stage before the transition.
    pub from_stage: PipelineStage,
    /// Stage after the transition.
    pub to_stage: PipelineStage,
    /// Whether automation rather than a person caused the transition.
    pub automation_triggered: bool,
    /// Actor identifier, when a person acted.
    pub performed_by: Option<String>,
    /// Free-form details such as scores or notes.
    pub details: Value,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry for a transition between two stages.
    #[must_use]
    pub fn transition(
        application_id: ApplicationId,
        action: AuditAction,
        from_stage: PipelineStage,
        to_stage: PipelineStage,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            application_id,
            action,
            from_stage,
            to_stage,
            automation_triggered: action.is_automated(),
            performed_by: None,
            details: Value::Object(serde_json::Map::new()),
            created_at: clock.utc(),
        }
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_performed_by(mut self, performed_by: Option<String>) -> Self {
        self.performed_by = performed_by
            .map(|actor| actor.trim().to_owned())
            .filter(|actor| !actor.is_empty());
        self
    }

    /// Sets the entry details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}
