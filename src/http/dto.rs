//! Request bodies and response views of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::interview::{
    domain::InterviewId,
    services::{CompletedInterview, ScheduledInterview},
};
use crate::notification::services::NotificationDispatch;
use crate::pipeline::{
    domain::{Application, ApplicationId, AtsScore, ResumeAnalysis, ScreeningStatus},
    services::{AiScreeningOutcome, DecisionOutcome, PendingScreeningResult},
};

/// `POST /api/v1/applications`
#[derive(Debug, Deserialize)]
pub struct SubmitApplicationBody {
    /// Candidate name.
    pub candidate_name: String,
    /// Candidate email.
    pub email: String,
    /// Position applied for.
    pub position_applied: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional job role reference.
    #[serde(default)]
    pub job_role_id: Option<Uuid>,
    /// Optional stored resume location.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Optional structured resume extraction.
    #[serde(default)]
    pub parsed_resume: Option<Value>,
    /// Intake channel, `portal` when omitted.
    #[serde(default)]
    pub source: Option<String>,
}

/// `GET /api/v1/applications` query.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Screening status filter.
    #[serde(default)]
    pub status: Option<String>,
}

/// `POST /api/v1/applications/:id/decision`
#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    /// `selected` or `rejected`.
    pub decision: String,
    /// Acting HR user.
    #[serde(default)]
    pub performed_by: Option<String>,
}

/// `POST /api/v1/applications/:id/interview`
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleBody {
    /// Hours until the interview starts.
    #[serde(default)]
    pub delay_hours: Option<u32>,
}

/// `POST /api/v1/applications/:id/offer`
#[derive(Debug, Default, Deserialize)]
pub struct OfferBody {
    /// Acting HR user.
    #[serde(default)]
    pub performed_by: Option<String>,
}

/// Application with its derived screening status.
#[derive(Debug, Serialize)]
pub struct ApplicationView<'a> {
    /// Stored application.
    #[serde(flatten)]
    pub application: &'a Application,
    /// Status derived from the stage.
    pub screening_status: ScreeningStatus,
}

impl<'a> From<&'a Application> for ApplicationView<'a> {
    fn from(application: &'a Application) -> Self {
        Self {
            application,
            screening_status: application.screening_status(),
        }
    }
}

/// Issued interview invitation.
#[derive(Debug, Serialize)]
pub struct InvitationView<'a> {
    /// Interview identifier.
    pub interview_id: InterviewId,
    /// Portal link containing the secret.
    pub interview_link: &'a str,
    /// Portal secret, shown only in this response.
    pub token: &'a str,
    /// Interview start.
    pub scheduled_for: DateTime<Utc>,
    /// Token expiry.
    pub token_expires_at: DateTime<Utc>,
    /// Invitation email outcome.
    pub notification: &'a NotificationDispatch,
}

impl<'a> From<&'a ScheduledInterview> for InvitationView<'a> {
    fn from(scheduled: &'a ScheduledInterview) -> Self {
        Self {
            interview_id: scheduled.interview.id(),
            interview_link: scheduled.interview.interview_link(),
            token: scheduled.secret.as_str(),
            scheduled_for: scheduled.interview.scheduled_for(),
            token_expires_at: scheduled.token_expires_at,
            notification: &scheduled.notification,
        }
    }
}

/// Response to scheduling an interview.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse<'a> {
    /// Application after scheduling.
    pub application: ApplicationView<'a>,
    /// The invitation.
    pub interview: InvitationView<'a>,
}

impl<'a> From<&'a ScheduledInterview> for ScheduleResponse<'a> {
    fn from(scheduled: &'a ScheduledInterview) -> Self {
        Self {
            application: ApplicationView::from(&scheduled.application),
            interview: InvitationView::from(scheduled),
        }
    }
}

/// Response to a manual decision.
#[derive(Debug, Serialize)]
pub struct DecisionResponse<'a> {
    /// Application after the decision.
    pub application: ApplicationView<'a>,
    /// Decision email outcome.
    pub notification: &'a NotificationDispatch,
    /// Automatically scheduled interview.
    pub interview: Option<InvitationView<'a>>,
}

impl<'a> From<&'a DecisionOutcome> for DecisionResponse<'a> {
    fn from(outcome: &'a DecisionOutcome) -> Self {
        Self {
            application: ApplicationView::from(&outcome.application),
            notification: &outcome.notification,
            interview: outcome.interview.as_ref().map(InvitationView::from),
        }
    }
}

/// Response to AI screening one application.
#[derive(Debug, Serialize)]
pub struct AiScreeningResponse<'a> {
    /// Application after the decision.
    pub application: ApplicationView<'a>,
    /// Model analysis.
    pub analysis: &'a ResumeAnalysis,
    /// Composite score.
    pub ats_score: AtsScore,
    /// Decision taken.
    pub decision: &'static str,
    /// Decision email outcome.
    pub notification: &'a NotificationDispatch,
}

impl<'a> From<&'a AiScreeningOutcome> for AiScreeningResponse<'a> {
    fn from(outcome: &'a AiScreeningOutcome) -> Self {
        Self {
            application: ApplicationView::from(&outcome.application),
            analysis: &outcome.analysis,
            ats_score: outcome.ats_score,
            decision: outcome.decision.as_str(),
            notification: &outcome.notification,
        }
    }
}

/// One entry of a bulk AI screening run.
#[derive(Debug, Serialize)]
pub struct PendingScreeningView {
    /// Screened application.
    pub application_id: ApplicationId,
    /// Whether screening succeeded.
    pub success: bool,
    /// The decision, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'static str>,
    /// The composite score, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_score: Option<AtsScore>,
    /// The failure, otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PendingScreeningResult> for PendingScreeningView {
    fn from(entry: &PendingScreeningResult) -> Self {
        match &entry.result {
            Ok(outcome) => Self {
                application_id: entry.application_id,
                success: true,
                decision: Some(outcome.decision.as_str()),
                ats_score: Some(outcome.ats_score),
                error: None,
            },
            Err(err) => Self {
                application_id: entry.application_id,
                success: false,
                decision: None,
                ats_score: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Response to a valid token lookup.
#[derive(Debug, Serialize)]
pub struct TokenValidationResponse {
    /// Always `true`; invalid tokens return an error.
    pub valid: bool,
    /// Application the token belongs to.
    pub application_id: ApplicationId,
    /// Interview the token opens.
    pub interview_id: InterviewId,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Response to completing an interview.
#[derive(Debug, Serialize)]
pub struct CompletionResponse<'a> {
    /// Candidate-facing confirmation.
    pub message: &'static str,
    /// Application after completion.
    pub application: ApplicationView<'a>,
    /// Completed interview identifier.
    pub interview_id: InterviewId,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completion email outcome, when it could be queued.
    pub notification: Option<&'a NotificationDispatch>,
    /// Whether the completion email still awaits delivery.
    pub notification_deferred: bool,
}

impl<'a> From<&'a CompletedInterview> for CompletionResponse<'a> {
    fn from(completed: &'a CompletedInterview) -> Self {
        Self {
            message: "Your interview has been saved",
            application: ApplicationView::from(&completed.application),
            interview_id: completed.interview.id(),
            completed_at: completed.interview.completed_at(),
            notification: completed.notification.as_ref(),
            notification_deferred: completed.notification_deferred,
        }
    }
}
