//! Request body sent to the mail functions.

use crate::pipeline::domain::Application;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON body accepted by every `send-*` mail function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    /// Candidate display name.
    pub candidate_name: String,
    /// Recipient address.
    pub candidate_email: String,
    /// Job title shown in the message.
    pub job_title: String,
    /// Interview portal link, for invitations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_link: Option<String>,
    /// Interview start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Interview link expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<DateTime<Utc>>,
}

impl EmailPayload {
    /// Creates a payload addressed to the candidate of `application`.
    #[must_use]
    pub fn for_application(application: &Application, job_title: &str) -> Self {
        Self {
            candidate_name: application.candidate_name().as_str().to_owned(),
            candidate_email: application.email().as_str().to_owned(),
            job_title: job_title.to_owned(),
            interview_link: None,
            scheduled_for: None,
            token_expiry: None,
        }
    }

    /// Adds the interview link and its schedule.
    #[must_use]
    pub fn with_interview(
        mut self,
        interview_link: impl Into<String>,
        scheduled_for: DateTime<Utc>,
        token_expiry: DateTime<Utc>,
    ) -> Self {
        self.interview_link = Some(interview_link.into());
        self.scheduled_for = Some(scheduled_for);
        self.token_expiry = Some(token_expiry);
        self
    }
}
