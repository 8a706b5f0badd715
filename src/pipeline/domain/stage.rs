//! Pipeline stage state machine and screening status.

use super::{ParsePipelineStageError, ParseScreeningStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse screening outcome shown on HR dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    /// No decision has been made.
    Pending,
    /// The candidate passed screening.
    Selected,
    /// The candidate was turned down.
    Rejected,
}

impl ScreeningStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ScreeningStatus {
    type Error = ParseScreeningStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseScreeningStatusError(value.to_owned())),
        }
    }
}

/// Position of an application in the hiring funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Submitted and awaiting screening.
    Applied,
    /// Passed screening.
    Selected,
    /// Turned down at any point.
    Rejected,
    /// An automated interview invitation has been issued.
    InterviewScheduled,
    /// The candidate completed the interview.
    Interviewed,
    /// An offer has been extended.
    Offered,
}

impl PipelineStage {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
            Self::InterviewScheduled => "interview_scheduled",
            Self::Interviewed => "interviewed",
            Self::Offered => "offered",
        }
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Offered)
    }

    /// Returns whether moving to `target` is a forward funnel step.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Applied, Self::Selected | Self::Rejected)
                | (Self::Selected, Self::InterviewScheduled | Self::Rejected)
                | (Self::InterviewScheduled, Self::Interviewed | Self::Rejected)
                | (Self::Interviewed, Self::Offered | Self::Rejected)
        )
    }

    /// Returns the screening status implied by this stage.
    #[must_use]
    pub const fn screening_status(self) -> ScreeningStatus {
        match self {
            Self::Applied => ScreeningStatus::Pending,
            Self::Rejected => ScreeningStatus::Rejected,
            Self::Selected | Self::InterviewScheduled | Self::Interviewed | Self::Offered => {
                ScreeningStatus::Selected
            }
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PipelineStage {
    type Error = ParsePipelineStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "applied" => Ok(Self::Applied),
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            "interview_scheduled" => Ok(Self::InterviewScheduled),
            "interviewed" => Ok(Self::Interviewed),
            "offered" => Ok(Self::Offered),
            _ => Err(ParsePipelineStageError(value.to_owned())),
        }
    }
}

/// Accept/reject outcome of screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningDecision {
    /// Advance the candidate.
    Selected,
    /// Turn the candidate down.
    Rejected,
}

impl ScreeningDecision {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the pipeline stage this decision moves to.
    #[must_use]
    pub const fn target_stage(self) -> PipelineStage {
        match self {
            Self::Selected => PipelineStage::Selected,
            Self::Rejected => PipelineStage::Rejected,
        }
    }
}

impl TryFrom<&str> for ScreeningDecision {
    type Error = ParseScreeningStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseScreeningStatusError(value.to_owned())),
        }
    }
}

/// Set-once guard marking that a notification has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationFlag {
    /// `selection_email_sent`.
    SelectionEmailSent,
    /// `rejection_email_sent`.
    RejectionEmailSent,
    /// `interview_invitation_sent`.
    InterviewInvitationSent,
    /// `interview_scheduled_email_sent`.
    InterviewScheduledEmailSent,
    /// `interview_completed_email_sent`.
    InterviewCompletedEmailSent,
}

impl NotificationFlag {
    /// Every flag, in storage column order.
    pub const ALL: [Self; 5] = [
        Self::SelectionEmailSent,
        Self::RejectionEmailSent,
        Self::InterviewInvitationSent,
        Self::InterviewScheduledEmailSent,
        Self::InterviewCompletedEmailSent,
    ];

    /// Returns the storage column name for the flag.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::SelectionEmailSent => "selection_email_sent",
            Self::RejectionEmailSent => "rejection_email_sent",
            Self::InterviewInvitationSent => "interview_invitation_sent",
            Self::InterviewScheduledEmailSent => "interview_scheduled_email_sent",
            Self::InterviewCompletedEmailSent => "interview_completed_email_sent",
        }
    }
}

impl fmt::Display for NotificationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Snapshot of the sent flags stored on an application record.
///
/// Flags are only ever raised through
/// [`ApplicationRepository::claim_notification`](crate::pipeline::ports::ApplicationRepository::claim_notification);
/// the aggregate carries them read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationFlags {
    /// Selection email dispatched.
    pub selection_email_sent: bool,
    /// Rejection email dispatched.
    pub rejection_email_sent: bool,
    /// Interview invitation issued.
    pub interview_invitation_sent: bool,
    /// Interview scheduled email dispatched.
    pub interview_scheduled_email_sent: bool,
    /// Interview completed email dispatched.
    pub interview_completed_email_sent: bool,
}

impl NotificationFlags {
    /// Returns whether `flag` is raised.
    #[must_use]
    pub const fn is_set(&self, flag: NotificationFlag) -> bool {
        match flag {
            NotificationFlag::SelectionEmailSent => self.selection_email_sent,
            NotificationFlag::RejectionEmailSent => self.rejection_email_sent,
            NotificationFlag::InterviewInvitationSent => self.interview_invitation_sent,
            NotificationFlag::InterviewScheduledEmailSent => self.interview_scheduled_email_sent,
            NotificationFlag::InterviewCompletedEmailSent => self.interview_completed_email_sent,
        }
    }

    /// Raises `flag`. Returns `false` when it was already raised.
    pub const fn raise(&mut self, flag: NotificationFlag) -> bool {
        let slot = match flag {
            NotificationFlag::SelectionEmailSent => &mut self.selection_email_sent,
            NotificationFlag::RejectionEmailSent => &mut self.rejection_email_sent,
            NotificationFlag::InterviewInvitationSent => &mut self.interview_invitation_sent,
            NotificationFlag::InterviewScheduledEmailSent => {
                &mut self.interview_scheduled_email_sent
            }
            NotificationFlag::InterviewCompletedEmailSent => {
                &mut self.interview_completed_email_sent
            }
        };
        if *slot {
            return false;
        }
        *slot = true;
        true
    }
}
