//! Queued email aggregate and its classification enums.

use super::{EmailPayload, ParseEmailKindError, ParseEmailStatusError};
use crate::pipeline::domain::{ApplicationId, NotificationFlag};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a queued email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueuedEmailId(Uuid);

impl QueuedEmailId {
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

impl Default for QueuedEmailId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueuedEmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of candidate email; each kind has one mail function and one sent
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    /// Candidate passed screening.
    Selection,
    /// Candidate was turned down.
    Rejection,
    /// Interview invitation with portal link.
    InterviewScheduled,
    /// Interview received confirmation.
    InterviewCompleted,
}

impl EmailKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Rejection => "rejection",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
        }
    }

    /// Returns the remote mail function that delivers this kind.
    #[must_use]
    pub const fn function_name(self) -> &'static str {
        match self {
            Self::Selection => "send-selection-email",
            Self::Rejection => "send-rejection-email",
            Self::InterviewScheduled => "send-interview-scheduled",
            Self::InterviewCompleted => "send-interview-completed",
        }
    }

    /// Returns the sent flag guarding this kind.
    #[must_use]
    pub const fn flag(self) -> NotificationFlag {
        match self {
            Self::Selection => NotificationFlag::SelectionEmailSent,
            Self::Rejection => NotificationFlag::RejectionEmailSent,
            Self::InterviewScheduled => NotificationFlag::InterviewScheduledEmailSent,
            Self::InterviewCompleted => NotificationFlag::InterviewCompletedEmailSent,
        }
    }
}

impl fmt::Display for EmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EmailKind {
    type Error = ParseEmailKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "selection" => Ok(Self::Selection),
            "rejection" => Ok(Self::Rejection),
            "interview_scheduled" => Ok(Self::InterviewScheduled),
            "interview_completed" => Ok(Self::InterviewCompleted),
            _ => Err(ParseEmailKindError(value.to_owned())),
        }
    }
}

/// Delivery status of a queued email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// Awaiting delivery or retry.
    Pending,
    /// Claimed by a processor; delivery in flight.
    Sending,
    /// Delivered.
    Sent,
    /// Retries exhausted.
    Failed,
}

impl EmailStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for EmailStatus {
    type Error = ParseEmailStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "sending" => Ok(Self::Sending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseEmailStatusError(value.to_owned())),
        }
    }
}

/// Bounds used to decide whether an email may be claimed for delivery.
///
/// A `sending` email whose claim is older than `stale_before` belongs to a
/// processor that died mid-attempt and may be claimed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindow {
    /// Claim time; emails scheduled after it are not yet due.
    pub now: DateTime<Utc>,
    /// Failed attempts after which an email is no longer retried.
    pub max_retries: u32,
    /// Claims taken before this instant are treated as abandoned.
    pub stale_before: DateTime<Utc>,
}

/// Email waiting in, or retired from, the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedEmail {
    id: QueuedEmailId,
    application_id: ApplicationId,
    kind: EmailKind,
    payload: EmailPayload,
    status: EmailStatus,
    retry_count: u32,
    scheduled_for: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted queued email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQueuedEmailData {
    /// Persisted identifier.
    pub id: QueuedEmailId,
    /// Owning application.
    pub application_id: ApplicationId,
    /// Email kind.
    pub kind: EmailKind,
    /// Request body.
    pub payload: EmailPayload,
    /// Delivery status.
    pub status: EmailStatus,
    /// Failed delivery attempts.
    pub retry_count: u32,
    /// Earliest delivery time.
    pub scheduled_for: DateTime<Utc>,
    /// Delivery time.
    pub sent_at: Option<DateTime<Utc>>,
    /// Last delivery error.
    pub error_message: Option<String>,
    /// When a processor claimed the email.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl QueuedEmail {
    /// Creates a pending email due at `scheduled_for`.
    #[must_use]
    pub fn new(
        application_id: ApplicationId,
        kind: EmailKind,
        payload: EmailPayload,
        scheduled_for: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: QueuedEmailId::new(),
            application_id,
            kind,
            payload,
            status: EmailStatus::Pending,
            retry_count: 0,
            scheduled_for,
            sent_at: None,
            error_message: None,
            claimed_at: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a queued email from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedQueuedEmailData) -> Self {
        Self {
            id: data.id,
            application_id: data.application_id,
            kind: data.kind,
            payload: data.payload,
            status: data.status,
            retry_count: data.retry_count,
            scheduled_for: data.scheduled_for,
            sent_at: data.sent_at,
            error_message: data.error_message,
            claimed_at: data.claimed_at,
            created_at: data.created_at,
        }
    }

    /// Returns the email identifier.
    #[must_use]
    pub const fn id(&self) -> QueuedEmailId {
        self.id
    }

    /// Returns the owning application.
    #[must_use]
    pub const fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the email kind.
    #[must_use]
    pub const fn kind(&self) -> EmailKind {
        self.kind
    }

    /// Returns the request body.
    #[must_use]
    pub const fn payload(&self) -> &EmailPayload {
        &self.payload
    }

    /// Returns the delivery status.
    #[must_use]
    pub const fn status(&self) -> EmailStatus {
        self.status
    }

    /// Returns the number of failed delivery attempts.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns the earliest delivery time.
    #[must_use]
    pub const fn scheduled_for(&self) -> DateTime<Utc> {
        self.scheduled_for
    }

    /// Returns when the email was delivered.
    #[must_use]
    pub const fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Returns the last delivery error.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns when a processor last claimed the email.
    #[must_use]
    pub const fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether a processor may claim the email within `window`.
    #[must_use]
    pub fn is_claimable(&self, window: DeliveryWindow) -> bool {
        let available = match self.status {
            EmailStatus::Pending => true,
            EmailStatus::Sending => self
                .claimed_at
                .is_none_or(|claimed| claimed < window.stale_before),
            EmailStatus::Sent | EmailStatus::Failed => false,
        };
        available && self.scheduled_for <= window.now && self.retry_count < window.max_retries
    }

    /// Marks the email as claimed for a delivery attempt at `claimed_at`.
    pub fn claim(&mut self, claimed_at: DateTime<Utc>) {
        self.status = EmailStatus::Sending;
        self.claimed_at = Some(claimed_at);
    }

    /// Records a successful delivery.
    pub fn mark_sent(&mut self, clock: &impl Clock) {
        self.status = EmailStatus::Sent;
        self.sent_at = Some(clock.utc());
        self.claimed_at = None;
    }

    /// Records a failed delivery; the email fails permanently once
    /// `max_retries` attempts have failed.
    pub fn record_failure(&mut self, error_message: impl Into<String>, max_retries: u32) {
        self.retry_count = self.retry_count.saturating_add(1);
        self.error_message = Some(error_message.into());
        self.claimed_at = None;
        self.status = if self.retry_count >= max_retries {
            EmailStatus::Failed
        } else {
            EmailStatus::Pending
        };
    }
}
