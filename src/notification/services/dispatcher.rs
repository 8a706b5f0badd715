//! Queue-then-deliver dispatch used by pipeline transitions.

use super::{EmailQueueProcessor, EnqueueOutcome, NotificationOutbox};
use crate::notification::{
    domain::{EmailKind, EmailPayload, EmailStatus, QueuedEmailId},
    ports::EmailQueueResult,
};
use crate::pipeline::domain::Application;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// What happened to a notification triggered by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationDispatch {
    /// Delivered immediately.
    Delivered {
        /// Queue entry.
        email_id: QueuedEmailId,
    },
    /// Queued, but the immediate attempt failed; the queue processor retries.
    Deferred {
        /// Queue entry.
        email_id: QueuedEmailId,
        /// Failure reported by the attempt.
        reason: String,
    },
    /// Queued for a later delivery time.
    Scheduled {
        /// Queue entry.
        email_id: QueuedEmailId,
        /// Earliest delivery time.
        scheduled_for: DateTime<Utc>,
    },
    /// The sent flag was already claimed; nothing was queued.
    AlreadyDispatched,
}

impl NotificationDispatch {
    /// Returns whether the email is committed to the queue or delivered.
    #[must_use]
    pub const fn is_dispatched(&self) -> bool {
        !matches!(self, Self::AlreadyDispatched)
    }
}

/// Commits a notification to the queue, then attempts delivery when it is
/// already due.
pub struct NotificationDispatcher<C>
where
    C: Clock + Send + Sync,
{
    outbox: NotificationOutbox<C>,
    processor: Arc<EmailQueueProcessor<C>>,
    clock: Arc<C>,
}

impl<C> NotificationDispatcher<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(
        outbox: NotificationOutbox<C>,
        processor: Arc<EmailQueueProcessor<C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            outbox,
            processor,
            clock,
        }
    }

    /// Returns the queue processor shared with this dispatcher.
    #[must_use]
    pub fn processor(&self) -> Arc<EmailQueueProcessor<C>> {
        Arc::clone(&self.processor)
    }

    /// Queues `kind` for `application` and delivers it if due now.
    ///
    /// # Errors
    ///
    /// Returns [`crate::notification::ports::EmailQueueError`] when the flag
    /// claim or the queue write fails. A failed delivery attempt is reported
    /// as [`NotificationDispatch::Deferred`].
    pub async fn dispatch(
        &self,
        application: &Application,
        kind: EmailKind,
        payload: EmailPayload,
        scheduled_for: DateTime<Utc>,
    ) -> EmailQueueResult<NotificationDispatch> {
        let email = match self
            .outbox
            .enqueue(application, kind, payload, scheduled_for)
            .await?
        {
            EnqueueOutcome::AlreadyDispatched => return Ok(NotificationDispatch::AlreadyDispatched),
            EnqueueOutcome::Queued(email) => email,
        };

        let email_id = email.id();
        if email.scheduled_for() > self.clock.utc() {
            return Ok(NotificationDispatch::Scheduled {
                email_id,
                scheduled_for: email.scheduled_for(),
            });
        }

        match self.processor.deliver(email).await {
            Ok(Some(delivered)) if delivered.status() == EmailStatus::Sent => {
                Ok(NotificationDispatch::Delivered { email_id })
            }
            Ok(Some(delivered)) => Ok(NotificationDispatch::Deferred {
                email_id,
                reason: delivered.error_message().unwrap_or_default().to_owned(),
            }),
            Ok(None) => Ok(NotificationDispatch::Deferred {
                email_id,
                reason: "delivery already in progress".to_owned(),
            }),
            Err(err) => {
                warn!(%email_id, error = %err, "immediate delivery not recorded, left queued");
                Ok(NotificationDispatch::Deferred {
                    email_id,
                    reason: err.to_string(),
                })
            }
        }
    }
}
