//! Flag-guarded enqueueing of candidate emails.

use crate::notification::{
    domain::{EmailKind, EmailPayload, QueuedEmail},
    ports::{EmailQueueRepository, EmailQueueResult},
};
use crate::pipeline::{domain::Application, ports::ApplicationRepository};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of asking the outbox to queue an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The flag was claimed and the email is queued.
    Queued(QueuedEmail),
    /// Another caller already claimed the flag; nothing was queued.
    AlreadyDispatched,
}

/// Queues at most one email of each kind per application.
pub struct NotificationOutbox<C>
where
    C: Clock + Send + Sync,
{
    applications: Arc<dyn ApplicationRepository>,
    queue: Arc<dyn EmailQueueRepository>,
    clock: Arc<C>,
}

impl<C> NotificationOutbox<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an outbox over the application store and the email queue.
    #[must_use]
    pub const fn new(
        applications: Arc<dyn ApplicationRepository>,
        queue: Arc<dyn EmailQueueRepository>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            applications,
            queue,
            clock,
        }
    }

    /// Claims the sent flag for `kind` and queues the email.
    ///
    /// # Errors
    ///
    /// Returns [`crate::notification::ports::EmailQueueError`] when the claim
    /// or the queue write fails. A flag claimed before a failed queue write
    /// stays raised.
    pub async fn enqueue(
        &self,
        application: &Application,
        kind: EmailKind,
        payload: EmailPayload,
        scheduled_for: DateTime<Utc>,
    ) -> EmailQueueResult<EnqueueOutcome> {
        let claimed = self
            .applications
            .claim_notification(application.id(), kind.flag())
            .await?;
        if !claimed {
            warn!(
                application_id = %application.id(),
                %kind,
                "notification already dispatched, skipping"
            );
            return Ok(EnqueueOutcome::AlreadyDispatched);
        }

        let email = QueuedEmail::new(application.id(), kind, payload, scheduled_for, &*self.clock);
        self.queue.enqueue(&email).await?;
        info!(
            application_id = %application.id(),
            email_id = %email.id(),
            %kind,
            %scheduled_for,
            "queued candidate email"
        );
        Ok(EnqueueOutcome::Queued(email))
    }
}
