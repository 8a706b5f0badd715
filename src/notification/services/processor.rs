//! Delivery of queued emails with bounded retries.

use crate::notification::{
    domain::{DeliveryWindow, EmailStatus, QueuedEmail},
    ports::{EmailQueueRepository, EmailQueueResult, NotificationGateway},
};
use chrono::Duration;
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Retry and batching limits for queue processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    /// Failed attempts after which an email is marked `failed`.
    pub max_retries: u32,
    /// Emails loaded per processing run.
    pub batch_size: u32,
    /// Age after which an unfinished claim is taken over by another run.
    pub claim_timeout: Duration,
}

impl QueueSettings {
    /// Default retry limit.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Default batch size.
    pub const DEFAULT_BATCH_SIZE: u32 = 50;
    /// Default claim timeout in seconds.
    pub const DEFAULT_CLAIM_TIMEOUT_SECS: i64 = 300;
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            claim_timeout: Duration::seconds(Self::DEFAULT_CLAIM_TIMEOUT_SECS),
        }
    }
}

/// Summary of one processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueReport {
    /// Emails attempted.
    pub processed: usize,
    /// Emails delivered.
    pub succeeded: usize,
    /// Emails whose attempt failed.
    pub failed: usize,
    /// Due emails another run claimed first.
    pub skipped: usize,
}

/// Sends queued emails through the gateway and records the outcome.
pub struct EmailQueueProcessor<C>
where
    C: Clock + Send + Sync,
{
    queue: Arc<dyn EmailQueueRepository>,
    gateway: Arc<dyn NotificationGateway>,
    settings: QueueSettings,
    clock: Arc<C>,
}

impl<C> EmailQueueProcessor<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a processor.
    #[must_use]
    pub const fn new(
        queue: Arc<dyn EmailQueueRepository>,
        gateway: Arc<dyn NotificationGateway>,
        settings: QueueSettings,
        clock: Arc<C>,
    ) -> Self {
        Self {
            queue,
            gateway,
            settings,
            clock,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn settings(&self) -> QueueSettings {
        self.settings
    }

    fn window(&self) -> DeliveryWindow {
        let now = self.clock.utc();
        DeliveryWindow {
            now,
            max_retries: self.settings.max_retries,
            stale_before: now - self.settings.claim_timeout,
        }
    }

    /// Claims one email, attempts delivery and persists the outcome.
    ///
    /// Returns `None` without calling the gateway when the email is no longer
    /// claimable: already settled, not yet due, or held by another run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::notification::ports::EmailQueueError`] when the claim
    /// or the outcome cannot be persisted. Gateway failures are recorded on
    /// the email, not returned.
    pub async fn deliver(&self, email: QueuedEmail) -> EmailQueueResult<Option<QueuedEmail>> {
        let window = self.window();
        let Some(mut email) = self.queue.claim(email.id(), window).await? else {
            debug!(email_id = %email.id(), "email not claimable, skipping");
            return Ok(None);
        };
        // Storage may round the stamp, so the returned claim is authoritative.
        let claimed_at = email.claimed_at().unwrap_or(window.now);

        match self.gateway.send(email.kind(), email.payload()).await {
            Ok(()) => {
                email.mark_sent(&*self.clock);
                info!(
                    email_id = %email.id(),
                    function = email.kind().function_name(),
                    "candidate email delivered"
                );
            }
            Err(err) => {
                email.record_failure(err.to_string(), self.settings.max_retries);
                if email.status() == EmailStatus::Failed {
                    error!(
                        email_id = %email.id(),
                        retry_count = email.retry_count(),
                        error = %err,
                        "candidate email failed permanently"
                    );
                } else {
                    warn!(
                        email_id = %email.id(),
                        retry_count = email.retry_count(),
                        error = %err,
                        "candidate email delivery deferred"
                    );
                }
            }
        }

        self.queue.update(&email, claimed_at).await?;
        Ok(Some(email))
    }

    /// Delivers every due email, up to the batch size.
    ///
    /// Concurrent runs may see the same due emails; each email is sent only
    /// by the run that claims it. A failure to persist one outcome is logged
    /// and counted as failed; the run continues with the next email.
    ///
    /// # Errors
    ///
    /// Returns [`crate::notification::ports::EmailQueueError`] when the due
    /// emails cannot be loaded.
    pub async fn process_due(&self) -> EmailQueueResult<QueueReport> {
        let due = self
            .queue
            .find_due(self.window(), self.settings.batch_size)
            .await?;

        let mut report = QueueReport::default();
        for email in due {
            let email_id = email.id();
            match self.deliver(email).await {
                Ok(None) => report.skipped += 1,
                Ok(Some(delivered)) => {
                    report.processed += 1;
                    if delivered.status() == EmailStatus::Sent {
                        report.succeeded += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Err(err) => {
                    error!(%email_id, error = %err, "failed to record email delivery outcome");
                    report.processed += 1;
                    report.failed += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "email queue processing complete"
        );
        Ok(report)
    }
}
