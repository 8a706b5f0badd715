//! Repository port for the durable email queue.

use crate::notification::domain::{DeliveryWindow, QueuedEmail, QueuedEmailId};
use crate::pipeline::domain::ApplicationId;
use crate::pipeline::ports::ApplicationRepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for email queue operations.
pub type EmailQueueResult<T> = Result<T, EmailQueueError>;

/// Email queue persistence contract.
#[async_trait]
pub trait EmailQueueRepository: Send + Sync {
    /// Appends a new email to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::Persistence`] when the write fails.
    async fn enqueue(&self, email: &QueuedEmail) -> EmailQueueResult<()>;

    /// Atomically moves a claimable email to `sending`, stamping the claim
    /// with `window.now`.
    ///
    /// Returns `None` when the email is settled, not yet due, or claimed by
    /// another processor whose claim has not gone stale. At most one caller
    /// wins the claim for a given attempt.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::NotFound`] when the email does not exist.
    async fn claim(
        &self,
        id: QueuedEmailId,
        window: DeliveryWindow,
    ) -> EmailQueueResult<Option<QueuedEmail>>;

    /// Persists the outcome of a delivery attempt on a claimed email.
    ///
    /// `claimed_at` is the stamp of the caller's claim. The write only lands
    /// while the stored email is still `sending` under that same claim, so a
    /// run whose claim was taken over cannot overwrite the newer attempt.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::NotFound`] when the email does not exist
    /// and [`EmailQueueError::NotClaimed`] when the stored email is not in
    /// `sending` under `claimed_at`.
    async fn update(
        &self,
        email: &QueuedEmail,
        claimed_at: DateTime<Utc>,
    ) -> EmailQueueResult<()>;

    /// Returns up to `limit` emails claimable within `window`, earliest
    /// `scheduled_for` first.
    async fn find_due(
        &self,
        window: DeliveryWindow,
        limit: u32,
    ) -> EmailQueueResult<Vec<QueuedEmail>>;

    /// Returns every email queued for an application, oldest first.
    async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> EmailQueueResult<Vec<QueuedEmail>>;
}

/// Errors returned by the email queue and its services.
#[derive(Debug, Clone, Error)]
pub enum EmailQueueError {
    /// The queued email was not found.
    #[error("queued email not found: {0}")]
    NotFound(QueuedEmailId),

    /// The email's delivery outcome was written without holding its claim.
    #[error("queued email is not claimed for delivery: {0}")]
    NotClaimed(QueuedEmailId),

    /// Claiming the application's sent flag failed.
    #[error(transparent)]
    Application(#[from] ApplicationRepositoryError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EmailQueueError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
