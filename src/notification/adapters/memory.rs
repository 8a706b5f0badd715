//! In-memory email queue for tests and database-less runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{DeliveryWindow, EmailStatus, QueuedEmail, QueuedEmailId},
    ports::{EmailQueueError, EmailQueueRepository, EmailQueueResult},
};
use crate::pipeline::domain::ApplicationId;

/// Thread-safe in-memory email queue.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailQueue {
    emails: Arc<RwLock<HashMap<QueuedEmailId, QueuedEmail>>>,
}

impl InMemoryEmailQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> EmailQueueError {
    EmailQueueError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl EmailQueueRepository for InMemoryEmailQueue {
    async fn enqueue(&self, email: &QueuedEmail) -> EmailQueueResult<()> {
        let mut emails = self.emails.write().map_err(lock_poisoned)?;
        emails.insert(email.id(), email.clone());
        Ok(())
    }

    async fn claim(
        &self,
        id: QueuedEmailId,
        window: DeliveryWindow,
    ) -> EmailQueueResult<Option<QueuedEmail>> {
        let mut emails = self.emails.write().map_err(lock_poisoned)?;
        let stored = emails.get_mut(&id).ok_or(EmailQueueError::NotFound(id))?;
        if !stored.is_claimable(window) {
            return Ok(None);
        }
        stored.claim(window.now);
        Ok(Some(stored.clone()))
    }

    async fn update(
        &self,
        email: &QueuedEmail,
        claimed_at: DateTime<Utc>,
    ) -> EmailQueueResult<()> {
        let mut emails = self.emails.write().map_err(lock_poisoned)?;
        let stored = emails
            .get_mut(&email.id())
            .ok_or(EmailQueueError::NotFound(email.id()))?;
        if stored.status() != EmailStatus::Sending || stored.claimed_at() != Some(claimed_at) {
            return Err(EmailQueueError::NotClaimed(email.id()));
        }
        *stored = email.clone();
        Ok(())
    }

    async fn find_due(
        &self,
        window: DeliveryWindow,
        limit: u32,
    ) -> EmailQueueResult<Vec<QueuedEmail>> {
        let emails = self.emails.read().map_err(lock_poisoned)?;
        let mut due: Vec<QueuedEmail> = emails
            .values()
            .filter(|email| email.is_claimable(window))
            .cloned()
            .collect();
        due.sort_by_key(QueuedEmail::scheduled_for);
        due.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(due)
    }

    async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> EmailQueueResult<Vec<QueuedEmail>> {
        let emails = self.emails.read().map_err(lock_poisoned)?;
        let mut matching: Vec<QueuedEmail> = emails
            .values()
            .filter(|email| email.application_id() == application_id)
            .cloned()
            .collect();
        matching.sort_by_key(QueuedEmail::created_at);
        Ok(matching)
    }
}
