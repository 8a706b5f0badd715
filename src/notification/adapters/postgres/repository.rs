//! `PostgreSQL` repository implementation for the email queue.

use super::{
    models::{EmailDeliveryChangeset, EmailQueueRow},
    schema::email_queue,
};
use crate::db::{DbAccessError, PgPool, run_blocking};
use crate::notification::{
    domain::{
        DeliveryWindow, EmailKind, EmailPayload, EmailStatus, PersistedQueuedEmailData,
        QueuedEmail, QueuedEmailId,
    },
    ports::{EmailQueueError, EmailQueueRepository, EmailQueueResult},
};
use crate::pipeline::domain::ApplicationId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;

/// `PostgreSQL`-backed email queue.
#[derive(Debug, Clone)]
pub struct PostgresEmailQueue {
    pool: PgPool,
}

impl PostgresEmailQueue {
    /// Creates a new queue from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<DbAccessError> for EmailQueueError {
    fn from(err: DbAccessError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for EmailQueueError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl EmailQueueRepository for PostgresEmailQueue {
    async fn enqueue(&self, email: &QueuedEmail) -> EmailQueueResult<()> {
        let row = to_row(email)?;
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(email_queue::table)
                .values(&row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn claim(
        &self,
        id: QueuedEmailId,
        window: DeliveryWindow,
    ) -> EmailQueueResult<Option<QueuedEmail>> {
        let retry_ceiling = i32::try_from(window.max_retries).map_err(EmailQueueError::persistence)?;
        run_blocking(&self.pool, move |connection| {
            let claimed = diesel::update(
                email_queue::table
                    .filter(email_queue::id.eq(id.into_inner()))
                    .filter(email_queue::scheduled_for.le(window.now))
                    .filter(email_queue::retry_count.lt(retry_ceiling))
                    .filter(
                        email_queue::status.eq(EmailStatus::Pending.as_str()).or(email_queue::status
                            .eq(EmailStatus::Sending.as_str())
                            .and(email_queue::claimed_at.lt(window.stale_before))),
                    ),
            )
            .set((
                email_queue::status.eq(EmailStatus::Sending.as_str()),
                email_queue::claimed_at.eq(Some(window.now)),
            ))
            .returning(EmailQueueRow::as_returning())
            .get_result::<EmailQueueRow>(connection)
            .optional()?;
            match claimed {
                Some(row) => row_to_email(row).map(Some),
                None => {
                    ensure_exists(connection, id)?;
                    Ok(None)
                }
            }
        })
        .await
    }

    async fn update(
        &self,
        email: &QueuedEmail,
        claimed_at: DateTime<Utc>,
    ) -> EmailQueueResult<()> {
        let email_id = email.id();
        let changeset = EmailDeliveryChangeset {
            status: email.status().as_str().to_owned(),
            retry_count: i32::try_from(email.retry_count()).map_err(EmailQueueError::persistence)?,
            sent_at: email.sent_at(),
            error_message: email.error_message().map(str::to_owned),
            claimed_at: email.claimed_at(),
        };
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(
                email_queue::table
                    .filter(email_queue::id.eq(email_id.into_inner()))
                    .filter(email_queue::status.eq(EmailStatus::Sending.as_str()))
                    .filter(email_queue::claimed_at.eq(claimed_at)),
            )
            .set(&changeset)
            .execute(connection)?;
            if updated == 0 {
                ensure_exists(connection, email_id)?;
                return Err(EmailQueueError::NotClaimed(email_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_due(
        &self,
        window: DeliveryWindow,
        limit: u32,
    ) -> EmailQueueResult<Vec<QueuedEmail>> {
        let retry_ceiling = i32::try_from(window.max_retries).map_err(EmailQueueError::persistence)?;
        let row_limit = i64::from(limit);
        run_blocking(&self.pool, move |connection| {
            let rows = email_queue::table
                .filter(email_queue::scheduled_for.le(window.now))
                .filter(email_queue::retry_count.lt(retry_ceiling))
                .filter(
                    email_queue::status.eq(EmailStatus::Pending.as_str()).or(email_queue::status
                        .eq(EmailStatus::Sending.as_str())
                        .and(email_queue::claimed_at.lt(window.stale_before))),
                )
                .order(email_queue::scheduled_for.asc())
                .limit(row_limit)
                .select(EmailQueueRow::as_select())
                .load::<EmailQueueRow>(connection)?;
            rows.into_iter().map(row_to_email).collect()
        })
        .await
    }

    async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> EmailQueueResult<Vec<QueuedEmail>> {
        run_blocking(&self.pool, move |connection| {
            let rows = email_queue::table
                .filter(email_queue::application_id.eq(application_id.into_inner()))
                .order(email_queue::created_at.asc())
                .select(EmailQueueRow::as_select())
                .load::<EmailQueueRow>(connection)?;
            rows.into_iter().map(row_to_email).collect()
        })
        .await
    }
}

fn ensure_exists(connection: &mut PgConnection, id: QueuedEmailId) -> EmailQueueResult<()> {
    email_queue::table
        .find(id.into_inner())
        .select(email_queue::id)
        .first::<uuid::Uuid>(connection)
        .optional()?
        .map(|_| ())
        .ok_or(EmailQueueError::NotFound(id))
}

pub(super) fn to_row(email: &QueuedEmail) -> EmailQueueResult<EmailQueueRow> {
    Ok(EmailQueueRow {
        id: email.id().into_inner(),
        application_id: email.application_id().into_inner(),
        email_kind: email.kind().as_str().to_owned(),
        payload: serde_json::to_value(email.payload()).map_err(EmailQueueError::persistence)?,
        status: email.status().as_str().to_owned(),
        retry_count: i32::try_from(email.retry_count()).map_err(EmailQueueError::persistence)?,
        scheduled_for: email.scheduled_for(),
        sent_at: email.sent_at(),
        error_message: email.error_message().map(str::to_owned),
        claimed_at: email.claimed_at(),
        created_at: email.created_at(),
    })
}

pub(super) fn row_to_email(row: EmailQueueRow) -> EmailQueueResult<QueuedEmail> {
    let data = PersistedQueuedEmailData {
        id: QueuedEmailId::from_uuid(row.id),
        application_id: ApplicationId::from_uuid(row.application_id),
        kind: EmailKind::try_from(row.email_kind.as_str()).map_err(EmailQueueError::persistence)?,
        payload: serde_json::from_value::<EmailPayload>(row.payload)
            .map_err(EmailQueueError::persistence)?,
        status: EmailStatus::try_from(row.status.as_str()).map_err(EmailQueueError::persistence)?,
        retry_count: u32::try_from(row.retry_count).map_err(EmailQueueError::persistence)?,
        scheduled_for: row.scheduled_for,
        sent_at: row.sent_at,
        error_message: row.error_message,
        claimed_at: row.claimed_at,
        created_at: row.created_at,
    };
    Ok(QueuedEmail::from_persisted(data))
}
