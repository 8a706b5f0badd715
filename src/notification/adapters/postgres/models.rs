//! Diesel row models for the email queue.

use super::schema::email_queue;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row model for queued emails.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = email_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailQueueRow {
    /// Email identifier.
    pub id: uuid::Uuid,
    /// Owning application.
    pub application_id: uuid::Uuid,
    /// Email kind.
    pub email_kind: String,
    /// Request body.
    pub payload: Value,
    /// Delivery status.
    pub status: String,
    /// Failed delivery attempts.
    pub retry_count: i32,
    /// Earliest delivery time.
    pub scheduled_for: DateTime<Utc>,
    /// Delivery time.
    pub sent_at: Option<DateTime<Utc>>,
    /// Last delivery error.
    pub error_message: Option<String>,
    /// Delivery claim time.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Delivery state written after an attempt.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = email_queue)]
#[diesel(treat_none_as_null = true)]
pub struct EmailDeliveryChangeset {
    /// Delivery status.
    pub status: String,
    /// Failed delivery attempts.
    pub retry_count: i32,
    /// Delivery time.
    pub sent_at: Option<DateTime<Utc>>,
    /// Last delivery error.
    pub error_message: Option<String>,
    /// Delivery claim time; cleared once the attempt settles.
    pub claimed_at: Option<DateTime<Utc>>,
}
