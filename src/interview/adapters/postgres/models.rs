//! Diesel row models for interview persistence.

use super::schema::{interview_tokens, interviews};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model for interviews.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = interviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InterviewRow {
    /// Interview identifier.
    pub id: uuid::Uuid,
    /// Owning application.
    pub application_id: uuid::Uuid,
    /// Candidate display name.
    pub candidate_name: String,
    /// Lifecycle status.
    pub status: String,
    /// Start time.
    pub scheduled_for: DateTime<Utc>,
    /// Portal link.
    pub interview_link: String,
    /// Interview kind.
    pub interview_type: String,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for interview tokens.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = interview_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InterviewTokenRow {
    /// Token identifier.
    pub id: uuid::Uuid,
    /// Owning application.
    pub application_id: uuid::Uuid,
    /// Interview the token opens.
    pub interview_id: uuid::Uuid,
    /// Secret digest.
    pub token_digest: String,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Consumption time.
    pub used_at: Option<DateTime<Utc>>,
    /// Completion marker.
    pub interview_completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
