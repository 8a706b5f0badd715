//! Diesel row models for application persistence.

use super::schema::{applications, pipeline_audit_logs};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for application records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Candidate display name.
    pub candidate_name: String,
    /// Candidate email address.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Applied position title.
    pub position_applied: String,
    /// Optional job role reference.
    pub job_role_id: Option<uuid::Uuid>,
    /// Optional stored resume location.
    pub file_url: Option<String>,
    /// Optional structured resume extraction.
    pub parsed_resume: Option<Value>,
    /// Intake channel.
    pub source: String,
    /// Screening status.
    pub screening_status: String,
    /// Pipeline stage.
    pub pipeline_stage: String,
    /// Manual override marker.
    pub manual_override: bool,
    /// Optional model score.
    pub ai_score: Option<i32>,
    /// Optional model analysis.
    pub ai_analysis: Option<Value>,
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
    /// Interview scheduling timestamp.
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for application records. Flags default to `FALSE`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = applications)]
pub struct NewApplicationRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Candidate display name.
    pub candidate_name: String,
    /// Candidate email address.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Applied position title.
    pub position_applied: String,
    /// Optional job role reference.
    pub job_role_id: Option<uuid::Uuid>,
    /// Optional stored resume location.
    pub file_url: Option<String>,
    /// Optional structured resume extraction.
    pub parsed_resume: Option<Value>,
    /// Intake channel.
    pub source: String,
    /// Screening status.
    pub screening_status: String,
    /// Pipeline stage.
    pub pipeline_stage: String,
    /// Manual override marker.
    pub manual_override: bool,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Mutable state written by a recorded transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = applications)]
#[diesel(treat_none_as_null = true)]
pub struct ApplicationStateChangeset {
    /// Screening status.
    pub screening_status: String,
    /// Pipeline stage.
    pub pipeline_stage: String,
    /// Manual override marker.
    pub manual_override: bool,
    /// Optional model score.
    pub ai_score: Option<i32>,
    /// Optional model analysis.
    pub ai_analysis: Option<Value>,
    /// Interview scheduling timestamp.
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    /// Next revision.
    pub revision: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for audit log entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pipeline_audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Application identifier.
    pub application_id: uuid::Uuid,
    /// Recorded action.
    pub action: String,
    /// Stage before the transition.
    pub from_stage: String,
    /// Stage after the transition.
    pub to_stage: String,
    /// Automation marker.
    pub automation_triggered: bool,
    /// Acting user.
    pub performed_by: Option<String>,
    /// Free-form details.
    pub details: Value,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}
