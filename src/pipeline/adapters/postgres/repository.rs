//! `PostgreSQL` repository implementation for applications and their audit
//! trail.

use super::{
    models::{ApplicationRow, ApplicationStateChangeset, AuditLogRow, NewApplicationRow},
    schema::{applications, pipeline_audit_logs},
};
use crate::db::{DbAccessError, run_blocking};
use crate::pipeline::{
    domain::{
        ApplicantProfile, Application, ApplicationId, ApplicationSource, AuditAction, AuditEntry,
        AuditEntryId, CandidateEmail, CandidateName, NotificationFlag, NotificationFlags,
        PersistedApplicationData, PhoneNumber, PipelineStage, ScreeningStatus,
    },
    ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use tracing::debug;

pub use crate::db::PgPool;

/// `PostgreSQL`-backed application repository.
#[derive(Debug, Clone)]
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<DbAccessError> for ApplicationRepositoryError {
    fn from(err: DbAccessError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for ApplicationRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let application_id = application.id();
        let new_row = to_new_row(application)?;

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(applications::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ApplicationRepositoryError::DuplicateApplication(application_id)
                    }
                    _ => ApplicationRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn record_transition(
        &self,
        application: &Application,
        entry: &AuditEntry,
    ) -> ApplicationRepositoryResult<()> {
        let application_id = application.id();
        let loaded_revision = application.revision();
        let expected =
            i64::try_from(loaded_revision).map_err(ApplicationRepositoryError::persistence)?;
        let changeset = to_changeset(application)?;
        let audit_row = audit_to_row(entry);

        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, ApplicationRepositoryError, _>(|tx| {
                let updated = diesel::update(
                    applications::table
                        .filter(applications::id.eq(application_id.into_inner()))
                        .filter(applications::revision.eq(expected)),
                )
                .set(&changeset)
                .execute(tx)?;

                if updated == 0 {
                    return Err(if application_exists(tx, application_id)? {
                        ApplicationRepositoryError::Conflict {
                            id: application_id,
                            expected: loaded_revision,
                        }
                    } else {
                        ApplicationRepositoryError::NotFound(application_id)
                    });
                }

                diesel::insert_into(pipeline_audit_logs::table)
                    .values(&audit_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        run_blocking(&self.pool, move |connection| {
            let row = applications::table
                .filter(applications::id.eq(id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn list(
        &self,
        status: Option<ScreeningStatus>,
    ) -> ApplicationRepositoryResult<Vec<Application>> {
        run_blocking(&self.pool, move |connection| {
            let mut query = applications::table
                .select(ApplicationRow::as_select())
                .order(applications::created_at.desc())
                .into_boxed();
            if let Some(wanted) = status {
                query = query.filter(applications::screening_status.eq(wanted.as_str()));
            }
            let rows = query.load::<ApplicationRow>(connection)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn audit_trail(&self, id: ApplicationId) -> ApplicationRepositoryResult<Vec<AuditEntry>> {
        run_blocking(&self.pool, move |connection| {
            let rows = pipeline_audit_logs::table
                .filter(pipeline_audit_logs::application_id.eq(id.into_inner()))
                .order(pipeline_audit_logs::created_at.asc())
                .select(AuditLogRow::as_select())
                .load::<AuditLogRow>(connection)?;
            rows.into_iter().map(row_to_audit).collect()
        })
        .await
    }

    async fn claim_notification(
        &self,
        id: ApplicationId,
        flag: NotificationFlag,
    ) -> ApplicationRepositoryResult<bool> {
        run_blocking(&self.pool, move |connection| {
            let claimed = claim_flag(connection, id, flag)? == 1;
            if !claimed && !application_exists(connection, id)? {
                return Err(ApplicationRepositoryError::NotFound(id));
            }
            debug!(application_id = %id, %flag, claimed, "notification flag claim");
            Ok(claimed)
        })
        .await
    }
}

fn application_exists(
    connection: &mut PgConnection,
    id: ApplicationId,
) -> ApplicationRepositoryResult<bool> {
    let exists = diesel::select(diesel::dsl::exists(
        applications::table.filter(applications::id.eq(id.into_inner())),
    ))
    .get_result::<bool>(connection)?;
    Ok(exists)
}

/// Raises one flag with a single conditional update and returns the number
/// of affected rows.
fn claim_flag(
    connection: &mut PgConnection,
    id: ApplicationId,
    flag: NotificationFlag,
) -> QueryResult<usize> {
    let target = applications::table.filter(applications::id.eq(id.into_inner()));
    match flag {
        NotificationFlag::SelectionEmailSent => {
            diesel::update(target.filter(applications::selection_email_sent.eq(false)))
                .set(applications::selection_email_sent.eq(true))
                .execute(connection)
        }
        NotificationFlag::RejectionEmailSent => {
            diesel::update(target.filter(applications::rejection_email_sent.eq(false)))
                .set(applications::rejection_email_sent.eq(true))
                .execute(connection)
        }
        NotificationFlag::InterviewInvitationSent => {
            diesel::update(target.filter(applications::interview_invitation_sent.eq(false)))
                .set(applications::interview_invitation_sent.eq(true))
                .execute(connection)
        }
        NotificationFlag::InterviewScheduledEmailSent => diesel::update(
            target.filter(applications::interview_scheduled_email_sent.eq(false)),
        )
        .set(applications::interview_scheduled_email_sent.eq(true))
        .execute(connection),
        NotificationFlag::InterviewCompletedEmailSent => diesel::update(
            target.filter(applications::interview_completed_email_sent.eq(false)),
        )
        .set(applications::interview_completed_email_sent.eq(true))
        .execute(connection),
    }
}

pub(super) fn to_new_row(
    application: &Application,
) -> ApplicationRepositoryResult<NewApplicationRow> {
    let revision =
        i64::try_from(application.revision()).map_err(ApplicationRepositoryError::persistence)?;
    Ok(NewApplicationRow {
        id: application.id().into_inner(),
        candidate_name: application.candidate_name().as_str().to_owned(),
        email: application.email().as_str().to_owned(),
        phone: application.phone().map(|phone| phone.as_str().to_owned()),
        position_applied: application.position_applied().to_owned(),
        job_role_id: application.job_role_id(),
        file_url: application.file_url().map(str::to_owned),
        parsed_resume: application.parsed_resume().cloned(),
        source: application.source().as_str().to_owned(),
        screening_status: application.screening_status().as_str().to_owned(),
        pipeline_stage: application.stage().as_str().to_owned(),
        manual_override: application.manual_override(),
        revision,
        created_at: application.created_at(),
        updated_at: application.updated_at(),
    })
}

pub(super) fn to_changeset(
    application: &Application,
) -> ApplicationRepositoryResult<ApplicationStateChangeset> {
    let next_revision = i64::try_from(application.revision().saturating_add(1))
        .map_err(ApplicationRepositoryError::persistence)?;
    let ai_score = application
        .ai_score()
        .map(i32::try_from)
        .transpose()
        .map_err(ApplicationRepositoryError::persistence)?;
    Ok(ApplicationStateChangeset {
        screening_status: application.screening_status().as_str().to_owned(),
        pipeline_stage: application.stage().as_str().to_owned(),
        manual_override: application.manual_override(),
        ai_score,
        ai_analysis: application.ai_analysis().cloned(),
        interview_scheduled_at: application.interview_scheduled_at(),
        revision: next_revision,
        updated_at: application.updated_at(),
    })
}

/// A stored row whose screening status disagrees with its stage.
#[derive(Debug, Error)]
#[error("stored screening status {stored} does not match stage {stage}")]
struct InconsistentScreeningStatus {
    stored: ScreeningStatus,
    stage: PipelineStage,
}

pub(super) fn row_to_application(row: ApplicationRow) -> ApplicationRepositoryResult<Application> {
    let ApplicationRow {
        id,
        candidate_name,
        email,
        phone,
        position_applied,
        job_role_id,
        file_url,
        parsed_resume,
        source,
        screening_status,
        pipeline_stage,
        manual_override,
        ai_score,
        ai_analysis,
        selection_email_sent,
        rejection_email_sent,
        interview_invitation_sent,
        interview_scheduled_email_sent,
        interview_completed_email_sent,
        interview_scheduled_at,
        revision,
        created_at,
        updated_at,
    } = row;

    let stage = PipelineStage::try_from(pipeline_stage.as_str())
        .map_err(ApplicationRepositoryError::persistence)?;
    let stored_status = ScreeningStatus::try_from(screening_status.as_str())
        .map_err(ApplicationRepositoryError::persistence)?;
    if stored_status != stage.screening_status() {
        return Err(ApplicationRepositoryError::persistence(
            InconsistentScreeningStatus {
                stored: stored_status,
                stage,
            },
        ));
    }

    let profile = ApplicantProfile {
        candidate_name: CandidateName::new(candidate_name)
            .map_err(ApplicationRepositoryError::persistence)?,
        email: CandidateEmail::new(email).map_err(ApplicationRepositoryError::persistence)?,
        phone: phone
            .map(PhoneNumber::new)
            .transpose()
            .map_err(ApplicationRepositoryError::persistence)?,
        position_applied,
        job_role_id,
        file_url,
        parsed_resume,
        source: ApplicationSource::try_from(source.as_str())
            .map_err(ApplicationRepositoryError::persistence)?,
    };

    let data = PersistedApplicationData {
        id: ApplicationId::from_uuid(id),
        profile,
        stage,
        manual_override,
        ai_score: ai_score
            .map(u32::try_from)
            .transpose()
            .map_err(ApplicationRepositoryError::persistence)?,
        ai_analysis,
        flags: NotificationFlags {
            selection_email_sent,
            rejection_email_sent,
            interview_invitation_sent,
            interview_scheduled_email_sent,
            interview_completed_email_sent,
        },
        interview_scheduled_at,
        revision: u64::try_from(revision).map_err(ApplicationRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Application::from_persisted(data))
}

pub(super) fn audit_to_row(entry: &AuditEntry) -> AuditLogRow {
    AuditLogRow {
        id: entry.id.into_inner(),
        application_id: entry.application_id.into_inner(),
        action: entry.action.as_str().to_owned(),
        from_stage: entry.from_stage.as_str().to_owned(),
        to_stage: entry.to_stage.as_str().to_owned(),
        automation_triggered: entry.automation_triggered,
        performed_by: entry.performed_by.clone(),
        details: entry.details.clone(),
        created_at: entry.created_at,
    }
}

pub(super) fn row_to_audit(row: AuditLogRow) -> ApplicationRepositoryResult<AuditEntry> {
    Ok(AuditEntry {
        id: AuditEntryId::from_uuid(row.id),
        application_id: ApplicationId::from_uuid(row.application_id),
        action: AuditAction::try_from(row.action.as_str())
            .map_err(ApplicationRepositoryError::persistence)?,
        from_stage: PipelineStage::try_from(row.from_stage.as_str())
            .map_err(ApplicationRepositoryError::persistence)?,
        to_stage: PipelineStage::try_from(row.to_stage.as_str())
            .map_err(ApplicationRepositoryError::persistence)?,
        automation_triggered: row.automation_triggered,
        performed_by: row.performed_by,
        details: row.details,
        created_at: row.created_at,
    })
}
