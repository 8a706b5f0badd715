//! `PostgreSQL` repository implementation for interviews and tokens.

use super::{
    models::{InterviewRow, InterviewTokenRow},
    schema::{interview_tokens, interviews},
};
use crate::db::{DbAccessError, PgPool, run_blocking};
use crate::interview::{
    domain::{
        Interview, InterviewId, InterviewStatus, InterviewToken, InterviewTokenId, InterviewType,
        PersistedInterviewData, PersistedTokenData, TokenDigest,
    },
    ports::{InterviewRepository, InterviewRepositoryError, InterviewRepositoryResult},
};
use crate::pipeline::domain::ApplicationId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;

/// `PostgreSQL`-backed interview repository.
#[derive(Debug, Clone)]
pub struct PostgresInterviewRepository {
    pool: PgPool,
}

impl PostgresInterviewRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<DbAccessError> for InterviewRepositoryError {
    fn from(err: DbAccessError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for InterviewRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl InterviewRepository for PostgresInterviewRepository {
    async fn store_invitation(
        &self,
        interview: &Interview,
        token: &InterviewToken,
    ) -> InterviewRepositoryResult<()> {
        let interview_row = interview_to_row(interview);
        let token_row = token_to_row(token);

        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, InterviewRepositoryError, _>(|tx| {
                diesel::insert_into(interviews::table)
                    .values(&interview_row)
                    .execute(tx)?;
                diesel::insert_into(interview_tokens::table)
                    .values(&token_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_token_by_digest(
        &self,
        digest: &TokenDigest,
    ) -> InterviewRepositoryResult<Option<InterviewToken>> {
        let wanted = digest.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            let row = interview_tokens::table
                .filter(interview_tokens::token_digest.eq(wanted))
                .select(InterviewTokenRow::as_select())
                .first::<InterviewTokenRow>(connection)
                .optional()?;
            Ok(row.map(row_to_token))
        })
        .await
    }

    async fn consume_token(
        &self,
        id: InterviewTokenId,
        used_at: DateTime<Utc>,
    ) -> InterviewRepositoryResult<bool> {
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(
                interview_tokens::table
                    .filter(interview_tokens::id.eq(id.into_inner()))
                    .filter(interview_tokens::used_at.is_null()),
            )
            .set((
                interview_tokens::used_at.eq(Some(used_at)),
                interview_tokens::interview_completed.eq(true),
            ))
            .execute(connection)?;
            Ok(updated == 1)
        })
        .await
    }

    async fn find_interview(&self, id: InterviewId) -> InterviewRepositoryResult<Option<Interview>> {
        run_blocking(&self.pool, move |connection| {
            let row = interviews::table
                .filter(interviews::id.eq(id.into_inner()))
                .select(InterviewRow::as_select())
                .first::<InterviewRow>(connection)
                .optional()?;
            row.map(row_to_interview).transpose()
        })
        .await
    }

    async fn update_interview(&self, interview: &Interview) -> InterviewRepositoryResult<()> {
        let interview_id = interview.id();
        let status = interview.status().as_str().to_owned();
        let completed_at = interview.completed_at();
        let updated_at = interview.updated_at();

        run_blocking(&self.pool, move |connection| {
            let target = interviews::table.filter(interviews::id.eq(interview_id.into_inner()));
            let updated = diesel::update(target)
                .set((
                    interviews::status.eq(status),
                    interviews::completed_at.eq(completed_at),
                    interviews::updated_at.eq(updated_at),
                ))
                .execute(connection)?;
            if updated == 0 {
                return Err(InterviewRepositoryError::NotFound(interview_id));
            }
            Ok(())
        })
        .await
    }
}

pub(super) fn interview_to_row(interview: &Interview) -> InterviewRow {
    InterviewRow {
        id: interview.id().into_inner(),
        application_id: interview.application_id().into_inner(),
        candidate_name: interview.candidate_name().to_owned(),
        status: interview.status().as_str().to_owned(),
        scheduled_for: interview.scheduled_for(),
        interview_link: interview.interview_link().to_owned(),
        interview_type: interview.interview_type().as_str().to_owned(),
        completed_at: interview.completed_at(),
        created_at: interview.created_at(),
        updated_at: interview.updated_at(),
    }
}

pub(super) fn row_to_interview(row: InterviewRow) -> InterviewRepositoryResult<Interview> {
    let data = PersistedInterviewData {
        id: InterviewId::from_uuid(row.id),
        application_id: ApplicationId::from_uuid(row.application_id),
        candidate_name: row.candidate_name,
        status: InterviewStatus::try_from(row.status.as_str())
            .map_err(InterviewRepositoryError::persistence)?,
        scheduled_for: row.scheduled_for,
        interview_link: row.interview_link,
        interview_type: InterviewType::try_from(row.interview_type.as_str())
            .map_err(InterviewRepositoryError::persistence)?,
        completed_at: row.completed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Interview::from_persisted(data))
}

pub(super) fn token_to_row(token: &InterviewToken) -> InterviewTokenRow {
    InterviewTokenRow {
        id: token.id().into_inner(),
        application_id: token.application_id().into_inner(),
        interview_id: token.interview_id().into_inner(),
        token_digest: token.digest().as_str().to_owned(),
        expires_at: token.expires_at(),
        used_at: token.used_at(),
        interview_completed: token.interview_completed(),
        created_at: token.created_at(),
    }
}

pub(super) fn row_to_token(row: InterviewTokenRow) -> InterviewToken {
    InterviewToken::from_persisted(PersistedTokenData {
        id: InterviewTokenId::from_uuid(row.id),
        application_id: ApplicationId::from_uuid(row.application_id),
        interview_id: InterviewId::from_uuid(row.interview_id),
        digest: TokenDigest::from_stored(row.token_digest),
        expires_at: row.expires_at,
        used_at: row.used_at,
        interview_completed: row.interview_completed,
        created_at: row.created_at,
    })
}
