//! Repository port for interviews and their tokens.

use crate::interview::domain::{
    Interview, InterviewId, InterviewToken, InterviewTokenId, TokenDigest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for interview repository operations.
pub type InterviewRepositoryResult<T> = Result<T, InterviewRepositoryError>;

/// Interview persistence contract.
#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Stores a new interview and its token in one write.
    async fn store_invitation(
        &self,
        interview: &Interview,
        token: &InterviewToken,
    ) -> InterviewRepositoryResult<()>;

    /// Finds the token whose digest matches.
    ///
    /// Returns `None` when no token has this digest.
    async fn find_token_by_digest(
        &self,
        digest: &TokenDigest,
    ) -> InterviewRepositoryResult<Option<InterviewToken>>;

    /// Marks the token used at `used_at` if it is still unused.
    ///
    /// Returns `true` for exactly one caller per token.
    async fn consume_token(
        &self,
        id: InterviewTokenId,
        used_at: DateTime<Utc>,
    ) -> InterviewRepositoryResult<bool>;

    /// Finds an interview by identifier.
    async fn find_interview(&self, id: InterviewId) -> InterviewRepositoryResult<Option<Interview>>;

    /// Persists status changes of an existing interview.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewRepositoryError::NotFound`] when the interview does
    /// not exist.
    async fn update_interview(&self, interview: &Interview) -> InterviewRepositoryResult<()>;
}

/// Errors returned by interview repository implementations.
#[derive(Debug, Clone, Error)]
pub enum InterviewRepositoryError {
    /// The interview was not found.
    #[error("interview not found: {0}")]
    NotFound(InterviewId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl InterviewRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
