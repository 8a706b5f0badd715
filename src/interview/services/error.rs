//! Service-level errors for interview operations.

use crate::interview::{domain::InterviewDomainError, ports::InterviewRepositoryError};
use crate::notification::ports::EmailQueueError;
use crate::pipeline::{
    domain::{ApplicationId, PipelineDomainError, PipelineStage},
    ports::ApplicationRepositoryError,
};
use thiserror::Error;

/// Errors returned by the interview services.
#[derive(Debug, Error)]
pub enum InterviewServiceError {
    /// The application does not exist.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// The token references an interview that does not exist.
    #[error("interview not found for token")]
    InterviewNotFound,

    /// No token matches the presented secret.
    #[error("interview token is invalid")]
    InvalidToken,

    /// The application left the interview stage, e.g. it was rejected.
    #[error("application {application_id} is {stage} and no longer accepts an interview")]
    ApplicationClosed {
        /// Application identifier.
        application_id: ApplicationId,
        /// Stage the application is in.
        stage: PipelineStage,
    },

    /// The invitation was already issued for this application.
    #[error("interview invitation already issued for application {0}")]
    AlreadyInvited(ApplicationId),

    /// Interview domain rule failed.
    #[error(transparent)]
    Interview(#[from] InterviewDomainError),

    /// Interview persistence failed.
    #[error(transparent)]
    InterviewRepository(#[from] InterviewRepositoryError),

    /// Pipeline domain rule failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineDomainError),

    /// Application persistence failed.
    #[error(transparent)]
    ApplicationRepository(#[from] ApplicationRepositoryError),

    /// Queueing the notification failed.
    #[error(transparent)]
    Notification(#[from] EmailQueueError),
}

/// Result type for interview service operations.
pub type InterviewServiceResult<T> = Result<T, InterviewServiceError>;
