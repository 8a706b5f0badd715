//! Service-level errors for pipeline operations.

use crate::notification::ports::EmailQueueError;
use crate::pipeline::{
    domain::{ApplicationId, PipelineDomainError},
    ports::{ApplicationRepositoryError, ResumeAnalyzerError},
};
use thiserror::Error;

/// Errors returned by the pipeline services.
#[derive(Debug, Error)]
pub enum ApplicationServiceError {
    /// The application does not exist.
    #[error("application not found: {0}")]
    NotFound(ApplicationId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PipelineDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ApplicationRepositoryError),
    /// The resume analyzer failed.
    #[error(transparent)]
    Analyzer(#[from] ResumeAnalyzerError),
    /// Queueing the candidate notification failed.
    #[error(transparent)]
    Notification(#[from] EmailQueueError),
}

/// Result type for pipeline service operations.
pub type ApplicationServiceResult<T> = Result<T, ApplicationServiceError>;
