//! JSON error responses for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::interview::{domain::InterviewDomainError, services::InterviewServiceError};
use crate::notification::ports::EmailQueueError;
use crate::pipeline::{
    domain::PipelineDomainError, ports::ApplicationRepositoryError,
    services::ApplicationServiceError,
};

/// Error returned by every handler.
///
/// Renders as `{"error": {"code", "message"}}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with the current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request is well formed but cannot be processed.
    #[error("unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// A required integration is not configured or not reachable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Unexpected failure; details are logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            Self::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY", msg)
            }
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_owned(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));
        (status, body).into_response()
    }
}

impl From<PipelineDomainError> for AppError {
    fn from(err: PipelineDomainError) -> Self {
        match err {
            PipelineDomainError::InvalidStageTransition { .. }
            | PipelineDomainError::AlreadyScreened { .. } => Self::Conflict(err.to_string()),
            PipelineDomainError::DemoApplication(_) => Self::UnprocessableEntity(err.to_string()),
            PipelineDomainError::EmptyCandidateName
            | PipelineDomainError::CandidateNameTooLong(_)
            | PipelineDomainError::InvalidEmail(_)
            | PipelineDomainError::DisposableEmail(_)
            | PipelineDomainError::InvalidPhone(_)
            | PipelineDomainError::EmptyPosition
            | PipelineDomainError::ScoreOutOfRange { .. } => Self::Validation(err.to_string()),
            PipelineDomainError::AnalysisEncoding(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ApplicationRepositoryError> for AppError {
    fn from(err: ApplicationRepositoryError) -> Self {
        match err {
            ApplicationRepositoryError::NotFound(_) => Self::NotFound(err.to_string()),
            ApplicationRepositoryError::DuplicateApplication(_)
            | ApplicationRepositoryError::Conflict { .. } => Self::Conflict(err.to_string()),
            ApplicationRepositoryError::Persistence(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<EmailQueueError> for AppError {
    fn from(err: EmailQueueError) -> Self {
        match err {
            EmailQueueError::Application(inner) => inner.into(),
            EmailQueueError::NotClaimed(_) => Self::Conflict(err.to_string()),
            EmailQueueError::NotFound(_) | EmailQueueError::Persistence(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<ApplicationServiceError> for AppError {
    fn from(err: ApplicationServiceError) -> Self {
        match err {
            ApplicationServiceError::NotFound(_) => Self::NotFound(err.to_string()),
            ApplicationServiceError::Domain(inner) => inner.into(),
            ApplicationServiceError::Repository(inner) => inner.into(),
            ApplicationServiceError::Analyzer(inner) => Self::Unavailable(inner.to_string()),
            ApplicationServiceError::Notification(inner) => inner.into(),
        }
    }
}

impl From<InterviewServiceError> for AppError {
    fn from(err: InterviewServiceError) -> Self {
        match err {
            InterviewServiceError::ApplicationNotFound(_)
            | InterviewServiceError::InterviewNotFound
            | InterviewServiceError::InvalidToken => Self::NotFound(err.to_string()),
            InterviewServiceError::AlreadyInvited(_)
            | InterviewServiceError::ApplicationClosed { .. } => Self::Conflict(err.to_string()),
            InterviewServiceError::Interview(inner) => match inner {
                InterviewDomainError::DelayTooLong(_) => Self::Validation(inner.to_string()),
                InterviewDomainError::TokenExpired => {
                    Self::UnprocessableEntity(inner.to_string())
                }
                InterviewDomainError::TokenAlreadyUsed
                | InterviewDomainError::InvalidStatusTransition { .. } => {
                    Self::Conflict(inner.to_string())
                }
            },
            InterviewServiceError::InterviewRepository(inner) => Self::Internal(inner.to_string()),
            InterviewServiceError::Pipeline(inner) => inner.into(),
            InterviewServiceError::ApplicationRepository(inner) => inner.into(),
            InterviewServiceError::Notification(inner) => inner.into(),
        }
    }
}
