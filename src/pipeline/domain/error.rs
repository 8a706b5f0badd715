//! Error types for pipeline domain validation and parsing.

use super::{ApplicationId, PipelineStage};
use thiserror::Error;

/// Errors returned while constructing or mutating pipeline domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The candidate name is empty after trimming.
    #[error("candidate name must not be empty")]
    EmptyCandidateName,

    /// The candidate name exceeds the storage limit.
    #[error("candidate name exceeds 200 character limit: {0}")]
    CandidateNameTooLong(String),

    /// The email address is malformed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The email address belongs to a disposable inbox service.
    #[error("disposable email domain '{0}' is not allowed")]
    DisposableEmail(String),

    /// The phone number contains unsupported characters.
    #[error("invalid phone number '{0}'")]
    InvalidPhone(String),

    /// The applied position is empty after trimming.
    #[error("position applied must not be empty")]
    EmptyPosition,

    /// The requested stage change is not a forward funnel step.
    #[error("invalid pipeline transition for application {application_id}: {from} -> {to}")]
    InvalidStageTransition {
        /// Application identifier.
        application_id: ApplicationId,
        /// Current stage.
        from: PipelineStage,
        /// Requested stage.
        to: PipelineStage,
    },

    /// Only applications awaiting screening can be screened by the model.
    #[error("application {application_id} is already at stage {stage}")]
    AlreadyScreened {
        /// Application identifier.
        application_id: ApplicationId,
        /// Current stage.
        stage: PipelineStage,
    },

    /// Demonstration records cannot be screened or notified.
    #[error("application {0} is demo data and cannot be processed")]
    DemoApplication(ApplicationId),

    /// An analysis score is outside `0..=100` or not a number.
    #[error("{field} score {value} is outside the range 0..=100")]
    ScoreOutOfRange {
        /// Offending analysis field.
        field: &'static str,
        /// Reported value.
        value: String,
    },

    /// The analysis could not be encoded for storage.
    #[error("analysis could not be encoded: {0}")]
    AnalysisEncoding(String),
}

/// Error returned while parsing pipeline stages from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline stage: {0}")]
pub struct ParsePipelineStageError(pub String);

/// Error returned while parsing screening statuses or decisions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown screening status: {0}")]
pub struct ParseScreeningStatusError(pub String);

/// Error returned while parsing application sources from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application source: {0}")]
pub struct ParseApplicationSourceError(pub String);

/// Error returned while parsing audit actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown audit action: {0}")]
pub struct ParseAuditActionError(pub String);
