//! Error types for interview domain validation and parsing.

use super::{InterviewId, InterviewStatus};
use thiserror::Error;

/// Errors returned while scheduling or completing interviews.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterviewDomainError {
    /// The invitation delay exceeds one week.
    #[error("interview delay of {0} hours exceeds the 168 hour limit")]
    DelayTooLong(u32),

    /// The token is past its expiry.
    #[error("interview token has expired")]
    TokenExpired,

    /// The token was already consumed.
    #[error("interview token has already been used")]
    TokenAlreadyUsed,

    /// The requested interview status change is not allowed.
    #[error("invalid interview status transition for {interview_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Interview identifier.
        interview_id: InterviewId,
        /// Current status.
        from: InterviewStatus,
        /// Requested status.
        to: InterviewStatus,
    },
}

/// Error returned while parsing interview statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown interview status: {0}")]
pub struct ParseInterviewStatusError(pub String);

/// Error returned while parsing interview types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown interview type: {0}")]
pub struct ParseInterviewTypeError(pub String);
