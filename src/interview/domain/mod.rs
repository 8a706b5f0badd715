//! Domain model for interviews and their access tokens.

mod error;
mod interview;
mod token;

pub use error::{InterviewDomainError, ParseInterviewStatusError, ParseInterviewTypeError};
pub use interview::{
    Interview, InterviewId, InterviewStatus, InterviewType, PersistedInterviewData,
};
pub use token::{InterviewToken, InterviewTokenId, PersistedTokenData, TokenDigest, TokenSecret};
