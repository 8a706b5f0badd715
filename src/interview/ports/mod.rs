//! Port contracts for interviews.

pub mod repository;

pub use repository::{InterviewRepository, InterviewRepositoryError, InterviewRepositoryResult};
