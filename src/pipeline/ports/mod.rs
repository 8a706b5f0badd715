//! Port contracts for the candidate pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by pipeline services.

pub mod analyzer;
pub mod repository;

#[cfg(test)]
pub use analyzer::MockResumeAnalyzer;
pub use analyzer::{JobContext, ResumeAnalyzer, ResumeAnalyzerError, ResumeAnalyzerResult};
pub use repository::{
    ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult,
};
