//! Domain model for the candidate pipeline.
//!
//! Applications move through a forward-only funnel of stages. The screening
//! status shown to HR is derived from the stage, and every stage change is
//! paired with an [`AuditEntry`].

mod analysis;
mod application;
mod audit;
mod candidate;
mod error;
mod ids;
mod stage;

pub use analysis::{AtsScore, ResumeAnalysis, ScreeningPolicy};
pub use application::{ApplicantProfile, Application, PersistedApplicationData};
pub use audit::{AuditAction, AuditEntry};
pub use candidate::{ApplicationSource, CandidateEmail, CandidateName, PhoneNumber};
pub use error::{
    ParseApplicationSourceError, ParseAuditActionError, ParsePipelineStageError,
    ParseScreeningStatusError, PipelineDomainError,
};
pub use ids::{ApplicationId, AuditEntryId};
pub use stage::{
    NotificationFlag, NotificationFlags, PipelineStage, ScreeningDecision, ScreeningStatus,
};
