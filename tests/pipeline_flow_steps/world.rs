//! Shared world state for candidate pipeline BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use synchrohr::http::{AppState, Backends, ServiceOptions};
use synchrohr::interview::{
    adapters::memory::InMemoryInterviewRepository,
    domain::TokenSecret,
    services::{CompletedInterview, InterviewServiceError},
};
use synchrohr::notification::adapters::{
    memory::InMemoryEmailQueue, recording::RecordingNotificationGateway,
};
use synchrohr::pipeline::{
    adapters::memory::InMemoryApplicationRepository,
    domain::ApplicationId,
    services::{ApplicationServiceError, DecisionOutcome},
};

/// Scenario world for pipeline behaviour tests.
pub struct PipelineWorld {
    pub state: AppState,
    pub gateway: RecordingNotificationGateway,
    pub application_id: Option<ApplicationId>,
    pub secret: Option<TokenSecret>,
    pub last_decision: Option<Result<DecisionOutcome, ApplicationServiceError>>,
    pub last_completion: Option<Result<CompletedInterview, InterviewServiceError>>,
}

impl PipelineWorld {
    /// Creates a world over fresh in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let gateway = RecordingNotificationGateway::new();
        let backends = Backends {
            applications: Arc::new(InMemoryApplicationRepository::new()),
            email_queue: Arc::new(InMemoryEmailQueue::new()),
            interviews: Arc::new(InMemoryInterviewRepository::new()),
            gateway: Arc::new(gateway.clone()),
            analyzer: None,
        };
        Self {
            state: AppState::assemble(backends, ServiceOptions::default()),
            gateway,
            application_id: None,
            secret: None,
            last_decision: None,
            last_completion: None,
        }
    }

    /// Returns the application under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no application was submitted.
    pub fn application_id(&self) -> Result<ApplicationId, eyre::Report> {
        self.application_id
            .ok_or_else(|| eyre::eyre!("missing application in scenario world"))
    }
}

impl Default for PipelineWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PipelineWorld {
    PipelineWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
