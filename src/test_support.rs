//! In-memory service wiring shared by unit tests.

use std::sync::Arc;

use crate::http::{AppState, Backends, ServiceOptions};
use crate::interview::adapters::memory::InMemoryInterviewRepository;
use crate::notification::adapters::{
    memory::InMemoryEmailQueue, recording::RecordingNotificationGateway,
};
use crate::pipeline::{
    adapters::memory::InMemoryApplicationRepository,
    domain::{Application, ApplicationSource},
    ports::{ApplicationRepository, ResumeAnalyzer},
    services::SubmitApplicationRequest,
};

/// Services over in-memory stores, with handles on each store.
pub(crate) struct Harness {
    pub(crate) applications: InMemoryApplicationRepository,
    pub(crate) queue: InMemoryEmailQueue,
    pub(crate) interviews: InMemoryInterviewRepository,
    pub(crate) gateway: RecordingNotificationGateway,
    pub(crate) state: AppState,
}

impl Harness {
    pub(crate) fn new(options: ServiceOptions) -> Self {
        Self::build(options, None, |store| Arc::new(store))
    }

    pub(crate) fn with_analyzer(options: ServiceOptions, analyzer: Arc<dyn ResumeAnalyzer>) -> Self {
        Self::build(options, Some(analyzer), |store| Arc::new(store))
    }

    /// Routes the services through `wrap`, keeping a handle on the store
    /// underneath.
    pub(crate) fn with_application_port<F>(options: ServiceOptions, wrap: F) -> Self
    where
        F: FnOnce(InMemoryApplicationRepository) -> Arc<dyn ApplicationRepository>,
    {
        Self::build(options, None, wrap)
    }

    fn build<F>(options: ServiceOptions, analyzer: Option<Arc<dyn ResumeAnalyzer>>, wrap: F) -> Self
    where
        F: FnOnce(InMemoryApplicationRepository) -> Arc<dyn ApplicationRepository>,
    {
        let applications = InMemoryApplicationRepository::new();
        let queue = InMemoryEmailQueue::new();
        let interviews = InMemoryInterviewRepository::new();
        let gateway = RecordingNotificationGateway::new();
        let backends = Backends {
            applications: wrap(applications.clone()),
            email_queue: Arc::new(queue.clone()),
            interviews: Arc::new(interviews.clone()),
            gateway: Arc::new(gateway.clone()),
            analyzer,
        };
        Self {
            applications,
            queue,
            interviews,
            gateway,
            state: AppState::assemble(backends, options),
        }
    }

    /// Submits a valid portal application.
    pub(crate) async fn submit(&self, name: &str, email: &str) -> Application {
        self.state
            .applications
            .submit(SubmitApplicationRequest::new(name, email, "Backend Engineer"))
            .await
            .expect("submission should succeed")
    }

    /// Submits a seeded demo application.
    pub(crate) async fn submit_demo(&self) -> Application {
        self.state
            .applications
            .submit(
                SubmitApplicationRequest::new("Demo Candidate", "demo@acme.io", "Designer")
                    .with_source(ApplicationSource::Demo),
            )
            .await
            .expect("submission should succeed")
    }
}

/// Service options with automatic interview scheduling switched off.
pub(crate) fn manual_options() -> ServiceOptions {
    ServiceOptions {
        auto_schedule_interview: false,
        ..ServiceOptions::default()
    }
}
